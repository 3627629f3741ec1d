//! Terminate as the first shutdown signal. Single test per binary, as in
//! `signal_shutdown.rs`.

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use transceiver::lifecycle::{install_shutdown_handlers, ShutdownLatch, SignalOptions};

#[test]
fn test_terminate_signal_sets_fresh_latch() {
    let latch = ShutdownLatch::new();
    let registration = install_shutdown_handlers(&latch, SignalOptions::default()).unwrap();
    assert!(!latch.is_shutdown_requested());

    signal_hook::low_level::raise(SIGTERM).unwrap();
    assert!(latch.is_shutdown_requested());

    signal_hook::low_level::raise(SIGINT).unwrap();
    assert!(latch.is_shutdown_requested());

    registration.unregister();
}
