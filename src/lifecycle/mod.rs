//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build schema → Load config → Install signal handlers → Resolve settings
//!
//! Service (service.rs):
//!     Open device → Negotiate capability → Select interface
//!     → Bind transceiver to queue → Start → Poll latch → Teardown
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → latch set → control loop observes it on next poll
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then signals, then the device
//! - Ordered shutdown: stop producing, drain, join, release
//! - Strictly linear state machine (state.rs); one run per process

pub mod error;
pub mod service;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use error::{exit_status, LifecycleError, EXIT_FAILURE, EXIT_SUCCESS};
pub use service::{LifecycleSettings, ShutdownReport, TransceiverLifecycle};
pub use shutdown::ShutdownLatch;
pub use signals::{install_shutdown_handlers, SignalInstallError, SignalOptions};
pub use startup::{prepare, Prepared, StartupOptions};
pub use state::{LifecycleState, StateHandle};
