//! Radio subsystem.
//!
//! # Data Flow
//! ```text
//! device args (command line)
//!     → negotiator.rs (open device, read capability, apply tuning)
//!     → interface.rs select() (capability → strategy)
//!     → strategy pump thread: device.rs read → resampler.rs (RESAMP only)
//!     → queue.rs (bounded burst queue)
//!     → transceiver worker
//! ```
//!
//! # Design Decisions
//! - Capability is the only input to strategy dispatch
//! - Strategies are a closed enum built only by `select`
//! - The strategy owns device and queue; consumers only borrow the queue

pub mod device;
pub mod dummy;
pub mod interface;
pub mod negotiator;
pub mod queue;
pub mod resampler;
pub mod types;

pub use device::{DeviceError, DeviceOpenError, RadioDevice, RadioDeviceHandle};
pub use dummy::DummyLoad;
pub use interface::{select, InterfaceParams, InterfaceStrategy, UnsupportedCapabilityError};
pub use negotiator::{open_and_negotiate, RadioTuning};
pub use queue::SampleQueue;
pub use types::{RadioBurst, RadioCapability, Sample};
