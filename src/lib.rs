//! Transceiver process lifecycle.
//!
//! Negotiates the radio device, picks the matching radio interface, hands
//! the interface's receive queue to the transceiver worker, runs until a
//! shutdown signal and tears everything down in order.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                          TRANSCEIVER                             │
//!   │                                                                  │
//!   │  ┌─────────┐   ┌────────────┐   ┌─────────────┐                  │
//!   │  │ config  │──▶│ lifecycle  │──▶│   radio     │                  │
//!   │  │ schema  │   │  startup   │   │ negotiator  │                  │
//!   │  │ + store │   │  signals   │   └──────┬──────┘                  │
//!   │  └─────────┘   └─────┬──────┘          │ capability              │
//!   │                      │                 ▼                         │
//!   │                      │          ┌─────────────┐   owns           │
//!   │                      │          │  interface  │── device + queue │
//!   │                      │          │  strategy   │                  │
//!   │                      │          └──────┬──────┘                  │
//!   │                      │                 │ &SampleQueue            │
//!   │                      ▼                 ▼                         │
//!   │               ┌────────────┐    ┌─────────────┐                  │
//!   │               │  latch     │    │ transceiver │──▶ BurstSink     │
//!   │               │  poll loop │    │   worker    │                  │
//!   │               └────────────┘    └─────────────┘                  │
//!   │                                                                  │
//!   │  Cross-cutting: observability (tracing, metrics)                 │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod radio;
pub mod transceiver;

pub use config::{build_schema, ConfigStore};
pub use lifecycle::{LifecycleError, LifecycleState, ShutdownLatch, TransceiverLifecycle};
pub use radio::{RadioCapability, RadioDevice};
pub use transceiver::{BurstSink, Transceiver};
