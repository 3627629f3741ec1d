//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! schema.rs (build_schema: key registry)
//!     → validation.rs (every spec parses, every default passes)
//!     → loader.rs (optional TOML overrides, flattened to "Key.Name")
//!     → store.rs (validated values + defaults for unset keys)
//!     → typed reads by the lifecycle and radio layers
//! ```
//!
//! # Design Decisions
//! - The schema is built once, before any persisted value is read
//! - Overrides are validated as a batch; nothing applies unless all pass
//! - Static keys are locked once the service is live

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{build_schema, ConfigurationKeyDescriptor, ConfigurationKeySchema};
pub use store::ConfigStore;
