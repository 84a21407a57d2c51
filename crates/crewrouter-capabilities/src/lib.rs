//! Agent capability records and registry for CrewRouter
//!
//! This crate loads capability-tagged agent records from a configuration
//! source and indexes them for lookup by role, domain and selection
//! criteria. It is the data backbone of the routing pipeline: the matcher
//! and resolver in `crewrouter-routing` score and select agents out of this
//! registry.
//!
//! # Architecture
//!
//! - **Models**: capability records, the three-section capability document
//!   and registry statistics
//! - **Sources**: the [`CapabilitySource`] collaborator plus file-backed,
//!   in-memory and built-in-default implementations
//! - **Registry**: lifecycle (`initialize`/`reload` with atomic index swap)
//!   and lookups
//!
//! # Example
//!
//! ```ignore
//! use crewrouter_capabilities::CapabilityRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = CapabilityRegistry::with_defaults();
//!     registry.initialize().await?;
//!
//!     let agents = registry.find_agents_by_domain("backend")?;
//!     for agent in agents {
//!         println!("{} (priority {})", agent.role, agent.priority);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod registry;
pub mod source;

pub use error::{CapabilityError, Result};
pub use models::{AgentCapability, CapabilityDocument, RegistryStats};
pub use registry::CapabilityRegistry;
pub use source::{
    default_document, CapabilitySource, FileCapabilitySource, StaticCapabilitySource,
};
