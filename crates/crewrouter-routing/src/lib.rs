//! Task-to-agent routing pipeline for CrewRouter
//!
//! Assigns an incoming unit of work to the best-suited agent from a registry
//! of capability-tagged agents, producing a ranked decision with a calibrated
//! confidence score and a guaranteed fallback.
//!
//! # Architecture
//!
//! The pipeline runs in dependency order:
//! - **Keywords**: mutable domain -> keyword table driving classification
//! - **Classifier**: task description + files + dependencies -> domain,
//!   confidence, complexity and suggested roles
//! - **Context**: affected files -> file types, imports, architecture,
//!   technology and infrastructure signals (cached per file list)
//! - **Matcher**: weighted multi-factor scoring of every registered agent
//! - **Resolver**: orchestrates the stages, applies confidence thresholds
//!   and always returns a well-formed selection with a fallback agent
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crewrouter_capabilities::CapabilityRegistry;
//! use crewrouter_routing::{AgentResolver, FsFileReader, TaskContext};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(CapabilityRegistry::with_defaults());
//!     registry.initialize().await.expect("registry load");
//!
//!     let resolver = AgentResolver::new(registry, Arc::new(FsFileReader));
//!     let task = TaskContext::new("Fix the docker deployment pipeline")
//!         .with_files(&["infra/main.tf", "Dockerfile"]);
//!
//!     let selection = resolver.resolve(&task).await;
//!     println!("{} ({:.2})", selection.selected_agent, selection.confidence);
//! }
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod context;
pub mod error;
pub mod fs;
pub mod keywords;
pub mod matcher;
pub mod models;
pub mod resolver;

pub use classifier::TaskClassifier;
pub use context::ContextAnalyzer;
pub use error::{Result, RoutingError};
pub use fs::{FileReader, FsFileReader};
pub use keywords::KeywordRegistry;
pub use matcher::CapabilityMatcher;
pub use models::{
    AgentScore, AgentSelection, CodebaseContext, Complexity, TaskClassification, TaskContext,
};
pub use resolver::{
    AgentResolver, DetailedAnalysis, ResolverStats, ServiceValidation, Thresholds,
    HIGH_CONFIDENCE, MIN_CONFIDENCE,
};
