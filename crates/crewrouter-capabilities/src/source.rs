//! Capability document sources
//!
//! A [`CapabilitySource`] resolves the structured configuration document the
//! registry is built from: `capabilities` (role -> record),
//! `selection_criteria` (tag -> description) and `task_domains`
//! (tag -> description). A malformed top-level document is a hard load
//! failure; malformed individual records are retained best-effort so one bad
//! entry cannot shrink the registry.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{CapabilityError, Result},
    models::{AgentCapability, CapabilityDocument},
};

/// Source of a capability document
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    /// Resolve and load the full document
    async fn load(&self) -> Result<CapabilityDocument>;
}

/// Raw on-disk document shape; record values stay untyped so each one can be
/// decoded individually
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    capabilities: serde_json::Map<String, serde_json::Value>,
    #[serde(default, alias = "selectionCriteria")]
    selection_criteria: HashMap<String, String>,
    #[serde(default, alias = "taskDomains")]
    task_domains: HashMap<String, String>,
}

fn decode_record(role: &str, value: serde_json::Value) -> AgentCapability {
    // Inject the map key as the role so records do not have to repeat it
    let mut value = value;
    if let Some(obj) = value.as_object_mut() {
        obj.entry("role".to_string())
            .or_insert_with(|| serde_json::Value::String(role.to_string()));
    }
    match serde_json::from_value::<AgentCapability>(value) {
        Ok(mut cap) => {
            cap.role = role.to_string();
            cap
        }
        Err(err) => {
            warn!(role = %role, error = %err, "Malformed capability record, retaining partial entry");
            AgentCapability::new(role)
        }
    }
}

fn resolve_document(raw: RawDocument) -> CapabilityDocument {
    let capabilities = raw
        .capabilities
        .into_iter()
        .map(|(role, value)| decode_record(&role, value))
        .collect();
    CapabilityDocument {
        capabilities,
        selection_criteria: raw.selection_criteria,
        task_domains: raw.task_domains,
    }
}

/// Capability source backed by a JSON file on disk
pub struct FileCapabilitySource {
    path: PathBuf,
}

impl FileCapabilitySource {
    /// Create a source reading from the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CapabilitySource for FileCapabilitySource {
    async fn load(&self) -> Result<CapabilityDocument> {
        debug!(path = %self.path.display(), "Loading capability document");
        let content = tokio::fs::read_to_string(&self.path).await?;
        let raw: RawDocument = serde_json::from_str(&content).map_err(|err| {
            CapabilityError::InvalidDocument(format!(
                "{}: {}",
                self.path.display(),
                err
            ))
        })?;
        Ok(resolve_document(raw))
    }
}

/// In-memory capability source for tests and embedded use
pub struct StaticCapabilitySource {
    document: CapabilityDocument,
}

impl StaticCapabilitySource {
    /// Create a source serving the given document
    pub fn new(document: CapabilityDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl CapabilitySource for StaticCapabilitySource {
    async fn load(&self) -> Result<CapabilityDocument> {
        Ok(self.document.clone())
    }
}

/// Built-in default capability document
///
/// Ships a workable agent roster so hosts can run without any external
/// configuration. Roles here line up with the classifier's suggestion table
/// and the resolver's fallback heuristic.
pub fn default_document() -> CapabilityDocument {
    let capabilities = vec![
        AgentCapability::new("tech-lead")
            .with_domains(&["backend", "infrastructure", "frontend-framework", "core-language"])
            .with_expertise(&["architecture", "code-review", "system-design"])
            .with_priority(10)
            .with_criteria(&["cross-cutting", "multi-domain"]),
        AgentCapability::new("infra-specialist")
            .with_domains(&["infrastructure"])
            .with_expertise(&["terraform", "kubernetes", "docker", "aws", "ci"])
            .with_priority(8)
            .with_criteria(&["dockerfile", "terraform", "kubernetes", "ci-pipeline"]),
        AgentCapability::new("security-specialist")
            .with_domains(&["security"])
            .with_expertise(&["authentication", "cryptography", "oauth"])
            .with_priority(8)
            .with_criteria(&["auth-flow", "secrets"]),
        AgentCapability::new("frontend-framework-specialist")
            .with_domains(&["frontend-framework"])
            .with_expertise(&["react", "vue", "angular", "next"])
            .with_priority(7)
            .with_criteria(&["react-components", "hooks", "state-management"]),
        AgentCapability::new("backend-engineer")
            .with_domains(&["backend", "core-language"])
            .with_expertise(&["express", "postgres", "rest", "graphql"])
            .with_priority(6)
            .with_criteria(&["rest-api", "database", "service-layer"]),
        AgentCapability::new("systems-engineer")
            .with_domains(&["core-language"])
            .with_expertise(&["rust", "go", "performance"])
            .with_priority(6)
            .with_criteria(&["native-code"]),
        AgentCapability::new("frontend-engineer")
            .with_domains(&["frontend-general"])
            .with_expertise(&["css", "html", "accessibility"])
            .with_priority(5)
            .with_criteria(&["stylesheets", "markup"]),
        AgentCapability::new("design-reviewer")
            .with_domains(&["design"])
            .with_expertise(&["figma", "ux", "design-systems"])
            .with_priority(4)
            .with_criteria(&["design-assets"]),
    ];

    let selection_criteria = [
        ("dockerfile", "Container build files are among the affected files"),
        ("terraform", "Terraform configuration is among the affected files"),
        ("kubernetes", "Kubernetes manifests are among the affected files"),
        ("ci-pipeline", "CI pipeline definitions are among the affected files"),
        ("auth-flow", "Authentication or authorization code paths are touched"),
        ("secrets", "Secret or credential handling is touched"),
        ("react-components", "React component files are among the affected files"),
        ("hooks", "React hook files are among the affected files"),
        ("state-management", "Client state management code is touched"),
        ("rest-api", "REST controllers or routes are among the affected files"),
        ("database", "Database models or migrations are among the affected files"),
        ("service-layer", "Service-layer modules are among the affected files"),
        ("native-code", "Systems-language sources are among the affected files"),
        ("stylesheets", "Stylesheets are among the affected files"),
        ("markup", "Markup files are among the affected files"),
        ("design-assets", "Design tool assets are among the affected files"),
        ("cross-cutting", "The change spans several layers of the codebase"),
        ("multi-domain", "More than one domain is implicated"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let task_domains = [
        ("infrastructure", "Deployment, containers, orchestration and CI"),
        ("security", "Authentication, authorization and secret handling"),
        ("backend", "Server-side services, APIs and persistence"),
        ("frontend-framework", "Component-framework UI work"),
        ("frontend-general", "Markup, styling and general UI work"),
        ("core-language", "Language-level, algorithmic and tooling work"),
        ("design", "Visual design and UX artifacts"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    CapabilityDocument {
        capabilities,
        selection_criteria,
        task_domains,
    }
}
