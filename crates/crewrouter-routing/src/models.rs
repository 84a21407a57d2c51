//! Data models for task classification and agent resolution

use crewrouter_capabilities::AgentCapability;
use serde::{Deserialize, Serialize};

/// Task complexity bands used by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Small, contained change
    Low,
    /// Typical multi-file change
    Medium,
    /// Large or cross-cutting change
    High,
}

impl Complexity {
    /// Get complexity name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

/// Description of an incoming unit of work
///
/// Immutable per resolution call. `primary_domain`, `secondary_domains` and
/// `complexity` are optional caller overrides; everything else is derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskContext {
    /// Free-form task description
    pub description: String,
    /// Files the task touches
    #[serde(default)]
    pub affected_files: Vec<String>,
    /// Declared dependencies of the task
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Explicit complexity override
    #[serde(default)]
    pub complexity: Option<Complexity>,
    /// Explicit primary-domain override; skips keyword classification
    #[serde(default)]
    pub primary_domain: Option<String>,
    /// Additional implicated domains
    #[serde(default)]
    pub secondary_domains: Vec<String>,
}

impl TaskContext {
    /// Create a task context from a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Set the affected files
    pub fn with_files(mut self, files: &[&str]) -> Self {
        self.affected_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Set the declared dependencies
    pub fn with_dependencies(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Set an explicit complexity
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    /// Set an explicit primary domain
    pub fn with_primary_domain(mut self, domain: impl Into<String>) -> Self {
        self.primary_domain = Some(domain.into());
        self
    }

    /// Set the secondary domains
    pub fn with_secondary_domains(mut self, domains: &[&str]) -> Self {
        self.secondary_domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }
}

/// Result of classifying a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskClassification {
    /// Winning domain tag
    pub primary_domain: String,
    /// Calibrated classification confidence (0.0 to 1.0)
    pub confidence: f64,
    /// Derived or caller-supplied complexity
    pub complexity: Complexity,
    /// Human-readable classification reasons
    pub reasons: Vec<String>,
    /// Suggested agent roles, most relevant first
    pub suggested_agents: Vec<String>,
}

/// Signals extracted from the affected files of a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodebaseContext {
    /// Deduplicated lowercase file extensions (plus special-cased basenames)
    pub affected_file_types: Vec<String>,
    /// Deduplicated external module references found in file contents
    pub import_patterns: Vec<String>,
    /// Detected architectural patterns
    pub architectural_patterns: Vec<String>,
    /// Detected technologies
    pub technology_stack: Vec<String>,
    /// Detected infrastructure components
    pub infrastructure_components: Vec<String>,
}

/// Score for one registered agent against one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentScore {
    /// Scored agent role
    pub role: String,
    /// Final weighted score (0.0 to 1.0)
    pub score: f64,
    /// One reason per non-zero scoring contribution
    pub reasons: Vec<String>,
    /// The capability record that was scored
    pub capability: AgentCapability,
}

/// Final resolver decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSelection {
    /// Selected agent role
    pub selected_agent: String,
    /// Calibrated selection confidence (0.0 to 1.0)
    pub confidence: f64,
    /// Reasons behind the selection
    pub reasons: Vec<String>,
    /// Non-selected scored candidates, best first
    pub alternatives: Vec<AgentScore>,
    /// Heuristic safety-net role, always populated
    pub fallback_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_context_builder() {
        let task = TaskContext::new("Add login endpoint")
            .with_files(&["src/controllers/auth.ts"])
            .with_dependencies(&["express"])
            .with_complexity(Complexity::Medium);
        assert_eq!(task.affected_files.len(), 1);
        assert_eq!(task.dependencies.len(), 1);
        assert_eq!(task.complexity, Some(Complexity::Medium));
        assert!(task.primary_domain.is_none());
    }

    #[test]
    fn test_complexity_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Complexity::High).unwrap(),
            "\"high\""
        );
        let parsed: Complexity = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, Complexity::Low);
    }

    #[test]
    fn test_task_context_deserializes_with_defaults() {
        let task: TaskContext =
            serde_json::from_str(r#"{"description": "Fix the build"}"#).unwrap();
        assert!(task.affected_files.is_empty());
        assert!(task.secondary_domains.is_empty());
        assert!(task.complexity.is_none());
    }
}
