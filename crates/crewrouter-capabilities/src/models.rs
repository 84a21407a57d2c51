//! Data models for agent capabilities

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Capability record for a single agent role
///
/// `role` and `priority` are the required fields; the list fields default to
/// empty so partially-specified records load as best-effort entries instead of
/// being rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapability {
    /// Unique role identifier (e.g. "backend-engineer")
    pub role: String,
    /// Domain tags this agent covers
    #[serde(default)]
    pub domains: Vec<String>,
    /// Technologies and topics this agent is expert in
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Seniority/authority weight; higher wins ties
    #[serde(default)]
    pub priority: i32,
    /// Fine-grained selection criteria tags
    #[serde(default, alias = "selectionCriteria")]
    pub selection_criteria: Vec<String>,
}

impl AgentCapability {
    /// Create a capability with just a role, everything else defaulted
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            domains: Vec::new(),
            expertise: Vec::new(),
            priority: 0,
            selection_criteria: Vec::new(),
        }
    }

    /// Set the covered domains
    pub fn with_domains(mut self, domains: &[&str]) -> Self {
        self.domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Set the expertise list
    pub fn with_expertise(mut self, expertise: &[&str]) -> Self {
        self.expertise = expertise.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the selection criteria tags
    pub fn with_criteria(mut self, criteria: &[&str]) -> Self {
        self.selection_criteria = criteria.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Check whether this agent covers the given domain tag
    pub fn covers_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }

    /// Count how many of the given criteria this agent declares
    pub fn matching_criteria(&self, criteria: &[String]) -> usize {
        criteria
            .iter()
            .filter(|c| {
                self.selection_criteria
                    .iter()
                    .any(|own| own.eq_ignore_ascii_case(c))
            })
            .count()
    }
}

/// Fully-resolved capability document: the three sections every
/// configuration source must produce
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityDocument {
    /// Capability records in declaration order
    pub capabilities: Vec<AgentCapability>,
    /// Criterion tag -> human-readable description
    #[serde(default)]
    pub selection_criteria: HashMap<String, String>,
    /// Domain tag -> human-readable description
    #[serde(default)]
    pub task_domains: HashMap<String, String>,
}

/// Aggregate statistics over the loaded registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Number of loaded agent records
    pub total_agents: usize,
    /// Number of distinct domain tags across all agents
    pub total_domains: usize,
    /// Number of described selection criteria
    pub total_criteria: usize,
    /// Agent count per domain tag
    pub agents_per_domain: HashMap<String, usize>,
    /// Average number of selection criteria per agent
    pub avg_criteria_per_agent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_builder() {
        let cap = AgentCapability::new("backend-engineer")
            .with_domains(&["backend", "core-language"])
            .with_priority(6);
        assert_eq!(cap.role, "backend-engineer");
        assert_eq!(cap.domains.len(), 2);
        assert_eq!(cap.priority, 6);
        assert!(cap.expertise.is_empty());
    }

    #[test]
    fn test_covers_domain_case_insensitive() {
        let cap = AgentCapability::new("infra-specialist").with_domains(&["infrastructure"]);
        assert!(cap.covers_domain("Infrastructure"));
        assert!(!cap.covers_domain("backend"));
    }

    #[test]
    fn test_matching_criteria_counts() {
        let cap = AgentCapability::new("infra-specialist")
            .with_criteria(&["dockerfile", "terraform", "ci-pipeline"]);
        let wanted = vec!["terraform".to_string(), "dockerfile".to_string()];
        assert_eq!(cap.matching_criteria(&wanted), 2);
        assert_eq!(cap.matching_criteria(&[]), 0);
    }

    #[test]
    fn test_partial_record_deserializes() {
        let cap: AgentCapability =
            serde_json::from_str(r#"{"role": "design-reviewer"}"#).unwrap();
        assert_eq!(cap.role, "design-reviewer");
        assert_eq!(cap.priority, 0);
        assert!(cap.domains.is_empty());
        assert!(cap.selection_criteria.is_empty());
    }
}
