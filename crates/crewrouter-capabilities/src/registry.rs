//! Capability registry: loading, indexing and lookup of agent records

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::{
    error::{CapabilityError, Result},
    models::{AgentCapability, CapabilityDocument, RegistryStats},
    source::{default_document, CapabilitySource, StaticCapabilitySource},
};

/// Fully-built registry indexes, swapped in as one unit on load
struct RegistryState {
    /// Records in document declaration order
    capabilities: Vec<AgentCapability>,
    by_role: HashMap<String, usize>,
    criteria_descriptions: HashMap<String, String>,
    domain_descriptions: HashMap<String, String>,
}

impl RegistryState {
    fn build(document: CapabilityDocument) -> Self {
        let mut by_role = HashMap::new();
        for (idx, cap) in document.capabilities.iter().enumerate() {
            by_role.insert(cap.role.clone(), idx);
        }
        Self {
            capabilities: document.capabilities,
            by_role,
            criteria_descriptions: document.selection_criteria,
            domain_descriptions: document.task_domains,
        }
    }
}

/// Registry of agent capability records
///
/// Constructed empty; `initialize()` loads the capability document from the
/// configured source and builds the lookup indexes. Accessors called before
/// initialization fail with [`CapabilityError::NotInitialized`] rather than
/// silently returning empty data. `reload()` rebuilds the indexes from the
/// source and swaps them in atomically, so concurrent readers observe either
/// the old state or the new one, never a mix.
pub struct CapabilityRegistry {
    source: Arc<dyn CapabilitySource>,
    state: RwLock<Option<Arc<RegistryState>>>,
}

impl CapabilityRegistry {
    /// Create an uninitialized registry over the given source
    pub fn new(source: Arc<dyn CapabilitySource>) -> Self {
        Self {
            source,
            state: RwLock::new(None),
        }
    }

    /// Create a registry over the built-in default capability document
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(StaticCapabilitySource::new(default_document())))
    }

    /// Load the capability document and build the indexes
    pub async fn initialize(&self) -> Result<()> {
        let document = self.source.load().await?;
        let state = RegistryState::build(document);
        info!(
            agents = state.capabilities.len(),
            criteria = state.criteria_descriptions.len(),
            domains = state.domain_descriptions.len(),
            "Capability registry initialized"
        );
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(state));
        Ok(())
    }

    /// Re-run the load and atomically replace all indexes
    pub async fn reload(&self) -> Result<()> {
        debug!("Reloading capability registry");
        self.initialize().await
    }

    /// Whether `initialize()` has completed
    pub fn is_initialized(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn current(&self) -> Result<Arc<RegistryState>> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(CapabilityError::NotInitialized)
    }

    /// Get the capability record for a role
    pub fn capability(&self, role: &str) -> Result<AgentCapability> {
        let state = self.current()?;
        state
            .by_role
            .get(role)
            .map(|idx| state.capabilities[*idx].clone())
            .ok_or_else(|| CapabilityError::AgentNotFound(role.to_string()))
    }

    /// Whether the given role is registered
    pub fn has_agent(&self, role: &str) -> Result<bool> {
        Ok(self.current()?.by_role.contains_key(role))
    }

    /// All capability records in document declaration order
    pub fn all_capabilities(&self) -> Result<Vec<AgentCapability>> {
        Ok(self.current()?.capabilities.clone())
    }

    /// All roles covering the given domain, sorted by priority descending
    ///
    /// Unknown domains yield an empty list, never an error.
    pub fn find_agents_by_domain(&self, domain: &str) -> Result<Vec<AgentCapability>> {
        let state = self.current()?;
        let mut matches: Vec<AgentCapability> = state
            .capabilities
            .iter()
            .filter(|cap| cap.covers_domain(domain))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(matches)
    }

    /// All roles matching at least one criterion, sorted by match count
    /// descending with priority descending as the tie-break
    pub fn find_agents_by_criteria(&self, criteria: &[String]) -> Result<Vec<AgentCapability>> {
        if criteria.is_empty() {
            return Ok(Vec::new());
        }
        let state = self.current()?;
        let mut matches: Vec<(usize, AgentCapability)> = state
            .capabilities
            .iter()
            .filter_map(|cap| {
                let count = cap.matching_criteria(criteria);
                (count > 0).then(|| (count, cap.clone()))
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.priority.cmp(&a.1.priority)));
        Ok(matches.into_iter().map(|(_, cap)| cap).collect())
    }

    /// Best agent for a domain, preferring one that also matches the criteria
    ///
    /// Falls back to the highest-priority domain match when no role matches
    /// both; returns `None` for an unknown domain.
    pub fn find_best_agent(
        &self,
        domain: &str,
        criteria: Option<&[String]>,
    ) -> Result<Option<AgentCapability>> {
        let by_domain = self.find_agents_by_domain(domain)?;
        if by_domain.is_empty() {
            return Ok(None);
        }
        if let Some(criteria) = criteria.filter(|c| !c.is_empty()) {
            let mut scored: Vec<(usize, &AgentCapability)> = by_domain
                .iter()
                .filter_map(|cap| {
                    let count = cap.matching_criteria(criteria);
                    (count > 0).then_some((count, cap))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.priority.cmp(&a.1.priority)));
            if let Some((_, cap)) = scored.first() {
                return Ok(Some((*cap).clone()));
            }
        }
        // Highest priority domain match; the list is already sorted
        Ok(by_domain.into_iter().next())
    }

    /// Human-readable description for a criterion tag, if one was declared
    pub fn criterion_description(&self, criterion: &str) -> Result<Option<String>> {
        Ok(self.current()?.criteria_descriptions.get(criterion).cloned())
    }

    /// Human-readable description for a domain tag, if one was declared
    pub fn domain_description(&self, domain: &str) -> Result<Option<String>> {
        Ok(self.current()?.domain_descriptions.get(domain).cloned())
    }

    /// Aggregate statistics over the loaded records
    pub fn stats(&self) -> Result<RegistryStats> {
        let state = self.current()?;
        let mut agents_per_domain: HashMap<String, usize> = HashMap::new();
        let mut distinct_domains: HashSet<&str> = HashSet::new();
        let mut total_criteria_tags = 0usize;
        for cap in &state.capabilities {
            total_criteria_tags += cap.selection_criteria.len();
            for domain in &cap.domains {
                distinct_domains.insert(domain.as_str());
                *agents_per_domain.entry(domain.clone()).or_insert(0) += 1;
            }
        }
        let total_agents = state.capabilities.len();
        let avg_criteria_per_agent = if total_agents == 0 {
            0.0
        } else {
            total_criteria_tags as f64 / total_agents as f64
        };
        Ok(RegistryStats {
            total_agents,
            total_domains: distinct_domains.len(),
            total_criteria: state.criteria_descriptions.len(),
            agents_per_domain,
            avg_criteria_per_agent,
        })
    }
}
