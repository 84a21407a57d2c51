//! Multi-factor agent scoring
//!
//! Scores every registered agent against a task classification and codebase
//! context. Four weighted contributions (domain alignment, expertise overlap,
//! selection criteria, priority bonus) are summed and multiplied by the
//! classification confidence, so a zero-confidence classification forces
//! every score to exactly zero.
//!
//! Registry failures (e.g. an uninitialized registry) surface synchronously
//! as `Err` from the scoring call; there is no deferred error path.

use std::sync::Arc;

use crewrouter_capabilities::{AgentCapability, CapabilityRegistry};
use tracing::debug;

use crate::{
    error::Result,
    models::{AgentScore, CodebaseContext, TaskClassification},
};

/// Weight of a primary-domain match
const DOMAIN_WEIGHT: f64 = 0.5;
/// Weight of a related-domain match
const RELATED_DOMAIN_WEIGHT: f64 = 0.25;
/// First overlapping expertise term
const EXPERTISE_BASE: f64 = 0.1;
/// Each further overlapping expertise term
const EXPERTISE_STEP: f64 = 0.05;
/// Expertise contribution cap
const EXPERTISE_CAP: f64 = 0.2;
/// Each satisfied selection criterion
const CRITERION_WEIGHT: f64 = 0.05;
/// Criteria contribution cap
const CRITERIA_CAP: f64 = 0.2;
/// Priority bonus cap
const PRIORITY_CAP: f64 = 0.1;

/// Domains considered adjacent for partial domain credit
fn related_domains(domain: &str) -> &'static [&'static str] {
    match domain {
        "infrastructure" => &["backend", "security"],
        "security" => &["backend", "infrastructure"],
        "backend" => &["core-language", "infrastructure"],
        "frontend-framework" => &["frontend-general", "core-language"],
        "frontend-general" => &["frontend-framework", "design"],
        "core-language" => &["backend", "frontend-framework"],
        "design" => &["frontend-general"],
        _ => &[],
    }
}

/// Scores registered agents against a classified task
pub struct CapabilityMatcher {
    registry: Arc<CapabilityRegistry>,
}

impl CapabilityMatcher {
    /// Create a matcher over the given registry
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Score every registered agent, sorted descending by score
    ///
    /// An empty registry yields an empty list. Fails only when the registry
    /// itself fails (not initialized or load error).
    pub fn score_agents(
        &self,
        classification: &TaskClassification,
        context: &CodebaseContext,
    ) -> Result<Vec<AgentScore>> {
        let capabilities = self.registry.all_capabilities()?;
        let mut scores: Vec<AgentScore> = capabilities
            .into_iter()
            .map(|capability| score_agent(capability, classification, context))
            .collect();
        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.capability.priority.cmp(&a.capability.priority))
        });
        debug!(
            agents = scores.len(),
            top = scores.first().map(|s| s.role.as_str()).unwrap_or("-"),
            "Agents scored"
        );
        Ok(scores)
    }

    /// Top-scored agent, or `None` when the registry is empty
    pub fn find_best_agent(
        &self,
        classification: &TaskClassification,
        context: &CodebaseContext,
    ) -> Result<Option<AgentScore>> {
        Ok(self.score_agents(classification, context)?.into_iter().next())
    }

    /// All agents scoring at or above the given threshold
    pub fn qualified_agents(
        &self,
        classification: &TaskClassification,
        context: &CodebaseContext,
        min_score: f64,
    ) -> Result<Vec<AgentScore>> {
        Ok(self
            .score_agents(classification, context)?
            .into_iter()
            .filter(|agent| agent.score >= min_score)
            .collect())
    }
}

fn score_agent(
    capability: AgentCapability,
    classification: &TaskClassification,
    context: &CodebaseContext,
) -> AgentScore {
    let mut raw = 0.0;
    let mut reasons = Vec::new();

    // Domain alignment, the dominant factor
    if capability.covers_domain(&classification.primary_domain) {
        raw += DOMAIN_WEIGHT;
        reasons.push("Primary domain match".to_string());
    } else {
        let related = related_domains(&classification.primary_domain);
        if let Some(adjacent) = capability
            .domains
            .iter()
            .find(|d| related.iter().any(|r| d.eq_ignore_ascii_case(r)))
        {
            raw += RELATED_DOMAIN_WEIGHT;
            reasons.push(format!("Related domain match: {adjacent}"));
        }
    }

    // Expertise vs detected technologies and imports
    let known_terms: Vec<&String> = context
        .technology_stack
        .iter()
        .chain(context.import_patterns.iter())
        .collect();
    let overlapping: Vec<&str> = capability
        .expertise
        .iter()
        .filter(|e| known_terms.iter().any(|t| t.eq_ignore_ascii_case(e)))
        .map(|e| e.as_str())
        .collect();
    if !overlapping.is_empty() {
        let contribution = (EXPERTISE_BASE + EXPERTISE_STEP * (overlapping.len() - 1) as f64)
            .min(EXPERTISE_CAP);
        raw += contribution;
        reasons.push(format!("Technology alignment: {}", overlapping.join(", ")));
    }

    // Selection criteria satisfied by the context
    let satisfied: Vec<&str> = capability
        .selection_criteria
        .iter()
        .filter(|criterion| criterion_satisfied(criterion, context))
        .map(|c| c.as_str())
        .collect();
    if !satisfied.is_empty() {
        raw += (CRITERION_WEIGHT * satisfied.len() as f64).min(CRITERIA_CAP);
        reasons.push(format!("Selection criteria matched: {}", satisfied.join(", ")));
    }

    // Seniority bonus so generalists are not starved on ties
    if capability.priority > 0 {
        raw += (f64::from(capability.priority) / 100.0).min(PRIORITY_CAP);
        reasons.push("Priority bonus".to_string());
    }

    if reasons.is_empty() {
        reasons.push("No significant alignment".to_string());
    }

    let score = (raw * classification.confidence).clamp(0.0, 1.0);
    AgentScore {
        role: capability.role.clone(),
        score,
        reasons,
        capability,
    }
}

/// A criterion is satisfied when it names a signal present in the context:
/// exact match or shared token with any file type, technology, import,
/// architectural pattern or infrastructure component
fn criterion_satisfied(criterion: &str, context: &CodebaseContext) -> bool {
    let criterion = criterion.to_lowercase();
    let criterion_tokens = tokens(&criterion);
    context
        .affected_file_types
        .iter()
        .chain(context.technology_stack.iter())
        .chain(context.import_patterns.iter())
        .chain(context.architectural_patterns.iter())
        .chain(context.infrastructure_components.iter())
        .any(|term| {
            let term = term.to_lowercase();
            term == criterion || tokens(&term).iter().any(|t| criterion_tokens.contains(t))
        })
}

fn tokens(value: &str) -> Vec<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
