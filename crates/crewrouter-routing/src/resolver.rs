//! Top-level agent resolution
//!
//! Orchestrates classify -> analyze -> score in a single pass and returns a
//! well-formed [`AgentSelection`] for every input: stage failures collapse to
//! a hard-fallback selection, an empty score list falls back to the
//! file-pattern heuristic, and the fallback agent is always computed
//! independently of scoring so it can never be empty.

use std::sync::Arc;

use crewrouter_capabilities::{CapabilityRegistry, RegistryStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    classifier::TaskClassifier,
    context::ContextAnalyzer,
    error::RoutingError,
    fs::FileReader,
    keywords::KeywordRegistry,
    matcher::CapabilityMatcher,
    models::{AgentScore, AgentSelection, CodebaseContext, TaskClassification, TaskContext},
    Result,
};

/// Selections below this confidence carry a low-confidence warning reason
pub const MIN_CONFIDENCE: f64 = 0.3;
/// Scores at or above this are reported unchanged, no ambiguity discount
pub const HIGH_CONFIDENCE: f64 = 0.75;
/// Top-two gap below which a decision is considered ambiguous
const AMBIGUITY_MARGIN: f64 = 0.2;
/// Multiplier applied to an ambiguous top score
const AMBIGUITY_DISCOUNT: f64 = 0.6;
/// Confidence reported on fallback paths
const FALLBACK_CONFIDENCE: f64 = 0.1;
/// Generalist role used by the hard-fallback terminal state and as the
/// system-wide default of the file-pattern heuristic
const FALLBACK_ROLE: &str = "backend-engineer";

/// Full intermediate pipeline state, for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    /// Classifier output
    pub classification: TaskClassification,
    /// Context analyzer output
    pub context: CodebaseContext,
    /// All agent scores, best first
    pub scores: Vec<AgentScore>,
    /// Final selection
    pub selection: AgentSelection,
}

/// Result of a service health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceValidation {
    /// Whether all services are usable
    pub valid: bool,
    /// Human-readable issue descriptions
    pub issues: Vec<String>,
    /// Registry statistics, when the registry is usable
    pub stats: Option<RegistryStats>,
}

/// Confidence thresholds the resolver applies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this, selections carry a low-confidence warning
    pub min_confidence: f64,
    /// At or above this, scores are never discounted
    pub high_confidence: f64,
}

/// Resolver cache and threshold snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverStats {
    /// Entries in the context analyzer cache
    pub context_cache_size: usize,
    /// Active confidence thresholds
    pub thresholds: Thresholds,
}

/// Resolves a task context to the best-suited agent
pub struct AgentResolver {
    classifier: TaskClassifier,
    analyzer: ContextAnalyzer,
    matcher: CapabilityMatcher,
    registry: Arc<CapabilityRegistry>,
}

impl AgentResolver {
    /// Create a resolver with a default keyword registry over the given
    /// capability registry and file reader
    pub fn new(registry: Arc<CapabilityRegistry>, reader: Arc<dyn FileReader>) -> Self {
        Self::with_keywords(registry, reader, Arc::new(KeywordRegistry::new()))
    }

    /// Create a resolver with an explicit keyword registry
    pub fn with_keywords(
        registry: Arc<CapabilityRegistry>,
        reader: Arc<dyn FileReader>,
        keywords: Arc<KeywordRegistry>,
    ) -> Self {
        Self {
            classifier: TaskClassifier::new(keywords),
            analyzer: ContextAnalyzer::new(reader),
            matcher: CapabilityMatcher::new(registry.clone()),
            registry,
        }
    }

    /// Resolve the best-suited agent for a task
    ///
    /// Never fails: every error path collapses to a well-formed fallback
    /// selection with degraded confidence.
    pub async fn resolve(&self, task: &TaskContext) -> AgentSelection {
        let classification = self.classifier.classify(task);

        let context = match self.analyzer.analyze(&task.affected_files).await {
            Ok(context) => context,
            Err(err) => return self.hard_fallback(&err),
        };

        let scores = match self.matcher.score_agents(&classification, &context) {
            Ok(scores) => scores,
            Err(err) => return self.hard_fallback(&err),
        };

        // Safety net, independent of the scoring outcome
        let fallback_agent = heuristic_role(&task.affected_files).to_string();

        if scores.is_empty() {
            debug!("No agent scores available; using file-pattern heuristic");
            return AgentSelection {
                selected_agent: fallback_agent.clone(),
                confidence: FALLBACK_CONFIDENCE,
                reasons: vec!["No agent scores available".to_string()],
                alternatives: Vec::new(),
                fallback_agent,
            };
        }

        let mut scores = scores;
        let top = scores.remove(0);
        let runner_up = scores.first().map(|s| s.score);
        let confidence = calibrate(top.score, runner_up);

        let mut reasons = top.reasons;
        if confidence < MIN_CONFIDENCE {
            reasons.push("Low confidence in agent selection".to_string());
        }

        debug!(
            agent = %top.role,
            confidence = confidence,
            raw_score = top.score,
            "Agent resolved"
        );
        AgentSelection {
            selected_agent: top.role,
            confidence,
            reasons,
            alternatives: scores,
            fallback_agent,
        }
    }

    /// Terminal state for stage failures; inspects nothing beyond the error
    fn hard_fallback(&self, err: &RoutingError) -> AgentSelection {
        warn!(error = %err, "Automatic agent selection failed");
        AgentSelection {
            selected_agent: FALLBACK_ROLE.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            reasons: vec![
                "Automatic agent selection failed".to_string(),
                format!("Using fallback agent: {FALLBACK_ROLE}"),
            ],
            alternatives: Vec::new(),
            fallback_agent: FALLBACK_ROLE.to_string(),
        }
    }

    /// Full intermediate pipeline state for one task, for diagnostics
    pub async fn detailed_analysis(&self, task: &TaskContext) -> Result<DetailedAnalysis> {
        let classification = self.classifier.classify(task);
        let context = self.analyzer.analyze(&task.affected_files).await?;
        let scores = self.matcher.score_agents(&classification, &context)?;
        let selection = self.resolve(task).await;
        Ok(DetailedAnalysis {
            classification,
            context,
            scores,
            selection,
        })
    }

    /// Check that the capability registry is usable, initializing it if needed
    pub async fn validate_services(&self) -> ServiceValidation {
        let mut issues = Vec::new();
        if !self.registry.is_initialized() {
            if let Err(err) = self.registry.initialize().await {
                issues.push(format!("Capability registry failed to initialize: {err}"));
            }
        }
        let stats = match self.registry.stats() {
            Ok(stats) => {
                if stats.total_agents == 0 {
                    issues.push("No agent capabilities are loaded".to_string());
                }
                Some(stats)
            }
            Err(err) => {
                issues.push(format!("Capability registry unavailable: {err}"));
                None
            }
        };
        ServiceValidation {
            valid: issues.is_empty(),
            issues,
            stats,
        }
    }

    /// Drop all cached context analyses
    pub async fn clear_caches(&self) {
        self.analyzer.clear_cache().await;
    }

    /// Cache sizes and active thresholds
    pub async fn stats(&self) -> ResolverStats {
        ResolverStats {
            context_cache_size: self.analyzer.cache_size().await,
            thresholds: Thresholds {
                min_confidence: MIN_CONFIDENCE,
                high_confidence: HIGH_CONFIDENCE,
            },
        }
    }
}

/// Confidence calibration over the top two scores
///
/// High scores pass through unchanged; a close second place signals an
/// ambiguous decision and discounts the reported confidence well below the
/// raw top score while the top agent stays selected.
fn calibrate(top: f64, runner_up: Option<f64>) -> f64 {
    if top >= HIGH_CONFIDENCE {
        return top;
    }
    match runner_up {
        Some(second) if top - second < AMBIGUITY_MARGIN => {
            (top * AMBIGUITY_DISCOUNT).max(FALLBACK_CONFIDENCE)
        }
        _ => top,
    }
}

/// File-pattern heuristic: deterministic role choice from path strings only,
/// first matching precedence level wins
fn heuristic_role(files: &[String]) -> &'static str {
    if files.iter().any(|f| is_infra_path(f)) {
        return "infra-specialist";
    }
    if files.iter().any(|f| is_ui_framework_path(f)) {
        return "frontend-framework-specialist";
    }
    // Backend path match and the system default coincide
    FALLBACK_ROLE
}

fn is_infra_path(file: &str) -> bool {
    let path = file.to_lowercase();
    let name = path.rsplit('/').next().unwrap_or(&path);
    let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    matches!(ext, "tf" | "tfvars")
        || matches!(name, "dockerfile" | "jenkinsfile")
        || name.starts_with("docker-compose")
        || path.contains(".github/workflows")
        || path
            .split('/')
            .any(|part| matches!(part, "k8s" | "kubernetes" | "terraform" | "helm" | "ansible"))
}

fn is_ui_framework_path(file: &str) -> bool {
    let path = file.to_lowercase();
    let name = path.rsplit('/').next().unwrap_or(&path);
    let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    matches!(ext, "tsx" | "jsx" | "vue" | "svelte")
        || path
            .split('/')
            .any(|part| matches!(part, "components" | "hooks" | "pages"))
}

#[cfg(test)]
mod tests {
    use crewrouter_capabilities::{
        AgentCapability, CapabilityDocument, StaticCapabilitySource,
    };

    use super::*;
    use crate::fs::FsFileReader;

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    async fn resolver_over(document: CapabilityDocument) -> AgentResolver {
        let registry = Arc::new(CapabilityRegistry::new(Arc::new(
            StaticCapabilitySource::new(document),
        )));
        registry.initialize().await.unwrap();
        AgentResolver::new(registry, Arc::new(FsFileReader))
    }

    async fn default_resolver() -> AgentResolver {
        let registry = Arc::new(CapabilityRegistry::with_defaults());
        registry.initialize().await.unwrap();
        AgentResolver::new(registry, Arc::new(FsFileReader))
    }

    #[tokio::test]
    async fn test_resolve_returns_well_formed_selection() {
        let resolver = default_resolver().await;
        let task = TaskContext::new("Fix the docker deployment pipeline")
            .with_files(&["infra/main.tf", "Dockerfile"]);
        let selection = resolver.resolve(&task).await;
        assert!(!selection.selected_agent.is_empty());
        assert!(!selection.fallback_agent.is_empty());
        assert!((0.0..=1.0).contains(&selection.confidence));
        assert!(!selection.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_infra_files_yield_infra_fallback() {
        // Scenario: infra-flavored files and an empty agent roster
        let resolver = resolver_over(CapabilityDocument::default()).await;
        let task = TaskContext::new("")
            .with_files(&["infra/main.tf", "k8s/deploy.yaml", "Dockerfile"]);
        let selection = resolver.resolve(&task).await;
        assert_eq!(selection.fallback_agent, "infra-specialist");
        assert_eq!(selection.selected_agent, "infra-specialist");
        assert_eq!(selection.confidence, 0.1);
        assert_eq!(selection.reasons, vec!["No agent scores available".to_string()]);
    }

    #[tokio::test]
    async fn test_backend_files_yield_backend_fallback() {
        let resolver = resolver_over(CapabilityDocument::default()).await;
        let task = TaskContext::new("")
            .with_files(&["src/controllers/api.ts", "src/services/db.ts"]);
        let selection = resolver.resolve(&task).await;
        assert_eq!(selection.fallback_agent, "backend-engineer");
    }

    #[tokio::test]
    async fn test_ui_files_yield_frontend_fallback() {
        let resolver = resolver_over(CapabilityDocument::default()).await;
        let task = TaskContext::new("").with_files(&["src/components/Button.tsx"]);
        let selection = resolver.resolve(&task).await;
        assert_eq!(selection.fallback_agent, "frontend-framework-specialist");
    }

    #[tokio::test]
    async fn test_no_files_yield_default_fallback() {
        let resolver = resolver_over(CapabilityDocument::default()).await;
        let selection = resolver.resolve(&TaskContext::new("")).await;
        assert_eq!(selection.fallback_agent, "backend-engineer");
    }

    #[tokio::test]
    async fn test_heuristic_precedence_infra_over_ui() {
        let role = heuristic_role(&files(&["src/components/App.tsx", "deploy/k8s/app.yaml"]));
        assert_eq!(role, "infra-specialist");
    }

    #[tokio::test]
    async fn test_fallback_computed_even_when_scoring_succeeds() {
        let resolver = default_resolver().await;
        let task = TaskContext::new("Improve the react component rendering")
            .with_files(&["src/components/App.tsx"]);
        let selection = resolver.resolve(&task).await;
        assert_eq!(selection.fallback_agent, "frontend-framework-specialist");
        assert!(!selection.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_uninitialized_registry_hits_hard_fallback() {
        let registry = Arc::new(CapabilityRegistry::with_defaults());
        let resolver = AgentResolver::new(registry, Arc::new(FsFileReader));
        let selection = resolver.resolve(&TaskContext::new("anything")).await;
        assert_eq!(selection.selected_agent, "backend-engineer");
        assert_eq!(selection.fallback_agent, "backend-engineer");
        assert_eq!(selection.confidence, 0.1);
        assert_eq!(
            selection.reasons,
            vec![
                "Automatic agent selection failed".to_string(),
                "Using fallback agent: backend-engineer".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_alternatives_sorted_and_exclude_selected() {
        let resolver = default_resolver().await;
        let task = TaskContext::new("Add a rest api endpoint with database migration")
            .with_files(&["src/controllers/user.ts"]);
        let selection = resolver.resolve(&task).await;
        assert!(!selection.alternatives.is_empty());
        assert!(selection
            .alternatives
            .iter()
            .all(|alt| alt.role != selection.selected_agent));
        for pair in selection.alternatives.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_ambiguous_top_two_discounts_confidence() {
        let document = CapabilityDocument {
            capabilities: vec![
                AgentCapability::new("leader").with_domains(&["backend"]).with_priority(10),
                AgentCapability::new("rival").with_domains(&["backend"]).with_priority(5),
            ],
            ..Default::default()
        };
        let resolver = resolver_over(document).await;
        let task = TaskContext::new("").with_primary_domain("backend");
        let selection = resolver.resolve(&task).await;
        assert_eq!(selection.selected_agent, "leader");
        // raw top is 0.6 * 0.95 = 0.57; rival is within 0.2, so discounted
        assert!(selection.confidence < 0.57);
        assert!(selection.confidence < MIN_CONFIDENCE + 0.15);
    }

    #[tokio::test]
    async fn test_high_score_not_discounted() {
        let document = CapabilityDocument {
            capabilities: vec![
                AgentCapability::new("expert")
                    .with_domains(&["infrastructure"])
                    .with_expertise(&["terraform", "docker", "kubernetes"])
                    .with_priority(10)
                    .with_criteria(&["dockerfile", "terraform", "kubernetes", "ci-pipeline"]),
                AgentCapability::new("second").with_domains(&["infrastructure"]),
            ],
            ..Default::default()
        };
        let resolver = resolver_over(document).await;
        let task = TaskContext::new("")
            .with_primary_domain("infrastructure")
            .with_files(&["infra/main.tf", "Dockerfile", "k8s/deploy.yaml"]);
        let selection = resolver.resolve(&task).await;
        assert_eq!(selection.selected_agent, "expert");
        assert!(selection.confidence >= HIGH_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_single_candidate_not_discounted() {
        let document = CapabilityDocument {
            capabilities: vec![AgentCapability::new("only")
                .with_domains(&["backend"])
                .with_priority(5)],
            ..Default::default()
        };
        let resolver = resolver_over(document).await;
        let task = TaskContext::new("").with_primary_domain("backend");
        let selection = resolver.resolve(&task).await;
        // 0.55 * 0.95, no runner-up: reported unchanged
        assert!((selection.confidence - 0.5225).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_low_confidence_reason_appended() {
        let document = CapabilityDocument {
            capabilities: vec![AgentCapability::new("weak").with_domains(&["design"])],
            ..Default::default()
        };
        let resolver = resolver_over(document).await;
        let task = TaskContext::new("Add api endpoint");
        let selection = resolver.resolve(&task).await;
        assert!(selection.confidence < MIN_CONFIDENCE);
        assert!(selection
            .reasons
            .contains(&"Low confidence in agent selection".to_string()));
    }

    #[tokio::test]
    async fn test_detailed_analysis_exposes_pipeline_state() {
        let resolver = default_resolver().await;
        let task = TaskContext::new("Fix docker deployment").with_files(&["Dockerfile"]);
        let analysis = resolver.detailed_analysis(&task).await.unwrap();
        assert_eq!(analysis.classification.primary_domain, "infrastructure");
        assert!(!analysis.scores.is_empty());
        assert_eq!(
            analysis.selection.selected_agent,
            analysis.scores[0].role
        );
    }

    #[tokio::test]
    async fn test_validate_services_initializes_registry() {
        let registry = Arc::new(CapabilityRegistry::with_defaults());
        let resolver = AgentResolver::new(registry.clone(), Arc::new(FsFileReader));
        assert!(!registry.is_initialized());
        let validation = resolver.validate_services().await;
        assert!(validation.valid, "issues: {:?}", validation.issues);
        assert!(registry.is_initialized());
        assert!(validation.stats.unwrap().total_agents > 0);
    }

    #[tokio::test]
    async fn test_validate_services_flags_empty_registry() {
        let resolver = resolver_over(CapabilityDocument::default()).await;
        let validation = resolver.validate_services().await;
        assert!(!validation.valid);
        assert!(!validation.issues.is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_clear_caches() {
        let resolver = default_resolver().await;
        resolver.resolve(&TaskContext::new("x").with_files(&["a.ts"])).await;
        let stats = resolver.stats().await;
        assert_eq!(stats.context_cache_size, 1);
        assert_eq!(stats.thresholds.min_confidence, 0.3);
        assert_eq!(stats.thresholds.high_confidence, 0.75);

        resolver.clear_caches().await;
        assert_eq!(resolver.stats().await.context_cache_size, 0);
    }

    #[tokio::test]
    async fn test_resolution_is_deterministic() {
        let resolver = default_resolver().await;
        let task = TaskContext::new("Add a rest api endpoint")
            .with_files(&["src/controllers/user.ts", "src/services/user.ts"]);
        let first = resolver.resolve(&task).await;
        let second = resolver.resolve(&task).await;
        assert_eq!(first.selected_agent, second.selected_agent);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.fallback_agent, second.fallback_agent);
    }
}
