//! Task classification
//!
//! Turns a task context into a [`TaskClassification`] by combining two
//! independent signal sources: keyword occurrences in the description
//! (driven by the [`KeywordRegistry`]) and file-path heuristics over the
//! affected files. Classification is a total function: degenerate input
//! falls through to a low-confidence default instead of failing.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{
    keywords::KeywordRegistry,
    models::{Complexity, TaskClassification, TaskContext},
};

/// Confidence reported for an explicit caller-supplied domain
const EXPLICIT_DOMAIN_CONFIDENCE: f64 = 0.95;
/// Confidence reported when no signal matched at all
const DEFAULT_CONFIDENCE: f64 = 0.2;
/// Domain used when nothing else matched
const DEFAULT_DOMAIN: &str = "backend";

/// Fixed tie-break order; earlier wins on equal signal strength
const DOMAIN_PRIORITY: &[&str] = &[
    "infrastructure",
    "security",
    "backend",
    "frontend-framework",
    "frontend-general",
    "core-language",
    "design",
];

/// Classifies tasks into domains
pub struct TaskClassifier {
    keywords: Arc<KeywordRegistry>,
}

impl TaskClassifier {
    /// Create a classifier over the given keyword registry
    pub fn new(keywords: Arc<KeywordRegistry>) -> Self {
        Self { keywords }
    }

    /// Classify a task
    pub fn classify(&self, task: &TaskContext) -> TaskClassification {
        let complexity = task
            .complexity
            .unwrap_or_else(|| derive_complexity(task));

        if let Some(domain) = &task.primary_domain {
            // Explicit override: no keyword scan at all
            debug!(domain = %domain, "Using explicit domain override");
            return TaskClassification {
                primary_domain: domain.clone(),
                confidence: EXPLICIT_DOMAIN_CONFIDENCE,
                complexity,
                reasons: vec![format!("Explicit domain override: {domain}")],
                suggested_agents: suggest_agents(domain, &task.secondary_domains, complexity),
            };
        }

        let description = task.description.to_lowercase();
        let tokens: Vec<&str> = description
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let mut signals: HashMap<String, f64> = HashMap::new();
        let mut reasons = Vec::new();

        for (domain, words) in self.keywords.all_keywords() {
            let hits: usize = tokens
                .iter()
                .filter(|&&token| words.contains(token))
                .count();
            if hits > 0 {
                *signals.entry(domain.clone()).or_insert(0.0) += hits as f64;
                reasons.push(format!("Matched {hits} '{domain}' keyword(s) in description"));
            }
        }

        for (domain, weight, note) in file_signals(&task.affected_files) {
            *signals.entry(domain.clone()).or_insert(0.0) += weight;
            reasons.push(note);
        }

        let (primary_domain, confidence) = match pick_winner(&signals) {
            Some(winner) => winner,
            None => {
                debug!("No classification signals; using default domain");
                reasons.push(format!(
                    "No classification signals found; defaulting to '{DEFAULT_DOMAIN}'"
                ));
                (DEFAULT_DOMAIN.to_string(), DEFAULT_CONFIDENCE)
            }
        };

        debug!(
            domain = %primary_domain,
            confidence = confidence,
            "Task classified"
        );

        TaskClassification {
            suggested_agents: suggest_agents(&primary_domain, &task.secondary_domains, complexity),
            primary_domain,
            confidence,
            complexity,
            reasons,
        }
    }
}

/// Winner and its normalized signal share, clamped to [0.1, 0.9]
fn pick_winner(signals: &HashMap<String, f64>) -> Option<(String, f64)> {
    let total: f64 = signals.values().sum();
    if total <= 0.0 {
        return None;
    }
    let winner = signals
        .iter()
        .max_by(|(a_domain, a_score), (b_domain, b_score)| {
            a_score
                .partial_cmp(b_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    // Reversed: lower tie-break rank must win the max
                    tie_break_rank(b_domain).cmp(&tie_break_rank(a_domain))
                })
        })
        .map(|(domain, score)| (domain.clone(), (score / total).clamp(0.1, 0.9)));
    winner
}

/// Position in the fixed priority order; unknown domains rank after the
/// known table, alphabetically, so ties stay deterministic
fn tie_break_rank(domain: &str) -> (usize, String) {
    let position = DOMAIN_PRIORITY
        .iter()
        .position(|d| *d == domain)
        .unwrap_or(DOMAIN_PRIORITY.len());
    (position, domain.to_string())
}

/// File-path heuristic weights per domain
fn file_signals(files: &[String]) -> Vec<(String, f64, String)> {
    let mut weights: HashMap<&str, f64> = HashMap::new();

    for file in files {
        let path = file.to_lowercase();
        let basename = path.rsplit('/').next().unwrap_or(&path).to_string();
        let extension = basename.rsplit_once('.').map(|(_, ext)| ext.to_string());
        let ext = extension.as_deref().unwrap_or("");

        let infra_basename = matches!(basename.as_str(), "dockerfile" | "jenkinsfile" | "vagrantfile")
            || basename.starts_with("docker-compose");
        let infra_segment = has_segment(&path, &["k8s", "kubernetes", "terraform", "helm", "ansible"])
            || path.contains(".github/workflows");
        if infra_basename || infra_segment || matches!(ext, "tf" | "tfvars") {
            *weights.entry("infrastructure").or_insert(0.0) += 2.0;
            continue;
        }

        if has_segment(&path, &["auth", "security"]) || basename.contains("secret") {
            *weights.entry("security").or_insert(0.0) += 2.0;
            continue;
        }

        if matches!(ext, "tsx" | "jsx" | "vue" | "svelte")
            || has_segment(&path, &["components", "hooks", "pages"])
        {
            *weights.entry("frontend-framework").or_insert(0.0) += 2.0;
            continue;
        }

        if matches!(ext, "css" | "scss" | "sass" | "less" | "html") {
            *weights.entry("frontend-general").or_insert(0.0) += 2.0;
            continue;
        }

        if matches!(ext, "sql")
            || has_segment(
                &path,
                &["controllers", "services", "models", "routes", "repositories", "migrations", "db", "api"],
            )
        {
            *weights.entry("backend").or_insert(0.0) += 2.0;
            continue;
        }

        if matches!(ext, "rs" | "go" | "c" | "cpp" | "h" | "java") {
            *weights.entry("core-language").or_insert(0.0) += 1.0;
            continue;
        }

        if matches!(ext, "fig" | "sketch") || has_segment(&path, &["design", "mockups"]) {
            *weights.entry("design").or_insert(0.0) += 2.0;
        }
    }

    weights
        .into_iter()
        .map(|(domain, weight)| {
            (
                domain.to_string(),
                weight,
                format!("File paths indicate '{domain}' work"),
            )
        })
        .collect()
}

fn has_segment(path: &str, segments: &[&str]) -> bool {
    path.split('/').any(|part| segments.contains(&part))
}

/// Complexity from description length, file count and dependency count
fn derive_complexity(task: &TaskContext) -> Complexity {
    let description_len = task.description.len();
    let files = task.affected_files.len();
    let deps = task.dependencies.len();

    if description_len > 300 || files > 8 || deps > 6 {
        Complexity::High
    } else if description_len < 100 && files <= 3 && deps <= 2 {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}

/// Fixed domain -> suggested agent roles table
fn roles_for_domain(domain: &str) -> &'static [&'static str] {
    match domain {
        "infrastructure" => &["infra-specialist", "backend-engineer"],
        "security" => &["security-specialist", "backend-engineer"],
        "backend" => &["backend-engineer", "systems-engineer"],
        "frontend-framework" => &["frontend-framework-specialist", "frontend-engineer"],
        "frontend-general" => &["frontend-engineer", "frontend-framework-specialist"],
        "core-language" => &["systems-engineer", "backend-engineer"],
        "design" => &["design-reviewer", "frontend-engineer"],
        _ => &["backend-engineer"],
    }
}

/// Suggested roles for the chosen domain plus any secondary domains; a lead
/// role is prepended for high-complexity or multi-domain work
fn suggest_agents(
    primary_domain: &str,
    secondary_domains: &[String],
    complexity: Complexity,
) -> Vec<String> {
    let mut suggested: Vec<String> = Vec::new();
    if complexity == Complexity::High || !secondary_domains.is_empty() {
        suggested.push("tech-lead".to_string());
    }
    for role in roles_for_domain(primary_domain) {
        if !suggested.iter().any(|r| r == role) {
            suggested.push(role.to_string());
        }
    }
    for domain in secondary_domains {
        for role in roles_for_domain(domain) {
            if !suggested.iter().any(|r| r == role) {
                suggested.push(role.to_string());
            }
        }
    }
    suggested
}
