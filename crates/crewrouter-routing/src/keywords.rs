//! Domain keyword registry
//!
//! Mutable mapping from domain tag to a set of lowercase keywords. The
//! classifier counts occurrences of these keywords in task descriptions. All
//! operations are total over in-memory state; there is no process-wide
//! singleton — construct one and share it via `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::debug;

/// Built-in keyword table, restored by [`KeywordRegistry::reset`]
fn default_keywords() -> HashMap<String, HashSet<String>> {
    let table: &[(&str, &[&str])] = &[
        (
            "infrastructure",
            &[
                "deploy", "deployment", "docker", "kubernetes", "k8s", "terraform",
                "helm", "pipeline", "infrastructure", "provisioning", "cloud", "aws",
            ],
        ),
        (
            "security",
            &[
                "security", "auth", "authentication", "authorization", "vulnerability",
                "encryption", "oauth", "csrf", "xss", "secrets", "permissions",
            ],
        ),
        (
            "backend",
            &[
                "api", "endpoint", "server", "database", "migration", "service",
                "rest", "graphql", "queue", "backend", "middleware",
            ],
        ),
        (
            "frontend-framework",
            &[
                "react", "vue", "angular", "component", "hook", "jsx", "redux",
                "svelte", "props", "rendering",
            ],
        ),
        (
            "frontend-general",
            &[
                "css", "html", "style", "styling", "layout", "responsive",
                "accessibility", "animation", "ui",
            ],
        ),
        (
            "core-language",
            &[
                "refactor", "typescript", "rust", "algorithm", "performance",
                "memory", "generics", "compiler", "types", "lint",
            ],
        ),
        (
            "design",
            &[
                "design", "figma", "mockup", "wireframe", "ux", "branding",
                "typography", "palette",
            ],
        ),
    ];
    table
        .iter()
        .map(|(domain, words)| {
            (
                domain.to_string(),
                words.iter().map(|w| w.to_string()).collect(),
            )
        })
        .collect()
}

/// Registry of domain keywords
pub struct KeywordRegistry {
    keywords: RwLock<HashMap<String, HashSet<String>>>,
}

impl KeywordRegistry {
    /// Create a registry seeded with the built-in default table
    pub fn new() -> Self {
        Self {
            keywords: RwLock::new(default_keywords()),
        }
    }

    /// Keywords registered for a domain; empty set for unknown domains
    pub fn keywords(&self, domain: &str) -> HashSet<String> {
        self.keywords
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    /// Full snapshot of the keyword table
    pub fn all_keywords(&self) -> HashMap<String, HashSet<String>> {
        self.keywords
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// All registered domain tags
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .keywords
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        domains.sort();
        domains
    }

    /// Add keywords to a domain (lower-cased union); creates the domain if new
    pub fn register_keywords(&self, domain: &str, words: &[&str]) {
        debug!(domain = %domain, count = words.len(), "Registering keywords");
        let mut table = self.keywords.write().unwrap_or_else(|e| e.into_inner());
        let entry = table.entry(domain.to_string()).or_default();
        for word in words {
            entry.insert(word.to_lowercase());
        }
    }

    /// Replace the full keyword set for a domain
    pub fn set_keywords(&self, domain: &str, words: &[&str]) {
        let mut table = self.keywords.write().unwrap_or_else(|e| e.into_inner());
        table.insert(
            domain.to_string(),
            words.iter().map(|w| w.to_lowercase()).collect(),
        );
    }

    /// Case-insensitive reverse lookup: all domains registering the keyword
    pub fn domains_for_keyword(&self, word: &str) -> Vec<String> {
        let needle = word.to_lowercase();
        let mut domains: Vec<String> = self
            .keywords
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, words)| words.contains(&needle))
            .map(|(domain, _)| domain.clone())
            .collect();
        domains.sort();
        domains
    }

    /// Restore the built-in default table
    pub fn reset(&self) {
        *self.keywords.write().unwrap_or_else(|e| e.into_inner()) = default_keywords();
    }
}

impl Default for KeywordRegistry {
    fn default() -> Self {
        Self::new()
    }
}
