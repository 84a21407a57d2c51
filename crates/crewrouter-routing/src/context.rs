//! Codebase context analysis
//!
//! Extracts file-type, import, architecture, technology and infrastructure
//! signals from the affected files of a task. Path-based signals are pure
//! string processing; import extraction reads file contents through the
//! injected [`FileReader`], capped at the first ten files per call. Results
//! are cached keyed by the exact ordered input file list.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{error::Result, fs::FileReader, models::CodebaseContext};

/// Content is read for at most this many files per analysis call
const MAX_SCANNED_FILES: usize = 10;

/// Basenames treated as their own file type despite having no extension
const SPECIAL_BASENAMES: &[&str] = &["dockerfile", "makefile", "jenkinsfile", "vagrantfile"];

/// Analyzes affected files into a [`CodebaseContext`]
pub struct ContextAnalyzer {
    reader: Arc<dyn FileReader>,
    cache: RwLock<HashMap<String, CodebaseContext>>,
    static_import: Regex,
    dynamic_import: Regex,
    require_import: Regex,
}

impl ContextAnalyzer {
    /// Create an analyzer reading file contents through the given reader
    pub fn new(reader: Arc<dyn FileReader>) -> Self {
        Self {
            reader,
            cache: RwLock::new(HashMap::new()),
            // The three import shapes scanned for: static module imports,
            // dynamic imports and legacy require calls
            static_import: Regex::new(r#"import\s+(?:[\w\s{},*$]+\s+from\s+)?['"]([^'"]+)['"]"#)
                .expect("Invalid regex"),
            dynamic_import: Regex::new(r#"import\(\s*['"]([^'"]+)['"]\s*\)"#)
                .expect("Invalid regex"),
            require_import: Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#)
                .expect("Invalid regex"),
        }
    }

    /// Analyze the given ordered file list
    ///
    /// Identical repeated calls hit the cache and perform no file reads.
    /// Individual read failures degrade to "no imports for that file" and
    /// never abort the path-based signals.
    pub async fn analyze(&self, files: &[String]) -> Result<CodebaseContext> {
        let key = cache_key(files);
        if let Some(context) = self.cache.read().await.get(&key) {
            debug!(files = files.len(), "Context cache hit");
            return Ok(context.clone());
        }

        let affected_file_types = extract_file_types(files);
        let import_patterns = self.extract_imports(files).await;
        let architectural_patterns = detect_architecture(files);
        let technology_stack =
            detect_technologies(files, &affected_file_types, &import_patterns);
        let infrastructure_components = detect_infrastructure(files);

        let context = CodebaseContext {
            affected_file_types,
            import_patterns,
            architectural_patterns,
            technology_stack,
            infrastructure_components,
        };

        debug!(
            files = files.len(),
            types = context.affected_file_types.len(),
            imports = context.import_patterns.len(),
            "Context analyzed"
        );
        self.cache.write().await.insert(key, context.clone());
        Ok(context)
    }

    /// External module references from the first [`MAX_SCANNED_FILES`] files
    async fn extract_imports(&self, files: &[String]) -> Vec<String> {
        let mut imports = Vec::new();
        for file in files.iter().take(MAX_SCANNED_FILES) {
            let content = match self.reader.read(file).await {
                Ok(content) => content,
                Err(err) => {
                    debug!(file = %file, error = %err, "Read failed, skipping imports for file");
                    continue;
                }
            };
            for pattern in [&self.static_import, &self.dynamic_import, &self.require_import] {
                for capture in pattern.captures_iter(&content) {
                    let module = capture[1].to_string();
                    if module.starts_with("./") || module.starts_with("../") {
                        continue;
                    }
                    push_unique(&mut imports, module);
                }
            }
        }
        imports
    }

    /// Number of cached analysis results
    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Drop all cached analysis results
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}

/// Deterministic cache key over the ordered file list
fn cache_key(files: &[String]) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<String> {
    let name = basename(path);
    name.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_lowercase())
}

fn has_segment(path: &str, segments: &[&str]) -> bool {
    path.split('/').any(|part| segments.contains(&part))
}

/// Deduplicated lowercase extensions, with extensionless special cases kept
/// by basename
fn extract_file_types(files: &[String]) -> Vec<String> {
    let mut types = Vec::new();
    for file in files {
        let name = basename(file).to_lowercase();
        if SPECIAL_BASENAMES.contains(&name.as_str()) {
            push_unique(&mut types, name);
        } else if let Some(ext) = extension(file) {
            push_unique(&mut types, ext);
        }
    }
    types
}

/// Architectural patterns from path segments
fn detect_architecture(files: &[String]) -> Vec<String> {
    let mut patterns = Vec::new();
    for file in files {
        let path = file.to_lowercase();
        if has_segment(&path, &["controllers", "routes"]) {
            push_unique(&mut patterns, "rest-api".to_string());
        }
        if has_segment(&path, &["services"]) {
            push_unique(&mut patterns, "service-layer".to_string());
        }
        if has_segment(&path, &["domain", "repositories", "entities"]) {
            push_unique(&mut patterns, "layered-architecture".to_string());
        }
        if has_segment(&path, &["components"]) {
            push_unique(&mut patterns, "component-based".to_string());
        }
        if has_segment(&path, &["hooks"]) {
            push_unique(&mut patterns, "react-hooks".to_string());
        }
        if has_segment(&path, &["middleware"]) {
            push_unique(&mut patterns, "middleware-pipeline".to_string());
        }
    }
    patterns
}

/// Technology signals from (import, extension, path segment) rules
fn detect_technologies(
    files: &[String],
    file_types: &[String],
    imports: &[String],
) -> Vec<String> {
    let mut stack = Vec::new();

    for file_type in file_types {
        match file_type.as_str() {
            "ts" => push_unique(&mut stack, "typescript".to_string()),
            "js" => push_unique(&mut stack, "javascript".to_string()),
            "tsx" => {
                push_unique(&mut stack, "typescript".to_string());
                push_unique(&mut stack, "react".to_string());
            }
            "jsx" => {
                push_unique(&mut stack, "javascript".to_string());
                push_unique(&mut stack, "react".to_string());
            }
            "rs" => push_unique(&mut stack, "rust".to_string()),
            "go" => push_unique(&mut stack, "go".to_string()),
            "py" => push_unique(&mut stack, "python".to_string()),
            "tf" | "tfvars" => push_unique(&mut stack, "terraform".to_string()),
            "dockerfile" => push_unique(&mut stack, "docker".to_string()),
            "sql" => push_unique(&mut stack, "database".to_string()),
            "css" | "scss" | "sass" | "less" => push_unique(&mut stack, "css".to_string()),
            "vue" => push_unique(&mut stack, "vue".to_string()),
            _ => {}
        }
    }

    for import in imports {
        let root = import.split('/').next().unwrap_or(import);
        match root {
            "react" | "react-dom" => push_unique(&mut stack, "react".to_string()),
            "vue" => push_unique(&mut stack, "vue".to_string()),
            "@angular" => push_unique(&mut stack, "angular".to_string()),
            "next" => push_unique(&mut stack, "next".to_string()),
            "express" | "fastify" | "koa" => push_unique(&mut stack, "express".to_string()),
            "pg" | "postgres" | "typeorm" | "prisma" => {
                push_unique(&mut stack, "postgres".to_string());
                push_unique(&mut stack, "database".to_string());
            }
            "mongoose" | "mongodb" => {
                push_unique(&mut stack, "mongodb".to_string());
                push_unique(&mut stack, "database".to_string());
            }
            "redis" => push_unique(&mut stack, "redis".to_string()),
            "graphql" | "@apollo" => push_unique(&mut stack, "graphql".to_string()),
            "redux" | "zustand" | "mobx" => {
                push_unique(&mut stack, "state-management".to_string())
            }
            _ => {}
        }
    }

    for file in files {
        let path = file.to_lowercase();
        if has_segment(&path, &["migrations", "db"]) {
            push_unique(&mut stack, "database".to_string());
        }
    }

    stack
}

/// Infrastructure components from path and extension rules
fn detect_infrastructure(files: &[String]) -> Vec<String> {
    let mut components = Vec::new();
    for file in files {
        let path = file.to_lowercase();
        let name = basename(&path);
        if extension(&path).as_deref() == Some("tf")
            || extension(&path).as_deref() == Some("tfvars")
            || has_segment(&path, &["terraform"])
        {
            push_unique(&mut components, "terraform".to_string());
        }
        if name == "dockerfile" || name.starts_with("docker-compose") {
            push_unique(&mut components, "docker".to_string());
        }
        if has_segment(&path, &["k8s", "kubernetes", "helm"]) {
            push_unique(&mut components, "kubernetes".to_string());
        }
        if path.contains(".github/workflows") || name == "jenkinsfile" {
            push_unique(&mut components, "ci-pipeline".to_string());
        }
        if has_segment(&path, &["ansible"]) {
            push_unique(&mut components, "ansible".to_string());
        }
    }
    components
}
