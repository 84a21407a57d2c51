//! Integration tests for capability loading and lookup

use std::sync::Arc;

use crewrouter_capabilities::{
    CapabilityError, CapabilityRegistry, FileCapabilitySource,
};

const DOCUMENT: &str = r#"{
    "capabilities": {
        "platform-lead": {
            "domains": ["backend", "infrastructure"],
            "expertise": ["architecture"],
            "priority": 10,
            "selectionCriteria": ["cross-cutting"]
        },
        "api-engineer": {
            "domains": ["backend"],
            "expertise": ["express", "postgres"],
            "priority": 6,
            "selectionCriteria": ["rest-api", "database"]
        },
        "sketchy-record": {
            "domains": 42
        }
    },
    "selectionCriteria": {
        "rest-api": "REST controllers or routes are touched",
        "database": "Database models or migrations are touched",
        "cross-cutting": "The change spans several layers"
    },
    "taskDomains": {
        "backend": "Server-side services and APIs",
        "infrastructure": "Deployment and orchestration"
    }
}"#;

fn write_document(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("capabilities.json");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_load_from_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, DOCUMENT);

    let registry = CapabilityRegistry::new(Arc::new(FileCapabilitySource::new(&path)));
    registry.initialize().await.unwrap();

    let all = registry.all_capabilities().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].role, "platform-lead");

    let backend = registry.find_agents_by_domain("backend").unwrap();
    assert_eq!(backend[0].role, "platform-lead");
    assert_eq!(backend[1].role, "api-engineer");
}

#[tokio::test]
async fn test_bad_record_retained_as_partial_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, DOCUMENT);

    let registry = CapabilityRegistry::new(Arc::new(FileCapabilitySource::new(&path)));
    registry.initialize().await.unwrap();

    let sketchy = registry.capability("sketchy-record").unwrap();
    assert!(sketchy.domains.is_empty());
    assert_eq!(sketchy.priority, 0);
}

#[tokio::test]
async fn test_malformed_document_fails_initialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, r#"["not", "an", "object"]"#);

    let registry = CapabilityRegistry::new(Arc::new(FileCapabilitySource::new(&path)));
    let err = registry.initialize().await.unwrap_err();
    assert!(matches!(err, CapabilityError::InvalidDocument(_)));
    assert!(!registry.is_initialized());
}

#[tokio::test]
async fn test_reload_picks_up_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, DOCUMENT);

    let registry = CapabilityRegistry::new(Arc::new(FileCapabilitySource::new(&path)));
    registry.initialize().await.unwrap();
    assert_eq!(registry.stats().unwrap().total_agents, 3);

    std::fs::write(
        &path,
        r#"{"capabilities": {"solo": {"domains": ["backend"], "priority": 1}}}"#,
    )
    .unwrap();
    registry.reload().await.unwrap();

    let stats = registry.stats().unwrap();
    assert_eq!(stats.total_agents, 1);
    assert!(registry.has_agent("solo").unwrap());
    assert!(!registry.has_agent("api-engineer").unwrap());
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, DOCUMENT);

    let registry = CapabilityRegistry::new(Arc::new(FileCapabilitySource::new(&path)));
    registry.initialize().await.unwrap();

    std::fs::write(&path, "{ broken").unwrap();
    assert!(registry.reload().await.is_err());

    // Old indexes stay visible
    assert!(registry.has_agent("api-engineer").unwrap());
    assert_eq!(registry.stats().unwrap().total_agents, 3);
}

#[tokio::test]
async fn test_descriptions_exposed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, DOCUMENT);

    let registry = CapabilityRegistry::new(Arc::new(FileCapabilitySource::new(&path)));
    registry.initialize().await.unwrap();

    assert_eq!(
        registry.criterion_description("rest-api").unwrap().unwrap(),
        "REST controllers or routes are touched"
    );
    assert!(registry
        .domain_description("infrastructure")
        .unwrap()
        .is_some());
}
