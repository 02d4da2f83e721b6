use std::fs;

use archgrow::{
    Dataset, GraphElement, GraphLoader, GraphSession, LayoutConfig, NavigationState,
};
use tempfile::TempDir;

fn navigation(location: &str) -> NavigationState {
    NavigationState::from_location(location).unwrap()
}

fn chain_dataset() -> Dataset {
    Dataset {
        version: Some("1".to_owned()),
        elements: vec![
            GraphElement::Node("a".to_owned()),
            GraphElement::Node("b".to_owned()),
            GraphElement::Node("c".to_owned()),
            GraphElement::Edge {
                source: "a".to_owned(),
                target: "b".to_owned(),
            },
            GraphElement::Edge {
                source: "b".to_owned(),
                target: "c".to_owned(),
            },
        ],
    }
}

#[test]
fn test_decrease_charge_lowers_by_step_each_time() {
    let mut session = GraphSession::new(navigation("?arch=lamp"), LayoutConfig::default());
    session.load(&chain_dataset()).unwrap();

    let mut last = session.charge();
    assert_eq!(last, -100.0);
    for n in 1..=5 {
        let charge = session.decrease_charge();
        assert_eq!(charge, -100.0 - 10.0 * n as f32);
        assert!(charge < last);
        assert!(session.layout().is_running());
        last = charge;
    }
}

#[test]
fn test_load_builds_graph_and_starts_layout() {
    let mut session = GraphSession::new(navigation("?arch=migration&step=2"), LayoutConfig::default());
    session.load(&chain_dataset()).unwrap();

    let store = session.store();
    let sizes = store.nodes().iter().map(|node| node.size).collect::<Vec<_>>();
    assert_eq!(sizes, vec![2, 3, 2]);
    assert_eq!(store.root(), store.peek("c"));
    assert_eq!(session.dataset_version(), Some("1"));
    assert!(session.layout().is_running());
    assert_eq!(session.layout().materialized_count(), 3);
    for id in store.node_ids() {
        assert!(session.position(id).is_some());
    }
}

#[test]
fn test_edges_before_nodes_still_resolve() {
    let dataset = Dataset {
        version: None,
        elements: vec![
            GraphElement::Edge {
                source: "db".to_owned(),
                target: "api".to_owned(),
            },
            GraphElement::Node("api".to_owned()),
            GraphElement::Node("db".to_owned()),
        ],
    };
    let mut session = GraphSession::new(navigation("?arch=lamp"), LayoutConfig::default());
    session.load(&dataset).unwrap();

    assert_eq!(session.store().edge_count(), 1);
    assert_eq!(session.store().root(), session.store().peek("db"));
}

#[test]
fn test_failed_load_keeps_previous_graph() {
    let mut session = GraphSession::new(navigation("?arch=lamp"), LayoutConfig::default());
    session.load(&chain_dataset()).unwrap();

    let broken = Dataset {
        version: Some("2".to_owned()),
        elements: vec![
            GraphElement::Node("x".to_owned()),
            GraphElement::Edge {
                source: "x".to_owned(),
                target: "ghost".to_owned(),
            },
        ],
    };
    assert!(session.load(&broken).is_err());

    assert_eq!(session.store().node_count(), 3);
    assert!(session.store().peek("x").is_none());
    assert_eq!(session.dataset_version(), Some("1"));
    assert_eq!(session.layout().materialized_count(), 3);
}

#[test]
fn test_lowered_charge_survives_reload() {
    let mut session = GraphSession::new(navigation("?arch=lamp"), LayoutConfig::default());
    session.load(&chain_dataset()).unwrap();
    session.decrease_charge();
    session.decrease_charge();

    session.load(&chain_dataset()).unwrap();

    assert_eq!(session.charge(), -120.0);
}

#[test]
fn test_settled_frame_places_every_node() {
    let mut session = GraphSession::new(navigation("?arch=lamp"), LayoutConfig::default());
    session.load(&chain_dataset()).unwrap();

    let ticks = session.run_until_settled(2000);
    assert!(ticks < 2000);
    assert!(!session.layout().is_running());

    let frame = session.frame();
    assert_eq!(frame.nodes.len(), 3);
    assert_eq!(frame.edges.len(), 2);
    assert!(frame.nodes.iter().all(|node| node.x.is_finite() && node.y.is_finite()));
}

#[test]
fn test_loader_reads_resource_from_data_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("migration3.json"),
        r#"{
            "version": 3,
            "graph": [
                {"node": "lb"},
                {"node": "web"},
                {"edge": {"source": "lb", "target": "web"}}
            ]
        }"#,
    )
    .unwrap();

    let loader = GraphLoader::new(dir.path());
    let nav = navigation("?arch=migration&step=3");
    assert_eq!(loader.resource_path(&nav), dir.path().join("migration3.json"));

    let dataset = loader.fetch(&nav).unwrap();
    assert_eq!(dataset.version.as_deref(), Some("3"));

    let store = dataset.build_store().unwrap();
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.edge_count(), 1);
}

#[test]
fn test_loader_reports_missing_resource() {
    let dir = TempDir::new().unwrap();
    let loader = GraphLoader::new(dir.path());

    let error = loader.fetch(&navigation("?arch=lamp")).unwrap_err();

    assert!(format!("{error:#}").contains("lamp.json"));
}

#[test]
fn test_loader_rejects_malformed_document() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lamp.json"), "{ not json").unwrap();
    let loader = GraphLoader::new(dir.path());

    assert!(loader.fetch(&navigation("?arch=lamp")).is_err());
}
