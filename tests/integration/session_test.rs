use std::sync::Arc;

use wikispider::error::SearchError;
use wikispider::search::{SearchSession, SessionConfig, Status, spawn_search};
use wikispider::web::node::identities;
use wikispider::web::{AcceptAll, MapResolver, Node};

fn new_session(resolver: MapResolver, config: SessionConfig) -> SearchSession<MapResolver, AcceptAll> {
    SearchSession::new(config, Arc::new(resolver), Arc::new(AcceptAll))
        .expect("Failed to create search session")
}

/// Every consecutive pair in `path` must be one of `edges`.
fn assert_valid_path(path: &[Node], edges: &[(&str, Vec<&str>)], start: &str, target: &str) {
    let ids = identities(path);
    assert_eq!(ids.first().copied(), Some(start), "path should start at {start}: {ids:?}");
    assert_eq!(ids.last().copied(), Some(target), "path should end at {target}: {ids:?}");

    for pair in ids.windows(2) {
        let linked = edges
            .iter()
            .any(|(from, to)| *from == pair[0] && to.contains(&pair[1]));
        assert!(linked, "{} does not link to {} in {ids:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_start_is_target() {
    let mut session = new_session(MapResolver::new(), SessionConfig::default().with_workers(4));
    session.search(Node::root("A"), Node::root("A")).unwrap();

    assert!(session.solution_found());
    assert_eq!(identities(session.solution()), vec!["A"]);
    assert!(!session.search_error_occurred());
}

#[test]
fn test_linear_chain_with_one_worker() {
    let resolver = MapResolver::from_edges([
        ("A", vec!["B"]),
        ("B", vec!["C"]),
        ("C", vec!["T"]),
    ]);
    let mut session = new_session(resolver, SessionConfig::default().with_workers(1));
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert_eq!(identities(session.solution()), vec!["A", "B", "C", "T"]);
    assert!(!session.search_error_occurred());
    assert!(session.cause_of_error().is_none());
}

#[test]
fn test_start_without_links() {
    let mut session = new_session(MapResolver::new(), SessionConfig::default().with_workers(2));
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert!(!session.solution_found());
    assert!(session.solution().is_empty());
    assert!(!session.search_error_occurred());
    assert_eq!(session.statistics().epochs, 0);
}

#[test]
fn test_failing_seed_lookup_is_not_a_search_error() {
    let resolver = Arc::new(MapResolver::failing());
    let mut session = SearchSession::new(
        SessionConfig::default().with_workers(2),
        Arc::clone(&resolver),
        Arc::new(AcceptAll),
    )
    .unwrap();
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert!(!session.solution_found());
    assert!(!session.search_error_occurred());
    assert_eq!(resolver.calls(), 1);
}

#[test]
fn test_failing_traversals_are_not_a_search_error() {
    // Seeding succeeds; every fetch made by a worker fails
    let resolver = Arc::new(
        MapResolver::from_edges([("A", vec!["B", "C"]), ("B", vec!["T"]), ("C", vec!["T"])])
            .failing_after(1),
    );
    let mut session = SearchSession::new(
        SessionConfig::default().with_workers(2),
        Arc::clone(&resolver),
        Arc::new(AcceptAll),
    )
    .unwrap();
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert!(!session.solution_found());
    assert!(!session.search_error_occurred());
    assert!(session.cause_of_error().is_none());

    let stats = session.statistics();
    assert_eq!(stats.epochs, 1);
    assert_eq!(stats.traversals_dispatched, 2);
    assert_eq!(stats.paths_exhausted, 2);
    assert_eq!(resolver.calls(), 3);
}

#[test]
fn test_second_search_is_rejected() {
    let mut session = new_session(MapResolver::new(), SessionConfig::default().with_workers(1));
    session.search(Node::root("A"), Node::root("A")).unwrap();

    let err = session.search(Node::root("A"), Node::root("A")).unwrap_err();
    assert_eq!(err, SearchError::AlreadyStarted);
    // The first result is untouched
    assert_eq!(identities(session.solution()), vec!["A"]);
}

#[test]
fn test_zero_workers_rejected() {
    let result = SearchSession::new(
        SessionConfig::default().with_workers(0),
        Arc::new(MapResolver::new()),
        Arc::new(AcceptAll),
    );
    assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
}

#[test]
fn test_cycle_without_target_terminates() {
    let resolver = MapResolver::from_edges([
        ("A", vec!["B"]),
        ("B", vec!["C"]),
        ("C", vec!["B", "A"]),
    ]);
    let mut session = new_session(resolver, SessionConfig::default().with_workers(3));
    session.search(Node::root("A"), Node::root("Z")).unwrap();

    assert!(!session.solution_found());
    assert!(!session.search_error_occurred());
    assert!(!session.in_progress());
}

#[test]
fn test_diamond_with_several_workers() {
    let edges = vec![
        ("A", vec!["B", "C"]),
        ("B", vec!["D"]),
        ("C", vec!["D"]),
        ("D", vec!["T"]),
    ];
    let mut session = new_session(
        MapResolver::from_edges(edges.clone()),
        SessionConfig::default().with_workers(2),
    );
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert!(session.solution_found());
    assert_eq!(session.solution().len(), 4);
    assert_valid_path(session.solution(), &edges, "A", "T");
}

#[test]
fn test_fan_out_spans_epochs() {
    // Six seeds and four workers: only the second epoch reaches the target
    let edges = vec![
        ("A", vec!["B1", "B2", "B3", "B4", "B5", "B6"]),
        ("B1", vec!["C1"]),
        ("B2", vec!["C2"]),
        ("B3", vec!["C3"]),
        ("B4", vec!["C4"]),
        ("B5", vec!["C5"]),
        ("B6", vec!["C6"]),
        ("C6", vec!["T"]),
    ];
    let mut session = new_session(
        MapResolver::from_edges(edges.clone()),
        SessionConfig::default().with_workers(4),
    );
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert_eq!(identities(session.solution()), vec!["A", "B6", "C6", "T"]);
    assert_valid_path(session.solution(), &edges, "A", "T");

    let stats = session.statistics();
    assert_eq!(stats.epochs, 2);
    assert_eq!(stats.traversals_dispatched, 6);
    assert_eq!(stats.outcomes(), stats.traversals_dispatched);
    assert_eq!(stats.found_results, 1);
}

#[test]
fn test_budget_exhaustion_requeues_and_resumes() {
    let chain = ["A", "N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8", "T"];
    let edges: Vec<(&str, Vec<&str>)> = chain.windows(2).map(|w| (w[0], vec![w[1]])).collect();

    let mut session = new_session(
        MapResolver::from_edges(edges.clone()),
        SessionConfig::default().with_workers(2).with_max_chances(1),
    );
    session.search(Node::root("A"), Node::root("T")).unwrap();

    assert_eq!(identities(session.solution()), chain.to_vec());
    assert!(session.statistics().max_attempts_exhausted > 0);
    assert!(session.statistics().epochs > 1);
}

#[test]
fn test_report_lists_solution() {
    let resolver = MapResolver::from_edges([("A", vec!["B"]), ("B", vec!["T"])]);
    let mut session = new_session(resolver, SessionConfig::default().with_workers(1));
    session.search(Node::root("A"), Node::root("T")).unwrap();

    let report = session.report().expect("report after search");
    assert_eq!(report.hops(), Some(2));

    let text = report.to_string();
    assert!(text.contains("Path found from A to T (2 hops)"));
    assert!(text.contains("  3. T"));
}

#[test]
fn test_status_handle_outlives_search() {
    let resolver = MapResolver::from_edges([("A", vec!["T"])]);
    let mut session = new_session(resolver, SessionConfig::default().with_workers(1));
    let status = session.status();
    assert!(!status.in_progress());

    session.search(Node::root("A"), Node::root("T")).unwrap();
    assert!(!status.in_progress());
    assert!(!status.error_occurred());
    assert_eq!(session.statistics().found_results, 1);
    assert_eq!(session.statistics().outcomes(), 1);
}

#[test]
fn test_background_search() {
    let resolver = MapResolver::from_edges([("A", vec!["B"]), ("B", vec!["C"]), ("C", vec!["T"])]);
    let handle = spawn_search(
        Node::root("A"),
        Node::root("T"),
        SessionConfig::default().with_workers(2),
        Arc::new(resolver),
        Arc::new(AcceptAll),
    )
    .unwrap();

    let solution = handle.join();
    assert_eq!(identities(&solution), vec!["A", "B", "C", "T"]);
}

#[test]
fn test_grace_period_is_applied() {
    let resolver = MapResolver::from_edges([("A", vec!["B"]), ("B", vec!["T"])]);
    let mut session = new_session(
        resolver,
        SessionConfig::default().with_workers(1).with_grace_period_millis(20),
    );
    session.search(Node::root("A"), Node::root("T")).unwrap();

    // One fetch (B) runs inside a worker, after its pause
    assert!(session.statistics().elapsed_time >= std::time::Duration::from_millis(20));
    assert_eq!(identities(session.solution()), vec!["A", "B", "T"]);
}

#[test]
fn test_status_values_are_terminal() {
    for status in [
        Status::FoundResult,
        Status::Collision,
        Status::MaxAttemptsExhausted,
        Status::PathsExhausted,
        Status::Error,
    ] {
        assert!(status.is_terminal(), "{status} should be terminal");
    }
    assert!(!Status::Working.is_terminal());
}
