use std::sync::Barrier;
use std::thread;

use wikispider::error::ResolveError;
use wikispider::search::{Controller, Spider, Status};
use wikispider::web::node::identities;
use wikispider::web::{AcceptAll, MapResolver, NeighborResolver, Node, WikiFilter};

const WIKI: &str = "https://en.wikipedia.org/wiki";

#[test]
fn test_spiders_sharing_a_controller_split_the_graph() {
    let controller = Controller::new();
    let resolver = MapResolver::from_edges([
        ("B", vec!["D", "E"]),
        ("C", vec!["D", "F"]),
        ("D", vec!["G"]),
    ]);

    let mut first = Spider::new(&controller, &resolver, &AcceptAll);
    let state = first.crawl(Node::root("B"), &Node::root("T"));
    assert_eq!(state.status, Status::PathsExhausted);
    assert_eq!(first.visited_count(), 4);

    // Everything reachable from B is claimed, so C only gets F
    let mut second = Spider::new(&controller, &resolver, &AcceptAll);
    let state = second.crawl(Node::root("C"), &Node::root("T"));
    assert_eq!(state.status, Status::PathsExhausted);
    assert_eq!(second.visited_count(), 2);
    assert!(controller.has_visited(&Node::root("F")));
    assert_eq!(controller.len(), 6);
}

/// Both spiders queue "X" from their seeds. Neither reaches it before an
/// outside worker claims it while they are fetching their other neighbor.
struct ContestedResolver<'c> {
    graph: MapResolver,
    controller: &'c Controller,
    rendezvous: Barrier,
}

impl NeighborResolver for ContestedResolver<'_> {
    fn resolve(&self, node: &Node) -> Result<Vec<String>, ResolveError> {
        if node.identity().starts_with('C') {
            if self.rendezvous.wait().is_leader() {
                self.controller.report_visited(&Node::root("X"));
            }
            self.rendezvous.wait();
        }
        self.graph.resolve(node)
    }
}

#[test]
fn test_two_spiders_collide_on_node_claimed_elsewhere() {
    let controller = Controller::new();
    let resolver = ContestedResolver {
        graph: MapResolver::from_edges([("S1", vec!["C1", "X"]), ("S2", vec!["C2", "X"])]),
        controller: &controller,
        rendezvous: Barrier::new(2),
    };

    let (first, second) = thread::scope(|scope| {
        let handles: Vec<_> = ["S1", "S2"]
            .into_iter()
            .map(|seed| {
                let controller = &controller;
                let resolver = &resolver;
                scope.spawn(move || {
                    Spider::new(controller, resolver, &AcceptAll)
                        .crawl(Node::root(seed), &Node::root("T"))
                })
            })
            .collect();
        let mut states = handles.into_iter().map(|h| h.join().unwrap());
        (states.next().unwrap(), states.next().unwrap())
    });

    assert_eq!(first.status, Status::Collision);
    assert_eq!(second.status, Status::Collision);
    assert_eq!(identities(&first.path), vec!["S1", "X"]);
    assert_eq!(identities(&second.path), vec!["S2", "X"]);

    // S1, S2, C1, C2 and the outside claim on X, recorded once
    assert_eq!(controller.len(), 5);
    assert!(!controller.report_visited(&Node::root("X")));
    assert_eq!(controller.len(), 5);
}

#[test]
fn test_requeued_path_resumes_from_claimed_seed() {
    let controller = Controller::new();
    let resolver = MapResolver::from_edges([
        ("A", vec!["B"]),
        ("B", vec!["C"]),
        ("C", vec!["D"]),
        ("D", vec!["T"]),
    ]);

    let mut first = Spider::new(&controller, &resolver, &AcceptAll).with_visit_budget(Some(1));
    let state = first.crawl(Node::root("A"), &Node::root("T"));
    assert_eq!(state.status, Status::MaxAttemptsExhausted);
    assert_eq!(identities(&state.path), vec!["A", "B", "C"]);

    // The budget-exhausted path goes back as seeds; its last node is fresh
    let resumed_seed = state.path.last().cloned().unwrap();
    let mut second = Spider::new(&controller, &resolver, &AcceptAll);
    let state = second.crawl(resumed_seed, &Node::root("T"));

    assert_eq!(state.status, Status::FoundResult);
    let terminal = state.terminal_node().unwrap();
    assert_eq!(identities(&terminal.path_from_root()), vec!["A", "B", "C", "D", "T"]);
}

#[test]
fn test_wiki_links_are_filtered_and_canonicalized() {
    let controller = Controller::new();
    let graph_theory = format!("{WIKI}/Graph_theory");
    let file = format!("{WIKI}/File:Konigsberg.png");
    let anchor = format!("{WIKI}/Graph_theory#History");
    let external = "https://example.org/Graph_theory".to_string();
    let euler = format!("{WIKI}/Leonhard_Euler");

    let resolver = MapResolver::new()
        .with_links("/Rust", vec![file.as_str(), anchor.as_str(), external.as_str(), graph_theory.as_str()])
        .with_links("/Graph_theory", vec![euler.as_str()]);
    let filter = WikiFilter::new();

    let mut spider = Spider::new(&controller, &resolver, &filter);
    let state = spider.crawl(Node::root("/Rust"), &Node::root("/Leonhard_Euler"));

    assert_eq!(state.status, Status::FoundResult);
    assert_eq!(
        identities(&state.path),
        vec!["/Rust", "/Graph_theory", "/Leonhard_Euler"]
    );
    assert!(!controller.has_visited(&Node::root("/File:Konigsberg.png")));
}

#[test]
fn test_spider_over_trait_object() {
    let controller = Controller::new();
    let resolver = MapResolver::from_edges([("A", vec!["B"]), ("B", vec!["T"])]);
    let dyn_resolver: &dyn NeighborResolver = &resolver;

    let mut spider = Spider::new(&controller, dyn_resolver, &AcceptAll);
    let state = spider.crawl(Node::root("A"), &Node::root("T"));

    assert_eq!(state.status, Status::FoundResult);
    assert_eq!(resolver.calls(), 2);
}

#[test]
fn test_nodes_equal_by_identity_across_chains() {
    let a = Node::root("A");
    let via_a = Node::with_parent("X", &a);
    let via_b = Node::with_parent("X", &Node::with_parent("B", &a));

    assert_eq!(via_a, via_b);
    assert_ne!(via_a.depth(), via_b.depth());

    let controller = Controller::new();
    assert!(controller.report_visited(&via_a));
    assert!(!controller.report_visited(&via_b));
}
