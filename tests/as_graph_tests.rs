use bgpsimulator_editor::as_graph::ASGraph;
use bgpsimulator_editor::shared::{LinkKind, Relationships, TopologyError};

/// 1 provides for 2 and 3, 2 and 3 peer, 3 provides for 4
fn create_test_graph() -> ASGraph {
    let mut as_graph = ASGraph::new();
    for asn in 1..=4 {
        as_graph.add_as(asn);
    }
    as_graph.insert_link(1, 2, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(1, 3, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(3, 2, LinkKind::Peer).unwrap();
    as_graph.insert_link(3, 4, LinkKind::CustomerProvider).unwrap();
    as_graph
}

#[test]
fn test_as_graph_insertion() {
    let mut as_graph = ASGraph::new();

    assert!(as_graph.add_as(1));
    assert!(as_graph.add_as(2));
    // Adding twice is a no-op
    assert!(!as_graph.add_as(1));

    assert_eq!(as_graph.len(), 2);
    assert!(as_graph.get(&1).is_some());
    assert!(as_graph.get(&2).is_some());
    assert!(as_graph.get(&3).is_none());
}

#[test]
fn test_projections_are_sorted() {
    let mut as_graph = ASGraph::new();
    for asn in [50, 10, 40, 20, 30] {
        as_graph.add_as(asn);
    }
    as_graph.insert_link(40, 30, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(20, 30, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(30, 50, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(30, 10, LinkKind::CustomerProvider).unwrap();

    assert_eq!(as_graph.providers_of(30), vec![20, 40]);
    assert_eq!(as_graph.customers_of(30), vec![10, 50]);
    assert!(as_graph.peers_of(30).is_empty());
    assert!(as_graph.providers_of(999).is_empty());
}

#[test]
fn test_as_neighbors() {
    let as_graph = create_test_graph();

    assert_eq!(as_graph.customers_of(1), vec![2, 3]);
    assert_eq!(as_graph.providers_of(2), vec![1]);
    assert_eq!(as_graph.peers_of(2), vec![3]);
    assert_eq!(as_graph.peers_of(3), vec![2]);

    let as3 = as_graph.get(&3).unwrap();
    assert!(as3.get_neighbors(Relationships::Providers).contains(&1));
    assert!(as3.get_neighbors(Relationships::Peers).contains(&2));
    assert!(as3.get_neighbors(Relationships::Customers).contains(&4));
    assert!(!as_graph.get(&4).unwrap().is_isolated());
}

#[test]
fn test_link_lookup_directions() {
    let as_graph = create_test_graph();

    // Customer-provider links only match provider -> customer
    assert_eq!(as_graph.link_kind(1, 2), Some(LinkKind::CustomerProvider));
    assert_eq!(as_graph.link_kind(2, 1), None);
    assert!(as_graph.has_link(1, 2));
    assert!(!as_graph.has_link(2, 1));

    // Peer links match either way
    assert_eq!(as_graph.link_kind(2, 3), Some(LinkKind::Peer));
    assert_eq!(as_graph.link_kind(3, 2), Some(LinkKind::Peer));

    assert_eq!(as_graph.link_kind(1, 4), None);
}

#[test]
fn test_relationship_is_symmetric() {
    let as_graph = create_test_graph();
    for a in as_graph.asns() {
        for b in as_graph.asns() {
            assert_eq!(
                as_graph.relationship(b, a),
                as_graph.relationship(a, b).map(|rel| rel.invert())
            );
        }
    }
}

#[test]
fn test_one_link_per_pair() {
    let mut as_graph = create_test_graph();

    assert_eq!(
        as_graph.insert_link(2, 1, LinkKind::CustomerProvider),
        Err(TopologyError::LinkConflict(2, 1))
    );
    assert_eq!(
        as_graph.insert_link(1, 2, LinkKind::Peer),
        Err(TopologyError::LinkConflict(1, 2))
    );
    assert_eq!(
        as_graph.insert_link(2, 3, LinkKind::CustomerProvider),
        Err(TopologyError::LinkConflict(2, 3))
    );
    assert_eq!(
        as_graph.insert_link(4, 4, LinkKind::Peer),
        Err(TopologyError::SelfLink(4))
    );
    assert_eq!(
        as_graph.insert_link(4, 99, LinkKind::Peer),
        Err(TopologyError::NotFound(99))
    );
}

#[test]
fn test_link_export() {
    let as_graph = create_test_graph();
    assert_eq!(as_graph.cp_links(), vec![[1, 2], [1, 3], [3, 4]]);
    assert_eq!(as_graph.peer_links(), vec![[2, 3]]);
}

#[test]
fn test_remove_as_cascades() {
    let mut as_graph = create_test_graph();

    let removed = as_graph.remove_as(3).unwrap();
    assert_eq!(removed.neighbor_asns().into_iter().collect::<Vec<_>>(), vec![1, 2, 4]);

    assert!(!as_graph.contains(&3));
    assert_eq!(as_graph.customers_of(1), vec![2]);
    assert!(as_graph.peers_of(2).is_empty());
    assert!(as_graph.providers_of(4).is_empty());
    assert_eq!(as_graph.cp_links(), vec![[1, 2]]);
    assert!(as_graph.peer_links().is_empty());

    assert!(as_graph.remove_as(3).is_none());
}

#[test]
fn test_remove_link_either_direction() {
    let mut as_graph = create_test_graph();

    assert_eq!(as_graph.remove_link(2, 1), Some(Relationships::Providers));
    assert!(as_graph.customers_of(1) == vec![3]);
    assert_eq!(as_graph.remove_link(2, 1), None);
}

#[test]
fn test_rename_rekeys_links() {
    let mut as_graph = create_test_graph();

    as_graph.rename_as(3, 30).unwrap();
    assert_eq!(as_graph.customers_of(1), vec![2, 30]);
    assert_eq!(as_graph.peers_of(2), vec![30]);
    assert_eq!(as_graph.providers_of(4), vec![30]);
    assert_eq!(as_graph.get(&30).unwrap().asn, 30);

    assert_eq!(as_graph.rename_as(3, 31), Err(TopologyError::NotFound(3)));
    assert_eq!(as_graph.rename_as(30, 4), Err(TopologyError::Conflict(4)));
}

#[test]
fn test_cycle_detection() {
    let mut as_graph = ASGraph::new();
    for asn in 1..=3 {
        as_graph.add_as(asn);
    }

    // Create a cycle: 1 -> 2 -> 3 -> 1
    as_graph.insert_link(1, 2, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(2, 3, LinkKind::CustomerProvider).unwrap();
    as_graph.insert_link(3, 1, LinkKind::CustomerProvider).unwrap();

    assert!(as_graph.assign_levels().is_err());
}

#[test]
fn test_no_cycle() {
    let as_graph = create_test_graph();
    assert!(as_graph.assign_levels().is_ok());
}
