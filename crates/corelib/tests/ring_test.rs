//! Tests for the hash ring implementation.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/lookup, remove
//! 2. **Multiple nodes**: Distribution, consistency
//! 3. **Edge cases**: Wraparound, single node, duplicate registration
//! 4. **Rebalancing**: Only keys adjacent to a joining/leaving node move

use corelib::partitioner::Partitioner;
use corelib::ring::HashRing;
use corelib::token::DigestToken;
use corelib::{Error, NodeAddr};
use proptest::prelude::*;

fn addr(s: &str) -> NodeAddr {
    NodeAddr::parse(s).unwrap()
}

/// Places every string at the number after its last `:` or `/`, so tests
/// can pick exact ring positions (`node-50:50` sits at 50, `obj/30` at 30).
#[derive(Clone, Debug)]
struct FixedPartitioner;

impl Partitioner for FixedPartitioner {
    type TokenType = DigestToken;

    fn partition(&self, key: &[u8]) -> DigestToken {
        let key = std::str::from_utf8(key).unwrap();
        let tail = key.rsplit([':', '/']).next().unwrap();
        DigestToken(tail.parse().unwrap())
    }

    fn name(&self) -> &'static str {
        "FixedPartitioner"
    }
}

fn fixed_ring(positions: &[u64]) -> HashRing<FixedPartitioner> {
    let mut ring = HashRing::with_partitioner(FixedPartitioner);
    for p in positions {
        ring.add_node(addr(&format!("node-{p}:{p}"))).unwrap();
    }
    ring
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = HashRing::new();
    assert_eq!(ring.owner("video/key1"), Err(Error::EmptyRing));
    assert_eq!(ring.len(), 0);
    assert!(ring.is_empty());
    assert!(ring.nodes().is_empty());
    assert!(ring.ownership().is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let mut ring = HashRing::new();
    let node = addr("localhost:8090");

    let token = ring.add_node(node.clone()).unwrap();
    assert_eq!(token, ring.hash("localhost:8090"));
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.owner("video/test-key").unwrap(), &node);
    assert_eq!(ring.token_of(&node), Some(token));
}

#[test]
fn test_remove_node() {
    let mut ring = HashRing::new();
    let n1 = addr("localhost:8090");
    let n2 = addr("localhost:8091");
    ring.add_node(n1.clone()).unwrap();
    ring.add_node(n2.clone()).unwrap();

    ring.remove_node(&n1).unwrap();

    assert_eq!(ring.len(), 1);
    assert!(!ring.contains(&n1));
    assert_eq!(ring.owner("some/key").unwrap(), &n2);
    assert_eq!(
        ring.remove_node(&addr("localhost:9999")),
        Err(Error::UnknownNode("localhost:9999".into()))
    );
}

#[test]
fn test_duplicate_add_rejected() {
    let mut ring = HashRing::new();
    ring.add_node(addr("localhost:8090")).unwrap();
    assert_eq!(
        ring.add_node(addr("localhost:8090")),
        Err(Error::DuplicateNode("localhost:8090".into()))
    );
    assert_eq!(ring.len(), 1);
}

#[test]
fn test_position_collision_rejected() {
    let mut ring = fixed_ring(&[50]);
    let err = ring.add_node(addr("other-host:50")).unwrap_err();
    assert!(matches!(err, Error::PositionCollision { .. }));
    assert_eq!(ring.len(), 1);
}

// ============================================================================
// Ownership Tests
// ============================================================================

#[test]
fn test_owner_is_smallest_position_at_or_after_key() {
    let ring = fixed_ring(&[10, 50, 90]);
    assert_eq!(ring.owner("obj/30").unwrap().as_str(), "node-50:50");
    assert_eq!(ring.owner("obj/50").unwrap().as_str(), "node-50:50");
    assert_eq!(ring.owner("obj/10").unwrap().as_str(), "node-10:10");
    assert_eq!(ring.owner("obj/0").unwrap().as_str(), "node-10:10");
    assert_eq!(ring.owner("obj/51").unwrap().as_str(), "node-90:90");
}

#[test]
fn test_owner_wraps_past_last_position() {
    let ring = fixed_ring(&[10, 50, 90]);
    assert_eq!(ring.owner("obj/91").unwrap().as_str(), "node-10:10");
    assert_eq!(ring.owner(&format!("obj/{}", u64::MAX)).unwrap().as_str(), "node-10:10");
}

#[test]
fn test_insertion_moves_only_split_range() {
    let before = fixed_ring(&[10, 50, 90]);
    let mut after = before.clone();
    after.add_node(addr("node-40:40")).unwrap();

    for h in 0..100u64 {
        let key = format!("obj/{h}");
        let old = before.owner(&key).unwrap().as_str();
        let new = after.owner(&key).unwrap().as_str();
        if (11..=40).contains(&h) {
            assert_eq!(old, "node-50:50");
            assert_eq!(new, "node-40:40", "hash {h} should move to the new node");
        } else {
            assert_eq!(old, new, "hash {h} should not move");
        }
    }
}

#[test]
fn test_successor_is_previous_owner_of_range() {
    let mut ring = fixed_ring(&[10, 50, 90]);
    let new = addr("node-40:40");
    ring.add_node(new.clone()).unwrap();
    assert_eq!(ring.successor(&new).unwrap().as_str(), "node-50:50");
    assert_eq!(ring.successor(&addr("node-90:90")).unwrap().as_str(), "node-10:10");
    assert_eq!(fixed_ring(&[10]).successor(&addr("node-10:10")), None);
}

// ============================================================================
// Utility Tests
// ============================================================================

#[test]
fn test_nodes_in_position_order() {
    let ring = fixed_ring(&[90, 10, 50]);
    let nodes: Vec<&str> = ring.nodes().iter().map(|n| n.as_str()).collect();
    assert_eq!(nodes, vec!["node-10:10", "node-50:50", "node-90:90"]);

    let tokens: Vec<u64> = ring.tokens().into_iter().map(|(t, _)| t.0).collect();
    assert_eq!(tokens, vec![10, 50, 90]);
}

#[test]
fn test_ownership_sums_to_one() {
    let ring = HashRing::from_nodes(&[
        addr("localhost:8090"),
        addr("localhost:8091"),
        addr("localhost:8092"),
    ])
    .unwrap();
    let total: f64 = ring.ownership().iter().map(|(_, share)| share).sum();
    assert!((total - 1.0).abs() < 1e-9);

    let single = HashRing::from_nodes(&[addr("localhost:8090")]).unwrap();
    assert_eq!(single.ownership()[0].1, 1.0);
}

#[test]
fn test_partitioner_name() {
    assert_eq!(HashRing::new().partitioner_name(), "Blake3Partitioner");
}

// ============================================================================
// Properties
// ============================================================================

fn node_set() -> impl Strategy<Value = Vec<NodeAddr>> {
    prop::collection::btree_set(1u16..=u16::MAX, 1..8)
        .prop_map(|ports| ports.into_iter().map(|p| addr(&format!("10.0.0.1:{p}"))).collect())
}

proptest! {
    #[test]
    fn prop_owner_is_deterministic_member(nodes in node_set(), key in "[a-z0-9]{1,12}/[a-z0-9.]{1,12}") {
        let ring = HashRing::from_nodes(&nodes).unwrap();
        let first = ring.owner(&key).unwrap().clone();
        prop_assert_eq!(ring.owner(&key).unwrap(), &first);
        prop_assert!(nodes.contains(&first));
    }

    #[test]
    fn prop_join_only_moves_keys_to_new_node(
        nodes in node_set(),
        new_port in 1u16..=u16::MAX,
        keys in prop::collection::vec("[a-z0-9]{1,8}/[a-z0-9]{1,8}", 1..64),
    ) {
        let new = addr(&format!("10.0.0.2:{new_port}"));
        let before = HashRing::from_nodes(&nodes).unwrap();
        let mut after = before.clone();
        after.add_node(new.clone()).unwrap();
        for key in &keys {
            let old = before.owner(key).unwrap();
            let now = after.owner(key).unwrap();
            prop_assert!(old == now || *now == new);
        }
    }

    #[test]
    fn prop_leave_only_moves_keys_of_departed_node(
        nodes in node_set(),
        keys in prop::collection::vec("[a-z0-9]{1,8}/[a-z0-9]{1,8}", 1..64),
    ) {
        prop_assume!(nodes.len() > 1);
        let gone = nodes[0].clone();
        let before = HashRing::from_nodes(&nodes).unwrap();
        let mut after = before.clone();
        after.remove_node(&gone).unwrap();
        for key in &keys {
            let old = before.owner(key).unwrap();
            let now = after.owner(key).unwrap();
            prop_assert!(*now != gone);
            prop_assert!(old == now || *old == gone);
        }
    }
}
