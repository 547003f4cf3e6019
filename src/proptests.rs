use super::*;

use crate::store::{Node, NodeStore};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Checks the structural invariants of a tree.
///
/// - every leaf is reachable through branch decisions that agree with its key
/// - branches strictly increase in `(byte_index, mask)` order downwards
/// - the number of leaves matches `len()`
/// - iteration is strictly ascending
fn validate_tree<V, S: NodeStore<V>>(t: &CritBitTree<V, S>) {
    let mut stack: Vec<(S::Ref, Vec<(Branch, usize)>)> = Vec::new();
    if let Some(root) = t.root {
        stack.push((root, Vec::new()));
    }

    let mut leaf_count = 0usize;
    while let Some((at, path)) = stack.pop() {
        match t.store.node(at) {
            Node::Internal { branch, children } => {
                if let Some(&(parent, _)) = path.last() {
                    assert!(
                        parent < branch,
                        "branch {branch:?} below {parent:?} breaks ordering"
                    );
                }
                for (direction, child) in children.into_iter().enumerate() {
                    let mut child_path = path.clone();
                    child_path.push((branch, direction));
                    stack.push((child, child_path));
                }
            }
            Node::Leaf { key, .. } => {
                leaf_count += 1;
                for &(branch, direction) in &path {
                    assert_eq!(
                        branch.direction(key),
                        direction,
                        "leaf {key:?} hangs on the wrong side of {branch:?}"
                    );
                }
                assert!(t.contains_key(key), "leaf {key:?} not found by lookup");
            }
        }
    }

    assert_eq!(leaf_count, t.len(), "reachable leaf count must match len()");
    assert_eq!(t.is_empty(), t.len() == 0);

    let keys: Vec<&[u8]> = t.keys().collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "iteration must be strictly ascending"
    );
}

/// Small alphabet so that shared prefixes, zero bytes and prefix keys are common.
const ALPHABET: &[u8] = &[0x00, 0x01, b'a', b'b', 0x80, 0xFF];

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..=6)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 50)]
    Insert(#[proptest(strategy = "key_strategy()")] Vec<u8>, u64),
    #[proptest(weight = 25)]
    Remove(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 24)]
    Get(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 1)]
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=500)
}

fn check_equivalence<S: NodeStore<u64>>(
    t: &mut CritBitTree<u64, S>,
    ops: Vec<Op>,
    insert: impl Fn(&mut CritBitTree<u64, S>, &[u8], u64) -> bool,
) -> std::result::Result<(), TestCaseError> {
    let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let inserted = insert(t, &key, value);
                let expected = !m.contains_key(&key);
                if expected {
                    m.insert(key, value);
                }
                prop_assert_eq!(inserted, expected);
            }
            Op::Remove(key) => {
                prop_assert_eq!(t.remove(&key), m.remove(&key).is_some());
            }
            Op::Get(key) => {
                prop_assert_eq!(t.get(&key), m.get(&key));
            }
            Op::Clear => {
                t.clear();
                m.clear();
            }
        }

        prop_assert_eq!(t.len(), m.len());
    }

    validate_tree(t);
    let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
    let expected: Vec<(Vec<u8>, u64)> = m.into_iter().collect();
    prop_assert_eq!(got, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_heap(ops in ops_strategy()) {
        let mut t: CritBitTree<u64> = CritBitTree::new();
        check_equivalence(&mut t, ops, |t, key, value| t.insert(key, value))?;
    }

    #[test]
    fn prop_equivalence_packed(ops in ops_strategy()) {
        let config = Config::default().with_page_size(64);
        let mut t: PackedCritBitTree<u64> = PackedCritBitTree::with_config(config).unwrap();
        check_equivalence(&mut t, ops, |t, key, value| t.insert(key, value).unwrap())?;
    }

    #[test]
    fn prop_lookup_of_absent_keys(
        keys in prop::collection::btree_set(key_strategy(), 0..64),
        probes in prop::collection::vec(key_strategy(), 0..64),
    ) {
        let mut t: CritBitTree<()> = CritBitTree::new();
        for key in &keys {
            prop_assert!(t.insert(key, ()));
        }
        for probe in &probes {
            prop_assert_eq!(t.contains_key(probe), keys.contains(probe));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"\0".to_vec(),
        b"a".to_vec(),
        b"a\0".to_vec(),
        b"ab".to_vec(),
        b"b".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_key_set();
    let mut sorted = keys.clone();
    sorted.sort();

    for_each_permutation(&keys, |perm| {
        let mut t: CritBitTree<u64> = CritBitTree::new();
        let mut p: PackedCritBitTree<u64> = PackedCritBitTree::new();

        for (i, k) in perm.iter().enumerate() {
            assert!(t.insert(k, i as u64));
            assert_eq!(p.insert(k, i as u64), Ok(true));
        }

        validate_tree(&t);
        validate_tree(&p);
        let got: Vec<Vec<u8>> = t.keys().map(<[u8]>::to_vec).collect();
        assert_eq!(got, sorted);
        let got: Vec<Vec<u8>> = p.keys().map(<[u8]>::to_vec).collect();
        assert_eq!(got, sorted);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_key_set();

    for_each_permutation(&keys, |perm| {
        // Insert in a fixed order, then remove in this permutation.
        let mut t: CritBitTree<u64> = CritBitTree::new();
        let mut p: PackedCritBitTree<u64> = PackedCritBitTree::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, i as u64);
            p.insert(k, i as u64).unwrap();
            m.insert(k.clone(), i as u64);
        }

        for k in perm {
            assert!(t.remove(&k));
            assert!(p.remove(&k));
            assert!(!t.remove(&k));
            m.remove(&k);
            assert_eq!(t.len(), m.len());
            assert_eq!(p.len(), m.len());
            validate_tree(&t);
            validate_tree(&p);
            for (key, value) in &m {
                assert_eq!(t.get(key), Some(value));
                assert_eq!(p.get(key), Some(value));
            }
        }
        assert!(t.root.is_none());
        assert!(p.root.is_none());
        assert_eq!(t.store.live_nodes(), 0);
    });
}
