use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::avl::{Avl, Insert};

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Delete(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..2048_u16, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..2048_u16).prop_map(Op::Delete),
    ]
}

fn height_bound(n: usize) -> f64 {
    1.4405 * ((n + 2) as f64).log2() - 0.3277
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_unique_inserts_stay_balanced(keys in prop::collection::hash_set(any::<i32>(), 0..500)) {
        let mut avl: Avl<i32, ()> = Avl::new("prop");
        for key in keys.iter() {
            prop_assert!(avl.insert(*key, ()).is_inserted());
            prop_assert!(avl.validate().is_ok());
        }
        prop_assert_eq!(avl.len(), keys.len());
        prop_assert_eq!(avl.iter().count(), avl.len());

        let mut expect: Vec<i32> = keys.into_iter().collect();
        expect.sort();
        let got: Vec<i32> = avl.keys().cloned().collect();
        prop_assert_eq!(got, expect);
    }

    #[test]
    fn prop_reinsert_only_updates(keys in prop::collection::vec(0..100_i32, 1..200)) {
        let mut avl: Avl<i32, usize> = Avl::new("prop");
        let mut model = BTreeMap::new();
        for (i, key) in keys.iter().enumerate() {
            let before = avl.len();
            match avl.insert(*key, i) {
                Insert::Inserted => {
                    prop_assert!(model.insert(*key, i).is_none());
                    prop_assert_eq!(avl.len(), before + 1);
                }
                Insert::Updated(old) => {
                    prop_assert_eq!(model.insert(*key, i), Some(old));
                    prop_assert_eq!(avl.len(), before);
                }
            }
        }
        let got: Vec<(i32, usize)> = avl.iter().map(|(k, v)| (*k, *v)).collect();
        let expect: Vec<(i32, usize)> = model.into_iter().collect();
        prop_assert_eq!(got, expect);
    }

    #[test]
    fn prop_mixed_ops_match_model(ops in prop::collection::vec(op_strategy(), 1..3000)) {
        let mut avl: Avl<u16, u32> = Avl::new("prop");
        let mut model = BTreeMap::new();
        for op in ops.into_iter() {
            match op {
                Op::Insert(key, value) => {
                    let res = avl.insert(key, value);
                    match model.insert(key, value) {
                        None => prop_assert_eq!(res, Insert::Inserted),
                        Some(old) => prop_assert_eq!(res, Insert::Updated(old)),
                    }
                }
                Op::Delete(key) => {
                    let before = avl.len();
                    let res = avl.delete(&key);
                    prop_assert_eq!(res, model.remove(&key));
                    if res.is_some() {
                        prop_assert_eq!(avl.len(), before - 1);
                        prop_assert!(avl.get(&key).is_none());
                    }
                }
            }
            prop_assert!((avl.height() as f64) <= height_bound(avl.len()));
        }
        let stats = avl.validate();
        prop_assert!(stats.is_ok());
        prop_assert_eq!(avl.len(), model.len());
        prop_assert!(avl.iter().map(|(k, v)| (*k, *v)).eq(model.into_iter()));
    }
}
