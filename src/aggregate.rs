//! Group-by over row subsets, preserving first-occurrence order of keys.

use std::collections::HashMap;
use std::hash::Hash;

/// Partition `items` by key. Each distinct key appears once, in the order it
/// was first produced; members keep their input order.
pub fn groups<T, K, I, KF>(items: I, mut key: KF) -> Vec<(K, Vec<T>)>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    KF: FnMut(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&slot) => out[slot].1.push(item),
            None => {
                index.insert(k.clone(), out.len());
                out.push((k, vec![item]));
            }
        }
    }
    out
}

/// Group and summarise: one `(key, summary)` per distinct key.
pub fn group_by<T, K, S, I, KF, RF>(items: I, key: KF, mut reduce: RF) -> Vec<(K, S)>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    KF: FnMut(&T) -> K,
    RF: FnMut(&[T]) -> S,
{
    groups(items, key)
        .into_iter()
        .map(|(k, members)| {
            let summary = reduce(members.as_slice());
            (k, summary)
        })
        .collect()
}

/// Two-level group-by: outer key, then inner key within each outer group.
pub fn group_by2<T, K1, K2, S, I, KF1, KF2, RF>(
    items: I,
    outer: KF1,
    mut inner: KF2,
    mut reduce: RF,
) -> Vec<(K1, Vec<(K2, S)>)>
where
    I: IntoIterator<Item = T>,
    K1: Eq + Hash + Clone,
    K2: Eq + Hash + Clone,
    KF1: FnMut(&T) -> K1,
    KF2: FnMut(&T) -> K2,
    RF: FnMut(&[T]) -> S,
{
    groups(items, outer)
        .into_iter()
        .map(|(k, members)| (k, group_by(members, &mut inner, &mut reduce)))
        .collect()
}
