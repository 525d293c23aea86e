use std::collections::HashMap;
use std::hash::Hash;

use crate::types::TransactionRecord;

/// Reduction applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Every record in the group, converted or not.
    Count,
    /// Sum of present `amount_usd` values; 0.0 when the group has none.
    Sum,
    /// Mean of present `amount_usd` values; groups with none are dropped.
    Mean,
}

#[derive(Debug, Default, Clone, Copy)]
struct Acc {
    rows: usize,
    valued: usize,
    sum: f64,
}

/// Records grouped by key, in first-seen key order.
#[derive(Debug)]
pub struct Grouped<K> {
    keys: Vec<K>,
    accs: Vec<Acc>,
}

pub fn group_by<'a, K, F>(rows: &[&'a TransactionRecord], key: F) -> Grouped<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a TransactionRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut keys = Vec::new();
    let mut accs: Vec<Acc> = Vec::new();

    for &row in rows {
        let k = key(row);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            keys.push(k);
            accs.push(Acc::default());
            accs.len() - 1
        });
        let acc = &mut accs[slot];
        acc.rows += 1;
        if let Some(v) = row.amount_usd {
            acc.valued += 1;
            acc.sum += v;
        }
    }

    Grouped { keys, accs }
}

impl<K> Grouped<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn measure(self, measure: Measure) -> Vec<(K, f64)> {
        self.keys
            .into_iter()
            .zip(self.accs)
            .filter_map(|(k, acc)| match measure {
                Measure::Count => Some((k, acc.rows as f64)),
                Measure::Sum => Some((k, acc.sum)),
                Measure::Mean if acc.valued == 0 => None,
                Measure::Mean => Some((k, acc.sum / acc.valued as f64)),
            })
            .collect()
    }
}

/// Largest value first; ties keep their current order.
pub fn sort_desc<K>(values: &mut [(K, f64)]) {
    values.sort_by(|a, b| b.1.total_cmp(&a.1));
}

pub fn sort_by_key<K: Ord, V>(values: &mut [(K, V)]) {
    values.sort_by(|a, b| a.0.cmp(&b.0));
}
