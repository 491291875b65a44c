//! Ordering engine for content records
//!
//! Active records occupy a contiguous 1..=N `order` sequence; archived
//! records sit outside the sequence and keep whatever order value they had
//! when archived. All functions here are pure: they never mutate their
//! input and the array positions of the input are preserved, so unrelated
//! rendering keyed on array position stays stable.

use crate::core::Record;
use std::collections::HashMap;

/// Renumber active records into a contiguous 1..=N sequence.
///
/// Actives are ranked by their current `order` (stable: ties keep input
/// position), archived records are left untouched, and the output array
/// keeps the input's element positions.
pub fn normalize(list: &[Record]) -> Vec<Record> {
    let mut active: Vec<(usize, &Record)> = list
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.archived)
        .collect();
    active.sort_by_key(|(_, r)| r.order);

    let new_orders: HashMap<&str, u32> = active
        .iter()
        .enumerate()
        .map(|(rank, (_, r))| (r.id.as_str(), rank as u32 + 1))
        .collect();

    list.iter()
        .map(|r| {
            if r.archived {
                r.clone()
            } else {
                let mut updated = r.clone();
                if let Some(&order) = new_orders.get(r.id.as_str()) {
                    updated.order = order;
                }
                updated
            }
        })
        .collect()
}

/// Number of active records in a list
pub fn active_count(list: &[Record]) -> usize {
    list.iter().filter(|r| !r.archived).count()
}

/// Place `record` among the active records at `requested_order`, shifting
/// conflicting actives down by one. Covers create, edit-with-move and
/// restore: any existing entry with the same id is replaced.
///
/// `requested_order` is clamped to `1..=active_count + 1`; `None` appends
/// after the last active record.
pub fn resolve_insertion(
    list: &[Record],
    record: Record,
    requested_order: Option<u32>,
) -> Vec<Record> {
    let remainder: Vec<Record> = list
        .iter()
        .filter(|r| r.id != record.id)
        .cloned()
        .collect();
    let mut result = normalize(&remainder);

    let count = active_count(&result) as u32;
    let target = requested_order
        .unwrap_or(count + 1)
        .clamp(1, count + 1);

    for r in result.iter_mut() {
        if !r.archived && r.order >= target {
            r.order += 1;
        }
    }

    let mut inserted = record;
    inserted.archived = false;
    inserted.order = target;
    result.push(inserted);

    normalize(&result)
}

/// Archive the record with the given id. Its `order` is frozen at its
/// current value and the remaining actives are compacted.
pub fn archive(list: &[Record], id: &str) -> Vec<Record> {
    let updated: Vec<Record> = list
        .iter()
        .map(|r| {
            if r.id == id {
                let mut archived = r.clone();
                archived.archived = true;
                archived
            } else {
                r.clone()
            }
        })
        .collect();

    normalize(&updated)
}

/// Bring an archived record back into the active sequence. The stored
/// order is stale history and is ignored; `requested_order` of `None`
/// appends after the current last active record.
pub fn restore(list: &[Record], id: &str, requested_order: Option<u32>) -> Vec<Record> {
    let record = match list.iter().find(|r| r.id == id) {
        Some(r) => r.clone(),
        None => return list.to_vec(),
    };

    resolve_insertion(list, record, requested_order)
}
