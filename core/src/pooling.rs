//! Revenue pooling.
//!
//! Staff declaring `poolsWith` share their commission equally. Pools are
//! the connected components of the declarations; every declaring member
//! must list exactly the other members of its component. Runs once, after
//! every staff block has been committed to the commission map.

use crate::{
    config::StaffConfigTable,
    error::{CommissionError, CommissionResult},
    types::{round2, CommissionMap, StaffId},
};
use std::collections::{BTreeMap, BTreeSet};

/// A set of staff IDs sharing commission.
pub type Pool = BTreeSet<StaffId>;

/// Disjoint-set forest over staff IDs.
#[derive(Debug, Default)]
struct UnionFind {
    index: BTreeMap<StaffId, usize>,
    parent: Vec<usize>,
}

impl UnionFind {
    fn slot(&mut self, id: &str) -> usize {
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        let i = self.parent.len();
        self.parent.push(i);
        self.index.insert(id.to_string(), i);
        i
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: &str, b: &str) {
        let (a, b) = (self.slot(a), self.slot(b));
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    fn components(mut self) -> BTreeMap<StaffId, Pool> {
        let ids: Vec<(StaffId, usize)> = self.index.iter().map(|(id, &i)| (id.clone(), i)).collect();
        let mut by_root: BTreeMap<usize, Pool> = BTreeMap::new();
        let mut root_of: BTreeMap<StaffId, usize> = BTreeMap::new();
        for (id, i) in ids {
            let root = self.find(i);
            by_root.entry(root).or_default().insert(id.clone());
            root_of.insert(id, root);
        }
        root_of
            .into_iter()
            .map(|(id, root)| (id, by_root[&root].clone()))
            .collect()
    }
}

/// Build the pools declared in `table` and verify each is consistent.
///
/// Pools are returned ordered by their smallest member ID.
pub fn build_pools(table: &StaffConfigTable) -> CommissionResult<Vec<Pool>> {
    let mut uf = UnionFind::default();
    let mut declared: BTreeMap<&StaffId, Pool> = BTreeMap::new();

    for (staff_id, config) in table.iter() {
        if config.pools_with.is_empty() {
            continue;
        }
        uf.slot(staff_id);
        for other in &config.pools_with {
            uf.union(staff_id, other);
        }
        let mut members: Pool = config.pools_with.iter().cloned().collect();
        members.insert(staff_id.clone());
        declared.insert(staff_id, members);
    }

    let components = uf.components();
    for (staff_id, members) in &declared {
        let pool = &components[*staff_id];
        if members != pool {
            return Err(CommissionError::PoolingInconsistent {
                staff_id: (*staff_id).clone(),
                declared: members.iter().cloned().collect(),
                pool: pool.iter().cloned().collect(),
                context: "pooling".to_string(),
            });
        }
    }

    let pools: BTreeSet<Pool> = components.into_values().collect();
    Ok(pools.into_iter().collect())
}

/// Equalize the numeric commission fields across each pool's members.
///
/// Field totals are taken over members present in `commissions` and split
/// by the full pool size. Members without an entry are skipped.
pub fn apply_pooling(pools: &[Pool], commissions: &mut CommissionMap) {
    for pool in pools {
        let mut totals = [0.0_f64; 6];
        let mut present = Vec::new();

        for staff_id in pool {
            match commissions.get(staff_id) {
                Some(components) => {
                    for (total, value) in totals.iter_mut().zip(components.numeric_fields()) {
                        *total += value;
                    }
                    present.push(staff_id);
                }
                None => log::info!(
                    target: "pooling",
                    "staff ID {staff_id} is pooled but has no commission entry this period"
                ),
            }
        }

        let shares = totals.map(|total| round2(total / pool.len() as f64));
        for staff_id in &present {
            if let Some(components) = commissions.get_mut(*staff_id) {
                for (field, share) in components.numeric_fields_mut().into_iter().zip(shares) {
                    *field = share;
                }
            }
        }

        log::info!(
            target: "pooling",
            "pool [{}]: {} of {} members with commission; each receives service commission {:.2}, product commission {:.2}, tips {:.2}",
            pool.iter().cloned().collect::<Vec<_>>().join(", "),
            present.len(),
            pool.len(),
            shares[5],
            shares[3],
            shares[4]
        );
    }
}

/// Build pools from `table` and apply them to `commissions`.
pub fn do_pooling(table: &StaffConfigTable, commissions: &mut CommissionMap) -> CommissionResult<Vec<Pool>> {
    let pools = build_pools(table)?;
    apply_pooling(&pools, commissions);
    Ok(pools)
}
