//! Hierarchy levels for a top-down layout of the customer-provider graph.
//!
//! Every AS gets a propagation rank equal to the length of the longest
//! customer chain below it, so stubs have rank 0. Levels flip that around:
//! `level = max_rank + 1 - rank`, which puts ASes without providers on the
//! smallest levels and stubs on the largest.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::Graph;
use crate::shared::{CycleError, ASN};

pub type LevelMap = BTreeMap<ASN, u32>;

/// Provider to customer edges of a graph, plus the ASes that only appear
/// through peer links or as isolated nodes.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    customers: BTreeMap<ASN, BTreeSet<ASN>>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Hierarchy {
            customers: BTreeMap::new(),
        }
    }

    pub fn add_node(&mut self, asn: ASN) {
        self.customers.entry(asn).or_default();
    }

    pub fn add_cp_link(&mut self, provider: ASN, customer: ASN) {
        self.add_node(customer);
        self.customers.entry(provider).or_default().insert(customer);
    }

    /// Propagation rank of every AS, or the AS at which a cycle closes.
    ///
    /// Iterative depth-first walk down the customer edges. An AS stays on
    /// `on_path` until all its customers are ranked; reaching it again before
    /// that means it is its own transitive customer.
    pub fn propagation_ranks(&self) -> Result<HashMap<ASN, u32>, CycleError> {
        let mut ranks: HashMap<ASN, u32> = HashMap::with_capacity(self.customers.len());
        let mut on_path: HashSet<ASN> = HashSet::new();

        for &root in self.customers.keys() {
            if ranks.contains_key(&root) {
                continue;
            }

            let mut stack: Vec<(ASN, Vec<ASN>, usize)> = vec![(root, self.customers_of(root), 0)];
            on_path.insert(root);

            while let Some((asn, customers, next)) = stack.last_mut() {
                if let Some(&customer) = customers.get(*next) {
                    *next += 1;
                    if ranks.contains_key(&customer) {
                        continue;
                    }
                    if !on_path.insert(customer) {
                        return Err(CycleError { asn: customer });
                    }
                    let below = self.customers_of(customer);
                    stack.push((customer, below, 0));
                    continue;
                }

                let rank = customers
                    .iter()
                    .filter_map(|customer| ranks.get(customer))
                    .map(|rank| rank + 1)
                    .max()
                    .unwrap_or(0);
                let asn = *asn;
                ranks.insert(asn, rank);
                on_path.remove(&asn);
                stack.pop();
            }
        }

        Ok(ranks)
    }

    /// Converts ranks to levels, then applies the explicit overrides.
    pub fn levels<I>(&self, overrides: I) -> Result<LevelMap, CycleError>
    where
        I: IntoIterator<Item = (ASN, u32)>,
    {
        let ranks = self.propagation_ranks()?;
        let max_rank = ranks.values().copied().max().unwrap_or(0);

        let mut levels: LevelMap = ranks
            .into_iter()
            .map(|(asn, rank)| (asn, max_rank + 1 - rank))
            .collect();
        levels.extend(overrides);
        Ok(levels)
    }

    fn customers_of(&self, asn: ASN) -> Vec<ASN> {
        self.customers
            .get(&asn)
            .map(|customers| customers.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Levels for a wire graph. Peer links only contribute their endpoints.
pub fn assign_levels(graph: &Graph) -> Result<LevelMap, CycleError> {
    let mut hierarchy = Hierarchy::new();
    for &[provider, customer] in &graph.cp_links {
        hierarchy.add_cp_link(provider, customer);
    }
    for &[asn_a, asn_b] in &graph.peer_links {
        hierarchy.add_node(asn_a);
        hierarchy.add_node(asn_b);
    }
    hierarchy.levels(graph.node_level_map.iter().map(|(&asn, &level)| (asn, level)))
}

/// Groups levels into rank lists, top level first, each list sorted.
pub fn levels_to_ranks(levels: &LevelMap) -> Vec<Vec<ASN>> {
    let mut grouped: BTreeMap<u32, Vec<ASN>> = BTreeMap::new();
    for (&asn, &level) in levels {
        grouped.entry(level).or_default().push(asn);
    }
    grouped.into_values().collect()
}

/// Rank groups in the simulator's order, stubs first. Inverse of
/// [`ranks_to_levels`] when levels run without gaps from 1; pinned levels
/// that leave gaps are compacted.
pub fn levels_to_propagation_ranks(levels: &LevelMap) -> Vec<Vec<ASN>> {
    let mut ranks = levels_to_ranks(levels);
    ranks.reverse();
    ranks
}

/// Reads the simulator's rank output, which lists stubs first:
/// group `i` of `n` ends up on level `n - i`.
pub fn ranks_to_levels(ranks: &[Vec<ASN>]) -> LevelMap {
    let n = ranks.len() as u32;
    let mut levels = LevelMap::new();
    for (index, group) in ranks.iter().enumerate() {
        for &asn in group {
            levels.insert(asn, n - index as u32);
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diamond_takes_longest_chain() {
        // 1 -> 2 -> 3 -> 4 and 1 -> 4 directly
        let mut hierarchy = Hierarchy::new();
        hierarchy.add_cp_link(1, 2);
        hierarchy.add_cp_link(2, 3);
        hierarchy.add_cp_link(3, 4);
        hierarchy.add_cp_link(1, 4);

        let ranks = hierarchy.propagation_ranks().unwrap();
        assert_eq!(ranks[&4], 0);
        assert_eq!(ranks[&3], 1);
        assert_eq!(ranks[&2], 2);
        assert_eq!(ranks[&1], 3);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut hierarchy = Hierarchy::new();
        hierarchy.add_cp_link(5, 5);
        assert_eq!(hierarchy.propagation_ranks(), Err(CycleError { asn: 5 }));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut hierarchy = Hierarchy::new();
        for asn in 1..100_000 {
            hierarchy.add_cp_link(asn, asn + 1);
        }
        let levels = hierarchy.levels(std::iter::empty()).unwrap();
        assert_eq!(levels[&1], 1);
        assert_eq!(levels[&100_000], 100_000);
    }

    #[test]
    fn test_empty_hierarchy() {
        assert!(Hierarchy::new().levels(std::iter::empty()).unwrap().is_empty());
    }
}
