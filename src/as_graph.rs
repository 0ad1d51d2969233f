use std::collections::{BTreeMap, BTreeSet};

use crate::propagation_rank::{Hierarchy, LevelMap};
use crate::shared::{ASRole, CycleError, LinkKind, Relationships, TopologyError, DEFAULT_POLICY};

pub use crate::shared::ASN;

/// A single AS together with its adjacency and per-node attributes.
///
/// Adjacency is kept symmetric by [`ASGraph`]: if `b` is in `a.customers`
/// then `a` is in `b.providers`, and peers appear on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AS {
    pub asn: ASN,
    pub(crate) peers: BTreeSet<ASN>,
    pub(crate) providers: BTreeSet<ASN>,
    pub(crate) customers: BTreeSet<ASN>,
    pub role: ASRole,
    /// `None` means the default policy
    pub policy: Option<String>,
    /// Pins the layout level regardless of topological position
    pub level_override: Option<u32>,
}

impl AS {
    pub fn new(asn: ASN) -> Self {
        AS {
            asn,
            peers: BTreeSet::new(),
            providers: BTreeSet::new(),
            customers: BTreeSet::new(),
            role: ASRole::None,
            policy: None,
            level_override: None,
        }
    }

    pub fn get_neighbors(&self, rel: Relationships) -> &BTreeSet<ASN> {
        match rel {
            Relationships::Providers => &self.providers,
            Relationships::Peers => &self.peers,
            Relationships::Customers => &self.customers,
        }
    }

    pub fn customers(&self) -> impl Iterator<Item = ASN> + '_ {
        self.customers.iter().copied()
    }

    pub fn peers(&self) -> impl Iterator<Item = ASN> + '_ {
        self.peers.iter().copied()
    }

    pub fn policy(&self) -> &str {
        self.policy.as_deref().unwrap_or(DEFAULT_POLICY)
    }

    pub fn is_isolated(&self) -> bool {
        self.peers.is_empty() && self.providers.is_empty() && self.customers.is_empty()
    }

    pub fn neighbor_asns(&self) -> BTreeSet<ASN> {
        let mut result = BTreeSet::new();
        result.extend(&self.peers);
        result.extend(&self.providers);
        result.extend(&self.customers);
        result
    }

    fn relationship_to(&self, other: ASN) -> Option<Relationships> {
        if self.providers.contains(&other) {
            Some(Relationships::Providers)
        } else if self.customers.contains(&other) {
            Some(Relationships::Customers)
        } else if self.peers.contains(&other) {
            Some(Relationships::Peers)
        } else {
            None
        }
    }

    fn neighbors_mut(&mut self, rel: Relationships) -> &mut BTreeSet<ASN> {
        match rel {
            Relationships::Providers => &mut self.providers,
            Relationships::Peers => &mut self.peers,
            Relationships::Customers => &mut self.customers,
        }
    }
}

/// Owns every AS and every link of a topology.
///
/// Links live in the adjacency sets of both endpoints, so a link can never
/// reference an AS that is not in the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ASGraph {
    as_dict: BTreeMap<ASN, AS>,
}

impl ASGraph {
    pub fn new() -> Self {
        ASGraph {
            as_dict: BTreeMap::new(),
        }
    }

    pub fn get(&self, asn: &ASN) -> Option<&AS> {
        self.as_dict.get(asn)
    }

    pub(crate) fn get_mut(&mut self, asn: &ASN) -> Option<&mut AS> {
        self.as_dict.get_mut(asn)
    }

    pub fn contains(&self, asn: &ASN) -> bool {
        self.as_dict.contains_key(asn)
    }

    pub fn len(&self) -> usize {
        self.as_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_dict.is_empty()
    }

    /// Iterates in ascending ASN order
    pub fn iter(&self) -> impl Iterator<Item = &AS> {
        self.as_dict.values()
    }

    pub fn asns(&self) -> impl Iterator<Item = ASN> + '_ {
        self.as_dict.keys().copied()
    }

    /// Returns `false` if the AS was already present.
    pub fn add_as(&mut self, asn: ASN) -> bool {
        if self.as_dict.contains_key(&asn) {
            return false;
        }
        self.as_dict.insert(asn, AS::new(asn));
        true
    }

    /// Removes the AS and every link touching it.
    ///
    /// The removed record is returned so callers can see which neighbors lost
    /// a link (`neighbor_asns`). Removing an absent AS returns `None`.
    pub fn remove_as(&mut self, asn: ASN) -> Option<AS> {
        let removed = self.as_dict.remove(&asn)?;
        for neighbor in removed.neighbor_asns() {
            if let Some(neighbor_as) = self.as_dict.get_mut(&neighbor) {
                neighbor_as.peers.remove(&asn);
                neighbor_as.providers.remove(&asn);
                neighbor_as.customers.remove(&asn);
            }
        }
        Some(removed)
    }

    /// Moves an AS, its links and its attributes to a new ASN.
    pub fn rename_as(&mut self, old_asn: ASN, new_asn: ASN) -> Result<(), TopologyError> {
        if !self.contains(&old_asn) {
            return Err(TopologyError::NotFound(old_asn));
        }
        if old_asn == new_asn {
            return Ok(());
        }
        if self.contains(&new_asn) {
            return Err(TopologyError::Conflict(new_asn));
        }
        let mut as_obj = self
            .as_dict
            .remove(&old_asn)
            .ok_or(TopologyError::NotFound(old_asn))?;

        for rel in [Relationships::Providers, Relationships::Peers, Relationships::Customers] {
            for &neighbor in as_obj.get_neighbors(rel) {
                if let Some(neighbor_as) = self.as_dict.get_mut(&neighbor) {
                    let back = neighbor_as.neighbors_mut(rel.invert());
                    back.remove(&old_asn);
                    back.insert(new_asn);
                }
            }
        }

        as_obj.asn = new_asn;
        self.as_dict.insert(new_asn, as_obj);
        Ok(())
    }

    /// Inserts a link. For customer-provider links `a` is the provider.
    pub fn insert_link(&mut self, a: ASN, b: ASN, kind: LinkKind) -> Result<(), TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLink(a));
        }
        for asn in [a, b] {
            if !self.contains(&asn) {
                return Err(TopologyError::NotFound(asn));
            }
        }
        if self.relationship(a, b).is_some() {
            return Err(TopologyError::LinkConflict(a, b));
        }

        let (a_side, b_side) = match kind {
            LinkKind::CustomerProvider => (Relationships::Customers, Relationships::Providers),
            LinkKind::Peer => (Relationships::Peers, Relationships::Peers),
        };
        if let Some(a_as) = self.as_dict.get_mut(&a) {
            a_as.neighbors_mut(a_side).insert(b);
        }
        if let Some(b_as) = self.as_dict.get_mut(&b) {
            b_as.neighbors_mut(b_side).insert(a);
        }
        Ok(())
    }

    /// Removes whichever link connects the pair, in either direction.
    pub fn remove_link(&mut self, a: ASN, b: ASN) -> Option<Relationships> {
        let rel = self.relationship(a, b)?;
        if let Some(a_as) = self.as_dict.get_mut(&a) {
            a_as.neighbors_mut(rel).remove(&b);
        }
        if let Some(b_as) = self.as_dict.get_mut(&b) {
            b_as.neighbors_mut(rel.invert()).remove(&a);
        }
        Some(rel)
    }

    /// What `b` is to `a`: one of `a`'s providers, customers or peers.
    pub fn relationship(&self, a: ASN, b: ASN) -> Option<Relationships> {
        self.as_dict.get(&a)?.relationship_to(b)
    }

    /// Peer links match in either direction, customer-provider links only
    /// when `a` is the provider of `b`.
    pub fn link_kind(&self, a: ASN, b: ASN) -> Option<LinkKind> {
        match self.relationship(a, b)? {
            Relationships::Peers => Some(LinkKind::Peer),
            Relationships::Customers => Some(LinkKind::CustomerProvider),
            Relationships::Providers => None,
        }
    }

    pub fn has_link(&self, a: ASN, b: ASN) -> bool {
        self.link_kind(a, b).is_some()
    }

    pub fn providers_of(&self, asn: ASN) -> Vec<ASN> {
        self.neighbors_of(asn, Relationships::Providers)
    }

    pub fn customers_of(&self, asn: ASN) -> Vec<ASN> {
        self.neighbors_of(asn, Relationships::Customers)
    }

    pub fn peers_of(&self, asn: ASN) -> Vec<ASN> {
        self.neighbors_of(asn, Relationships::Peers)
    }

    fn neighbors_of(&self, asn: ASN, rel: Relationships) -> Vec<ASN> {
        self.as_dict
            .get(&asn)
            .map(|as_obj| as_obj.get_neighbors(rel).iter().copied().collect())
            .unwrap_or_default()
    }

    /// `[provider, customer]` pairs ordered by provider, then customer
    pub fn cp_links(&self) -> Vec<[ASN; 2]> {
        self.as_dict
            .values()
            .flat_map(|as_obj| as_obj.customers().map(move |customer| [as_obj.asn, customer]))
            .collect()
    }

    /// Each peer link once, as `[lower, higher]`
    pub fn peer_links(&self) -> Vec<[ASN; 2]> {
        self.as_dict
            .values()
            .flat_map(|as_obj| {
                as_obj
                    .peers()
                    .filter(move |&peer| peer > as_obj.asn)
                    .map(move |peer| [as_obj.asn, peer])
            })
            .collect()
    }

    pub fn asns_with_role(&self, role: ASRole) -> Vec<ASN> {
        self.as_dict
            .values()
            .filter(|as_obj| as_obj.role == role)
            .map(|as_obj| as_obj.asn)
            .collect()
    }

    pub fn level_overrides(&self) -> BTreeMap<ASN, u32> {
        self.as_dict
            .values()
            .filter_map(|as_obj| as_obj.level_override.map(|level| (as_obj.asn, level)))
            .collect()
    }

    pub fn policy_map(&self) -> BTreeMap<ASN, String> {
        self.as_dict
            .values()
            .filter_map(|as_obj| as_obj.policy.clone().map(|policy| (as_obj.asn, policy)))
            .collect()
    }

    /// Computes the layout level of every AS, honoring level overrides.
    pub fn assign_levels(&self) -> Result<LevelMap, CycleError> {
        let mut hierarchy = Hierarchy::new();
        for as_obj in self.as_dict.values() {
            hierarchy.add_node(as_obj.asn);
            for customer in as_obj.customers() {
                hierarchy.add_cp_link(as_obj.asn, customer);
            }
        }
        hierarchy.levels(self.level_overrides())
    }
}
