use log::{debug, warn};

use crate::as_graph::{ASGraph, AS};
use crate::config::{Config, Graph};
use crate::propagation_rank::{levels_to_propagation_ranks, ranks_to_levels, LevelMap};
use crate::shared::{ASRole, LinkKind, Relationships, TopologyError, ASN, DEFAULT_POLICY};

/// The only writer of a topology.
///
/// Every edit runs against a working copy of the graph and is committed
/// together with freshly computed levels, so after any call returns
/// [`TopologyEditor::levels`] matches [`TopologyEditor::graph`]. A failed
/// edit, including one that would introduce a customer-provider cycle,
/// leaves both untouched.
#[derive(Debug, Clone, Default)]
pub struct TopologyEditor {
    graph: ASGraph,
    levels: LevelMap,
}

impl TopologyEditor {
    pub fn new() -> Self {
        TopologyEditor::default()
    }

    pub fn from_graph(graph: ASGraph) -> Result<Self, TopologyError> {
        let levels = graph.assign_levels()?;
        Ok(TopologyEditor { graph, levels })
    }

    /// Builds an editor from a wire config.
    ///
    /// Every ASN mentioned by a link, a role list, the policy map or the
    /// level map becomes a node. Repeated identical links are accepted once.
    pub fn from_config(config: &Config) -> Result<Self, TopologyError> {
        let mut graph = ASGraph::new();

        let links = config
            .graph
            .cp_links
            .iter()
            .map(|&link| (link, LinkKind::CustomerProvider))
            .chain(config.graph.peer_links.iter().map(|&link| (link, LinkKind::Peer)));
        for ([a, b], kind) in links {
            add_node(&mut graph, a)?;
            add_node(&mut graph, b)?;
            if graph.link_kind(a, b) == Some(kind) {
                debug!("Skipping duplicate {} link {} - {}", kind, a, b);
                continue;
            }
            graph.insert_link(a, b, kind)?;
        }

        for (asns, role) in [
            (&config.victim_asns, ASRole::Victim),
            (&config.attacker_asns, ASRole::Attacker),
        ] {
            for &asn in asns {
                add_node(&mut graph, asn)?;
                if let Some(as_obj) = graph.get_mut(&asn) {
                    if as_obj.role != ASRole::None && as_obj.role != role {
                        return Err(TopologyError::RoleConflict(asn));
                    }
                    as_obj.role = role;
                }
            }
        }

        for (&asn, policy) in &config.asn_policy_map {
            add_node(&mut graph, asn)?;
            if let Some(as_obj) = graph.get_mut(&asn) {
                as_obj.policy = normalize_policy(policy);
            }
        }

        for (&asn, &level) in &config.graph.node_level_map {
            if level == 0 {
                return Err(TopologyError::InvalidLevel(asn));
            }
            add_node(&mut graph, asn)?;
            if let Some(as_obj) = graph.get_mut(&asn) {
                as_obj.level_override = Some(level);
            }
        }

        let editor = TopologyEditor::from_graph(graph)?;
        if let Some(ranks) = &config.graph.propagation_ranks {
            if ranks_to_levels(ranks) != editor.levels {
                debug!("Stored propagation ranks are stale and will be rewritten on export");
            }
        }
        debug!(
            "Loaded config {:?} with {} ASes",
            config.name,
            editor.graph.len()
        );
        Ok(editor)
    }

    /// Writes the topology back into a copy of `base`.
    ///
    /// Non-topology fields of `base` are kept as they are. `propagation_ranks`
    /// is refreshed, stubs first, only if `base` carried one.
    pub fn to_config(&self, base: &Config) -> Config {
        let mut config = base.clone();
        let mut graph = self.wire_graph();
        graph.propagation_ranks = base
            .graph
            .propagation_ranks
            .as_ref()
            .map(|_| levels_to_propagation_ranks(&self.levels));
        config.graph = graph;
        config.attacker_asns = self.graph.asns_with_role(ASRole::Attacker);
        config.victim_asns = self.graph.asns_with_role(ASRole::Victim);
        config.asn_policy_map = self.graph.policy_map();

        let dropped: Vec<ASN> = self
            .graph
            .iter()
            .filter(|as_obj| {
                as_obj.is_isolated()
                    && as_obj.role == ASRole::None
                    && as_obj.policy.is_none()
                    && as_obj.level_override.is_none()
            })
            .map(|as_obj| as_obj.asn)
            .collect();
        if !dropped.is_empty() {
            warn!("Isolated ASes {:?} have no links or attributes and are not exported", dropped);
        }
        config
    }

    pub fn wire_graph(&self) -> Graph {
        Graph {
            cp_links: self.graph.cp_links(),
            peer_links: self.graph.peer_links(),
            node_level_map: self.graph.level_overrides(),
            propagation_ranks: None,
        }
    }

    pub fn graph(&self) -> &ASGraph {
        &self.graph
    }

    pub fn levels(&self) -> &LevelMap {
        &self.levels
    }

    pub fn level_of(&self, asn: ASN) -> Option<u32> {
        self.levels.get(&asn).copied()
    }

    pub fn role_of(&self, asn: ASN) -> Option<ASRole> {
        self.graph.get(&asn).map(|as_obj| as_obj.role)
    }

    pub fn policy_of(&self, asn: ASN) -> Option<&str> {
        self.graph.get(&asn).map(AS::policy)
    }

    pub fn add_as(&mut self, asn: ASN) -> Result<(), TopologyError> {
        self.apply("add AS", |graph| {
            if asn == 0 {
                return Err(TopologyError::InvalidAsn);
            }
            if !graph.add_as(asn) {
                return Err(TopologyError::Conflict(asn));
            }
            Ok(())
        })
    }

    /// Re-keys an AS with all of its links and attributes.
    pub fn rename_as(&mut self, old_asn: ASN, new_asn: ASN) -> Result<(), TopologyError> {
        self.apply("rename AS", |graph| {
            if new_asn == 0 {
                return Err(TopologyError::InvalidAsn);
            }
            graph.rename_as(old_asn, new_asn)
        })
    }

    /// Removes an AS and everything attached to it. Absent ASes are a no-op.
    pub fn remove_as(&mut self, asn: ASN) -> Result<(), TopologyError> {
        self.apply("remove AS", |graph| {
            if let Some(removed) = graph.remove_as(asn) {
                debug!("Removed AS {} and links to {:?}", asn, removed.neighbor_asns());
            }
            Ok(())
        })
    }

    /// For customer-provider links `a` becomes the provider of `b`.
    pub fn add_link(&mut self, a: ASN, b: ASN, kind: LinkKind) -> Result<(), TopologyError> {
        self.apply("add link", |graph| graph.insert_link(a, b, kind))
    }

    /// Removes whichever link joins the pair; a missing link is a no-op.
    pub fn remove_link(&mut self, a: ASN, b: ASN) -> Result<(), TopologyError> {
        self.apply("remove link", |graph| {
            graph.remove_link(a, b);
            Ok(())
        })
    }

    /// Turns a peer link into a customer-provider link with `a` as the
    /// provider, or a customer-provider link into a peer link.
    pub fn retype_link(&mut self, a: ASN, b: ASN) -> Result<(), TopologyError> {
        self.apply("retype link", |graph| {
            let removed = graph
                .remove_link(a, b)
                .ok_or(TopologyError::LinkNotFound(a, b))?;
            graph.insert_link(a, b, removed.link_kind().toggled())
        })
    }

    /// Swaps provider and customer of an existing customer-provider link.
    /// The pair may be given in either order.
    pub fn reverse_provider_customer(&mut self, a: ASN, b: ASN) -> Result<(), TopologyError> {
        self.apply("reverse link", |graph| {
            let (provider, customer) = match graph.relationship(a, b) {
                Some(Relationships::Customers) => (a, b),
                Some(Relationships::Providers) => (b, a),
                _ => return Err(TopologyError::LinkNotFound(a, b)),
            };
            graph.remove_link(provider, customer);
            graph.insert_link(customer, provider, LinkKind::CustomerProvider)
        })
    }

    /// An AS has at most one role, so setting one replaces the other.
    pub fn set_role(&mut self, asn: ASN, role: ASRole) -> Result<(), TopologyError> {
        self.apply("set role", |graph| {
            let as_obj = graph.get_mut(&asn).ok_or(TopologyError::NotFound(asn))?;
            as_obj.role = role;
            Ok(())
        })
    }

    pub fn set_policy(&mut self, asn: ASN, policy: &str) -> Result<(), TopologyError> {
        self.apply("set policy", |graph| {
            let as_obj = graph.get_mut(&asn).ok_or(TopologyError::NotFound(asn))?;
            as_obj.policy = normalize_policy(policy);
            Ok(())
        })
    }

    /// Pins an AS to a layout level, or unpins it with `None`.
    pub fn set_level(&mut self, asn: ASN, level: Option<u32>) -> Result<(), TopologyError> {
        self.apply("set level", |graph| {
            if level == Some(0) {
                return Err(TopologyError::InvalidLevel(asn));
            }
            let as_obj = graph.get_mut(&asn).ok_or(TopologyError::NotFound(asn))?;
            as_obj.level_override = level;
            Ok(())
        })
    }

    fn apply<T, F>(&mut self, action: &str, edit: F) -> Result<T, TopologyError>
    where
        F: FnOnce(&mut ASGraph) -> Result<T, TopologyError>,
    {
        let mut working = self.graph.clone();
        let result = edit(&mut working).and_then(|value| {
            let levels = working.assign_levels()?;
            Ok((value, levels))
        });

        match result {
            Ok((value, levels)) => {
                self.graph = working;
                self.levels = levels;
                debug!("Applied {} ({} ASes)", action, self.graph.len());
                Ok(value)
            }
            Err(err) => {
                debug!("Rejected {}: {}", action, err);
                Err(err)
            }
        }
    }
}

fn add_node(graph: &mut ASGraph, asn: ASN) -> Result<(), TopologyError> {
    if asn == 0 {
        return Err(TopologyError::InvalidAsn);
    }
    graph.add_as(asn);
    Ok(())
}

/// Empty strings and the default tag are stored as "no policy".
fn normalize_policy(policy: &str) -> Option<String> {
    let policy = policy.trim();
    if policy.is_empty() || policy.eq_ignore_ascii_case(DEFAULT_POLICY) {
        None
    } else {
        Some(policy.to_string())
    }
}
