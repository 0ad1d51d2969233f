use std::collections::BTreeMap;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::shared::ASN;

/// JSON form of a topology as exchanged with the simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// `[provider, customer]`
    #[serde(default)]
    pub cp_links: Vec<[ASN; 2]>,
    #[serde(default)]
    pub peer_links: Vec<[ASN; 2]>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_level_map: BTreeMap<ASN, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation_ranks: Option<Vec<Vec<ASN>>>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub prefix: String,
    #[serde(default)]
    pub as_path: Vec<ASN>,
    #[serde(default)]
    pub seed_asn: Option<ASN>,
}

impl Announcement {
    pub fn new(prefix: &str, as_path: Vec<ASN>, seed_asn: Option<ASN>) -> Self {
        Announcement {
            prefix: prefix.to_string(),
            as_path,
            seed_asn,
        }
    }

    /// Last AS on the path, falling back to the seeding AS
    pub fn origin(&self) -> Option<ASN> {
        self.as_path.last().copied().or(self.seed_asn)
    }

    pub fn network(&self) -> Option<IpNetwork> {
        self.prefix.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ROA {
    pub prefix: String,
    #[serde(default)]
    pub origin: Option<ASN>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u8>,
}

impl ROA {
    pub fn new(prefix: &str, origin: ASN, max_length: Option<u8>) -> Self {
        ROA {
            prefix: prefix.to_string(),
            origin: Some(origin),
            max_length,
        }
    }
}

/// A full scenario: topology, roles, policies and announcement data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_modifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcements: Option<Vec<Announcement>>,
    /// `None` means no ROA data was supplied at all, which is not the same
    /// as an empty list when validating announcements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roas: Option<Vec<ROA>>,
    #[serde(default)]
    pub attacker_asns: Vec<ASN>,
    #[serde(default)]
    pub victim_asns: Vec<ASN>,
    #[serde(default)]
    pub asn_policy_map: BTreeMap<ASN, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation_rounds: Option<u32>,
    #[serde(default)]
    pub graph: Graph,
}

impl Config {
    pub fn new() -> Self {
        Config {
            name: String::new(),
            desc: String::new(),
            scenario: Some("customscenario".to_string()),
            scenario_modifier: None,
            announcements: Some(Vec::new()),
            roas: Some(Vec::new()),
            attacker_asns: Vec::new(),
            victim_asns: Vec::new(),
            asn_policy_map: BTreeMap::new(),
            propagation_rounds: None,
            graph: Graph::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    pub fn with_scenario(mut self, scenario: &str) -> Self {
        self.scenario = Some(scenario.to_string());
        self
    }

    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = graph;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

/// One row of an AS's local RIB as reported by the simulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRib {
    #[serde(rename = "type")]
    pub ann_type: String,
    pub mask: String,
    #[serde(default)]
    pub as_path: Vec<ASN>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResults {
    #[serde(default)]
    pub outcome: BTreeMap<ASN, u8>,
    #[serde(default)]
    pub local_ribs: BTreeMap<ASN, Vec<LocalRib>>,
}

impl SimulationResults {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
