use crate::config::SimulationResults;
use crate::editor::TopologyEditor;
use crate::shared::{ASRole, Outcomes, ASN};

/// Everything the drawing layer needs to know about one AS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub asn: ASN,
    pub level: u32,
    pub role: ASRole,
    pub policy: String,
    pub policy_label: String,
    pub label: String,
    pub outcome: Option<Outcomes>,
    pub rib_rows: Vec<RibRow>,
}

/// A local RIB entry formatted for the table drawn next to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibRow {
    pub mask: String,
    pub as_path: String,
    pub is_attacker: bool,
}

/// Node views in ascending ASN order
pub fn node_views(editor: &TopologyEditor, results: Option<&SimulationResults>) -> Vec<NodeView> {
    editor
        .graph()
        .iter()
        .map(|as_obj| {
            let outcome = results
                .and_then(|results| results.outcome.get(&as_obj.asn))
                .and_then(|&code| Outcomes::from_code(code));
            NodeView {
                asn: as_obj.asn,
                level: editor.level_of(as_obj.asn).unwrap_or(1),
                role: as_obj.role,
                policy: as_obj.policy().to_string(),
                policy_label: policy_label(as_obj.policy.as_deref()),
                label: as_obj.asn.to_string(),
                outcome,
                rib_rows: local_rib_rows(results, as_obj.asn),
            }
        })
        .collect()
}

pub fn local_rib_rows(results: Option<&SimulationResults>, asn: ASN) -> Vec<RibRow> {
    let Some(ribs) = results.and_then(|results| results.local_ribs.get(&asn)) else {
        return Vec::new();
    };
    ribs.iter()
        .map(|rib| RibRow {
            mask: rib.mask.clone(),
            as_path: rib
                .as_path
                .iter()
                .map(|asn| asn.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            is_attacker: rib.ann_type == "attacker",
        })
        .collect()
}

/// Display name of a policy tag; no tag means plain BGP.
pub fn policy_label(policy: Option<&str>) -> String {
    let Some(policy) = policy else {
        return "BGP".to_string();
    };
    let policy = policy.to_lowercase();
    match policy.as_str() {
        "bgp" => "BGP".to_string(),
        "rov" | "aspa" | "otc" | "aspa+rov" => policy.to_uppercase(),
        "pathend" => "Pathend".to_string(),
        "path-end" => "Path-End".to_string(),
        "bgpsec" => "BGPSec".to_string(),
        _ => policy,
    }
}
