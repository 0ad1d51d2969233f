use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ASN = u32;

/// Policy tag used for any AS without an explicit entry in the policy map
pub const DEFAULT_POLICY: &str = "bgp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Relationships {
    Providers = 1,
    Peers = 2,
    Customers = 3,
}

impl Relationships {
    pub fn invert(&self) -> Self {
        match self {
            Relationships::Providers => Relationships::Customers,
            Relationships::Customers => Relationships::Providers,
            Relationships::Peers => Relationships::Peers,
        }
    }

    pub fn link_kind(&self) -> LinkKind {
        match self {
            Relationships::Peers => LinkKind::Peer,
            Relationships::Providers | Relationships::Customers => LinkKind::CustomerProvider,
        }
    }
}

impl fmt::Display for Relationships {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationships::Providers => "PROVIDERS",
            Relationships::Peers => "PEERS",
            Relationships::Customers => "CUSTOMERS",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    CustomerProvider,
    Peer,
}

impl LinkKind {
    pub fn toggled(&self) -> Self {
        match self {
            LinkKind::CustomerProvider => LinkKind::Peer,
            LinkKind::Peer => LinkKind::CustomerProvider,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkKind::CustomerProvider => "customer-provider",
            LinkKind::Peer => "peer",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LinkKind {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer-provider" | "cp" | "provider-customer" => Ok(LinkKind::CustomerProvider),
            "peer" | "peer-to-peer" | "p2p" => Ok(LinkKind::Peer),
            _ => Err(ParseLabelError::new("link kind", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ASRole {
    #[default]
    None,
    Victim,
    Attacker,
}

impl fmt::Display for ASRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ASRole::None => "none",
            ASRole::Victim => "victim",
            ASRole::Attacker => "attacker",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ASRole {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ASRole::None),
            "victim" => Ok(ASRole::Victim),
            "attacker" => Ok(ASRole::Attacker),
            _ => Err(ParseLabelError::new("role", s)),
        }
    }
}

/// Validity labels returned by the ROA validation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ROAValidity {
    Valid = 0,
    Unknown = 1,
    InvalidLength = 2,
    InvalidOrigin = 3,
    InvalidLengthAndOrigin = 4,
}

impl ROAValidity {
    /// Accepts the service's labels regardless of case and separators,
    /// e.g. `VALID`, `Valid`, `INVALID_LENGTH`, `Invalid Length`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "valid" => Some(ROAValidity::Valid),
            "unknown" => Some(ROAValidity::Unknown),
            "invalidlength" => Some(ROAValidity::InvalidLength),
            "invalidorigin" => Some(ROAValidity::InvalidOrigin),
            "invalidlengthandorigin" => Some(ROAValidity::InvalidLengthAndOrigin),
            _ => None,
        }
    }
}

impl fmt::Display for ROAValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ROAValidity::Valid => "Valid",
            ROAValidity::Unknown => "Unknown",
            ROAValidity::InvalidLength => "Invalid Length",
            ROAValidity::InvalidOrigin => "Invalid Origin",
            ROAValidity::InvalidLengthAndOrigin => "Invalid Length and Origin",
        };
        write!(f, "{}", s)
    }
}

/// Per-AS outcome codes reported by the simulation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Outcomes {
    AttackerSuccess = 0,
    VictimSuccess = 1,
    DisconnectedOrigin = 2,
    DisconnectedAttacker = 3,
    DisconnectedVictim = 4,
    DisconnectedNotAsSomehow = 5,
    HijackedSamePath = 6,
    HijackedButBlackholed = 7,
    HijackedButNotDetected = 8,
}

impl Outcomes {
    pub fn from_code(code: u8) -> Option<Self> {
        let outcome = match code {
            0 => Outcomes::AttackerSuccess,
            1 => Outcomes::VictimSuccess,
            2 => Outcomes::DisconnectedOrigin,
            3 => Outcomes::DisconnectedAttacker,
            4 => Outcomes::DisconnectedVictim,
            5 => Outcomes::DisconnectedNotAsSomehow,
            6 => Outcomes::HijackedSamePath,
            7 => Outcomes::HijackedButBlackholed,
            8 => Outcomes::HijackedButNotDetected,
            _ => return None,
        };
        Some(outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonASNs;

impl CommonASNs {
    pub const ATTACKER: u32 = 666;
    pub const VICTIM: u32 = 777;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Customer-provider cycle detected in AS graph at AS {asn}")]
pub struct CycleError {
    pub asn: ASN,
}

/// Errors returned by topology edits. A failed edit never changes the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("AS {0} does not exist")]
    NotFound(ASN),
    #[error("No link exists between AS {0} and AS {1}")]
    LinkNotFound(ASN, ASN),
    #[error("AS {0} already exists")]
    Conflict(ASN),
    #[error("A link already exists between AS {0} and AS {1}")]
    LinkConflict(ASN, ASN),
    #[error("AS {0} cannot be linked to itself")]
    SelfLink(ASN),
    #[error("0 is not a valid ASN")]
    InvalidAsn,
    #[error("Level of AS {0} must be at least 1")]
    InvalidLevel(ASN),
    #[error("AS {0} cannot be both a victim and an attacker")]
    RoleConflict(ASN),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value:?}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        ParseLabelError {
            kind,
            value: value.to_string(),
        }
    }
}
