use std::str::FromStr;

use thiserror::Error;

use crate::editor::TopologyEditor;
use crate::shared::{ASRole, LinkKind, ParseLabelError, TopologyError, ASN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Empty edit command")]
    Empty,
    #[error("Unknown edit command {0:?}")]
    UnknownCommand(String),
    #[error("{command} expects: {usage}")]
    Usage {
        command: String,
        usage: &'static str,
    },
    #[error("Invalid ASN {0:?}")]
    InvalidAsn(String),
    #[error(transparent)]
    Label(#[from] ParseLabelError),
}

/// A single editor operation in its textual form, e.g. `link 1 2 cp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Add(ASN),
    Remove(ASN),
    Rename(ASN, ASN),
    Link(ASN, ASN, LinkKind),
    Unlink(ASN, ASN),
    Retype(ASN, ASN),
    Reverse(ASN, ASN),
    Role(ASN, ASRole),
    Policy(ASN, String),
    Level(ASN, Option<u32>),
}

impl EditCommand {
    pub fn apply(&self, editor: &mut TopologyEditor) -> Result<(), TopologyError> {
        match self {
            EditCommand::Add(asn) => editor.add_as(*asn),
            EditCommand::Remove(asn) => editor.remove_as(*asn),
            EditCommand::Rename(old, new) => editor.rename_as(*old, *new),
            EditCommand::Link(a, b, kind) => editor.add_link(*a, *b, *kind),
            EditCommand::Unlink(a, b) => editor.remove_link(*a, *b),
            EditCommand::Retype(a, b) => editor.retype_link(*a, *b),
            EditCommand::Reverse(a, b) => editor.reverse_provider_customer(*a, *b),
            EditCommand::Role(asn, role) => editor.set_role(*asn, *role),
            EditCommand::Policy(asn, policy) => editor.set_policy(*asn, policy),
            EditCommand::Level(asn, level) => editor.set_level(*asn, *level),
        }
    }
}

impl FromStr for EditCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let (&command, args) = words.split_first().ok_or(CommandParseError::Empty)?;
        let usage = |usage: &'static str| CommandParseError::Usage {
            command: command.to_string(),
            usage,
        };

        let parsed = match (command.to_ascii_lowercase().as_str(), args) {
            ("add", [asn]) => EditCommand::Add(parse_asn(asn)?),
            ("add", _) => return Err(usage("add <asn>")),
            ("remove", [asn]) => EditCommand::Remove(parse_asn(asn)?),
            ("remove", _) => return Err(usage("remove <asn>")),
            ("rename", [old, new]) => EditCommand::Rename(parse_asn(old)?, parse_asn(new)?),
            ("rename", _) => return Err(usage("rename <old asn> <new asn>")),
            ("link", [a, b, kind]) => EditCommand::Link(parse_asn(a)?, parse_asn(b)?, kind.parse()?),
            ("link", _) => return Err(usage("link <provider asn> <customer asn> cp|peer")),
            ("unlink", [a, b]) => EditCommand::Unlink(parse_asn(a)?, parse_asn(b)?),
            ("unlink", _) => return Err(usage("unlink <asn> <asn>")),
            ("retype", [a, b]) => EditCommand::Retype(parse_asn(a)?, parse_asn(b)?),
            ("retype", _) => return Err(usage("retype <asn> <asn>")),
            ("reverse", [a, b]) => EditCommand::Reverse(parse_asn(a)?, parse_asn(b)?),
            ("reverse", _) => return Err(usage("reverse <asn> <asn>")),
            ("role", [asn, role]) => EditCommand::Role(parse_asn(asn)?, role.parse()?),
            ("role", _) => return Err(usage("role <asn> victim|attacker|none")),
            ("policy", [asn, policy]) => EditCommand::Policy(parse_asn(asn)?, policy.to_string()),
            ("policy", _) => return Err(usage("policy <asn> <policy>")),
            ("level", [asn, level]) => {
                let level = match *level {
                    "none" => None,
                    level => Some(level.parse().map_err(|_| usage("level <asn> <level>|none"))?),
                };
                EditCommand::Level(parse_asn(asn)?, level)
            }
            ("level", _) => return Err(usage("level <asn> <level>|none")),
            _ => return Err(CommandParseError::UnknownCommand(command.to_string())),
        };
        Ok(parsed)
    }
}

fn parse_asn(s: &str) -> Result<ASN, CommandParseError> {
    s.trim_start_matches("AS")
        .parse()
        .map_err(|_| CommandParseError::InvalidAsn(s.to_string()))
}
