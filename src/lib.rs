// Re-export all public modules
pub mod shared;
pub mod as_graph;
pub mod propagation_rank;
pub mod editor;
pub mod selection;
pub mod config;
pub mod render;
pub mod roa_client;
pub mod settings;
pub mod commands;

// Re-export commonly used types at the crate root
pub use as_graph::{AS, ASGraph, ASN};
pub use editor::TopologyEditor;
pub use config::{Announcement, Config, Graph, SimulationResults, ROA};
pub use propagation_rank::{assign_levels, LevelMap};
pub use shared::{ASRole, CommonASNs, CycleError, LinkKind, Outcomes, ROAValidity, Relationships, TopologyError};
pub use roa_client::RoaClient;
pub use settings::EditorSettings;
