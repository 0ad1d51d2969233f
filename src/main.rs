use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use bgpsimulator_editor::commands::EditCommand;
use bgpsimulator_editor::render::{node_views, NodeView};
use bgpsimulator_editor::{
    ASRole, Announcement, CommonASNs, Config, EditorSettings, Graph, RoaClient,
    SimulationResults, TopologyEditor, ROA,
};

/// Edit a BGP simulator topology and print its hierarchy layout
#[derive(Debug, Parser)]
#[command(name = "bgpsimulator_editor", version)]
struct Args {
    /// Config JSON to load; a small subprefix hijack topology is used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Edits applied in order, e.g. `--edit "link 1 2 cp"`
    #[arg(short, long = "edit")]
    edits: Vec<String>,

    /// Simulation results JSON to show next to each AS
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Write the edited config here instead of only printing the layout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ask the simulator API for the ROA validity of each announcement
    #[arg(long)]
    validate_roas: bool,

    /// Settings file; defaults to the per-user config directory
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => Config::from_json(&fs::read_to_string(path)?)?,
        None => subprefix_hijack_config(),
    };
    let mut editor = TopologyEditor::from_config(&config)?;

    for edit in &args.edits {
        let command: EditCommand = edit.parse()?;
        command.apply(&mut editor)?;
        info!("Applied {:?}", edit);
    }

    let results = match &args.results {
        Some(path) => Some(SimulationResults::from_json(&fs::read_to_string(path)?)?),
        None => None,
    };

    let config = editor.to_config(&config);
    print_layout(&editor, results.as_ref());

    if args.validate_roas {
        let settings = EditorSettings::load_or_default(args.settings.as_deref())?;
        let client = RoaClient::new(&settings)?;
        println!("\nROA validity:");
        let announcements = config.announcements.as_deref().unwrap_or_default();
        for (ann, validity) in announcements.iter().zip(client.validate_config(&config)) {
            println!("  {:<20} {:?} -> {}", ann.prefix, ann.as_path, validity);
        }
    }

    if let Some(path) = &args.output {
        fs::write(path, config.to_json()?)?;
        println!("\nConfig written to {}", path.display());
    }

    Ok(())
}

fn print_layout(editor: &TopologyEditor, results: Option<&SimulationResults>) {
    let mut by_level: BTreeMap<u32, Vec<NodeView>> = BTreeMap::new();
    for view in node_views(editor, results) {
        by_level.entry(view.level).or_default().push(view);
    }
    for (level, views) in &by_level {
        println!("Level {}:", level);
        for view in views {
            let role = match view.role {
                ASRole::None => String::new(),
                role => format!(" [{}]", role),
            };
            println!("  AS {}{} ({})", view.label, role, view.policy_label);
            for row in &view.rib_rows {
                let marker = if row.is_attacker { "attacker" } else { "other" };
                println!("      {:<18} {:<20} {}", row.mask, row.as_path, marker);
            }
        }
    }
}

fn subprefix_hijack_config() -> Config {
    let mut config = Config::new()
        .with_name("Subprefix Hijack")
        .with_desc("BGP hidden hijack (with simple AS)")
        .with_scenario("SubprefixHijack")
        .with_graph(Graph {
            cp_links: vec![[1, 2], [2, CommonASNs::VICTIM], [3, CommonASNs::ATTACKER]],
            peer_links: vec![[2, 3]],
            ..Graph::default()
        });
    config.announcements = Some(vec![
        Announcement::new("1.2.0.0/16", vec![CommonASNs::VICTIM], Some(CommonASNs::VICTIM)),
        Announcement::new("1.2.0.0/24", vec![CommonASNs::ATTACKER], Some(CommonASNs::ATTACKER)),
    ]);
    config.roas = Some(vec![ROA::new("1.2.0.0/16", CommonASNs::VICTIM, None)]);
    config.attacker_asns = vec![CommonASNs::ATTACKER];
    config.victim_asns = vec![CommonASNs::VICTIM];
    config
}
