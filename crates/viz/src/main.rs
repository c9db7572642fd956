//! Agent Viewport
//!
//! Run with: cargo run -p viz
//!
//! Examples:
//!   cargo run -p viz -- --state output/current_state.json
//!   cargo run -p viz -- --config viewport.toml --mode religious

use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use viewport::{RenderMode, ViewportConfig};
use viz::{ViewerPlugin, ViewerSettings};

/// Interactive viewer for agent simulation snapshots
#[derive(Parser, Debug)]
#[command(name = "viz")]
#[command(about = "Pan, zoom and inspect a running agent simulation")]
struct Args {
    /// Snapshot file written by the simulation
    #[arg(long, default_value = "output/current_state.json")]
    state: PathBuf,

    /// File control commands are appended to
    #[arg(long, default_value = "output/commands.jsonl")]
    commands: PathBuf,

    /// TOML file with camera, pointer and render settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial render mode (terrain, political, religious)
    #[arg(long, default_value = "terrain")]
    mode: RenderMode,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720.0)]
    height: f32,
}

fn load_config(path: Option<&PathBuf>) -> ViewportConfig {
    let Some(path) = path else {
        return ViewportConfig::default();
    };
    match ViewportConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {:?}: {}, using defaults", path, e);
            ViewportConfig::default()
        }
    }
}

fn main() {
    let args = Args::parse();

    let settings = ViewerSettings {
        config: load_config(args.config.as_ref()),
        state_path: args.state,
        commands_path: args.commands,
        mode: args.mode,
        window_size: Vec2::new(args.width, args.height),
    };

    App::new()
        .insert_resource(settings)
        .add_plugins(ViewerPlugin)
        .run();
}
