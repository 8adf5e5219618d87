//! `semmap` – SemMap command line interface.
//!
//! Builds one 3-D scene description from an occupancy map and a detection
//! graph and writes it as JSON.
//!
//! 1. Reads `semmap.toml` (or the path given as the first argument); falls
//!    back to defaults plus `SEMMAP_*` overrides when the file is absent.
//! 2. Runs the scene pipeline over the configured map and graph.
//! 3. Writes the scene to `output`, or to stdout when no output is set.
//! 4. Prints a short summary to stderr.
//!
//! `semmap --schema` prints the JSON schema of the scene document instead.

mod config;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use semmap_scene::{JsonSceneAdapter, RenderingAdapter, SceneDescription, ScenePipeline};
use tracing::{info, warn};

use crate::config::Config;

fn main() -> ExitCode {
    semmap_scene::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    if args.iter().any(|a| a == "--schema") {
        return match serde_json::to_string_pretty(&SceneDescription::json_schema()) {
            Ok(schema) => {
                println!("{schema}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(&format!("could not render schema: {e}")),
        };
    }

    let config_path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);

    match run(&config_path) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// What the run produced, for the stderr summary.
struct RunSummary {
    scene: SceneDescription,
    destination: String,
}

fn run(config_path: &Path) -> Result<RunSummary, String> {
    let cfg = match config::load_from(config_path)? {
        Some(cfg) => {
            info!(path = %config_path.display(), preset = %cfg.preset, "config loaded");
            cfg
        }
        None => {
            warn!(path = %config_path.display(), "config file not found, using defaults");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    let palette = cfg.load_palette().map_err(|e| e.to_string())?;
    let pipeline = ScenePipeline::new(cfg.scene_config(), palette)
        .map_err(|e| format!("config error: {e}"))?;
    let scene = pipeline
        .run_files(&cfg.pipeline_inputs())
        .map_err(|e| e.to_string())?;

    let destination = match &cfg.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
            JsonSceneAdapter::new(BufWriter::new(file))
                .render(&scene)
                .map_err(|e| e.to_string())?;
            path.display().to_string()
        }
        None => {
            JsonSceneAdapter::new(io::stdout().lock())
                .render(&scene)
                .map_err(|e| e.to_string())?;
            "stdout".to_string()
        }
    };

    Ok(RunSummary { scene, destination })
}

fn fail(message: &str) -> ExitCode {
    eprintln!("{} {}", "error:".red().bold(), message);
    ExitCode::FAILURE
}

fn print_summary(summary: &RunSummary) {
    let scene = &summary.scene;
    eprintln!(
        "{} scene written to {}",
        "✓".green().bold(),
        summary.destination.cyan()
    );
    eprintln!(
        "  {} obstacle points, {} categories, {} edges",
        scene.obstacles.points.len().to_string().bold(),
        scene.categories.len().to_string().bold(),
        scene.edge_count().to_string().bold()
    );
    for category in &scene.categories {
        let members = category.clusters.first().map_or(0, |c| c.points.len());
        eprintln!(
            "    {:<20} {:>4} detections  {}",
            category.label,
            members,
            category.color.dimmed()
        );
    }
}

fn print_usage() {
    eprintln!("{}", "semmap – semantic occupancy scene builder".bold());
    eprintln!();
    eprintln!("  {}  build a scene using CONFIG (default ./semmap.toml)", "semmap [CONFIG]".cyan());
    eprintln!("  {}   print the scene JSON schema", "semmap --schema".cyan());
    eprintln!();
    eprintln!("Environment: SEMMAP_MAP_YAML, SEMMAP_GRAPH, SEMMAP_OUTPUT, SEMMAP_PRESET,");
    eprintln!("             RUST_LOG, SEMMAP_LOG_FORMAT=json");
}
