//! Command-line driver: `glue-codegen --generate-mono-glue <DIR> [--api <FILE>]`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use glue_codegen::{BindingsGenerator, ClassDb, API_SOLUTION_NAME};
use tracing_subscriber::EnvFilter;

const GENERATE_ALL_GLUE_OPTION: &str = "--generate-mono-glue";
const DEFAULT_SNAPSHOT: &str = "api_snapshot.json";

#[derive(Parser)]
#[command(name = "glue-codegen")]
#[command(about = "Generate the C# glue sources from a ClassDB snapshot", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to '{GODOT_ROOT}/modules/mono/glue'
    #[arg(long = "generate-mono-glue", value_name = "DIR", num_args = 0..=1)]
    generate_mono_glue: Option<Option<PathBuf>>,

    /// Reflection snapshot, a JSON file or a directory of them
    #[arg(long, value_name = "FILE")]
    api: Option<PathBuf>,
}

fn load_snapshot(path: &Path) -> anyhow::Result<ClassDb> {
    let db = if path.is_dir() {
        ClassDb::load_dir(path)
    } else {
        ClassDb::load(path)
    };
    db.with_context(|| format!("failed to load reflection snapshot '{}'", path.display()))
}

fn generate(glue_dir: &Path, api: Option<&Path>) -> anyhow::Result<()> {
    let snapshot = api.map_or_else(|| glue_dir.join(DEFAULT_SNAPSHOT), Path::to_path_buf);
    let db = load_snapshot(&snapshot)?;

    BindingsGenerator::new()
        .write_cs_api(&db, glue_dir.join(API_SOLUTION_NAME))
        .with_context(|| format!("{GENERATE_ALL_GLUE_OPTION}: Failed to generate the C# API."))
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("GLUE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let glue_dir = match cli.generate_mono_glue {
        None => return ExitCode::SUCCESS,
        Some(None) => {
            tracing::error!(
                "{GENERATE_ALL_GLUE_OPTION}: No output directory specified (expected path to '{{GODOT_ROOT}}/modules/mono/glue')."
            );
            return ExitCode::FAILURE;
        }
        Some(Some(dir)) => dir,
    };

    match generate(&glue_dir, cli.api.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
