use anyhow::Result;
use clap::Parser;
use composable_app::dev::DevSystem;
use composable_app::{Engine, EngineConfig, SystemCatalog, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "composable-app")]
#[command(about = "Compose an application from pluggable systems")]
struct Cli {
    /// Engine configuration file (.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Print verbose diagnostics
    #[arg(long, short)]
    verbose: bool,

    /// Application root directory, overrides `app.root`
    #[arg(long)]
    app_root: Option<PathBuf>,

    /// Mode to run in, overrides `mode`
    #[arg(long, short)]
    mode: Option<String>,

    /// Arguments handed to the entry command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(root) = cli.app_root {
        config.app.root = root;
    }
    if cli.mode.is_some() {
        config.mode = cli.mode;
    }

    logging::init(config.verbose);

    let mut catalog = SystemCatalog::new();
    catalog.register("dev", DevSystem::factory(config.lib_dir().join("dev_system")));

    let declare_dev = config.systems.is_empty();
    let mut engine = Engine::new(config, catalog);
    if declare_dev {
        engine.declare("dev")?;
    }
    engine.run(&cli.args)?;

    Ok(())
}
