mod args;

use args::{Args, Command};
use clap::Parser;
use modular::config::ConfigLoader;
use modular::demo;
use modular::errors::AppError;
use modular::tools::ModuleInspector;
use std::path::PathBuf;

fn main() -> Result<(), AppError> {
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Run => demo::run_app()?,
        Command::Inspect {
            config,
            ignore,
            json,
            deny_warnings,
        } => handle_inspect(config, ignore, json, deny_warnings)?,
    }

    Ok(())
}

fn handle_inspect(
    config_path: Option<PathBuf>,
    ignore: Vec<String>,
    json: bool,
    deny_warnings: bool,
) -> Result<(), AppError> {
    let loader = ConfigLoader::new();
    let mut config = match &config_path {
        Some(path) => loader.load_from_path(path)?,
        None => loader.load()?,
    }
    .with_ignored(ignore);
    config.deny_warnings |= deny_warnings;
    config.validate()?;

    let report = ModuleInspector::from_config(&config).inspect(&demo::build_app());

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        for error in &report.errors {
            println!("❌ {error}");
        }
        for warning in &report.warnings {
            println!("⚠️  {warning}");
        }
        if report.is_clean() {
            println!("✅ 未发现问题");
        }
    }

    report.ensure_valid(config.deny_warnings)
}
