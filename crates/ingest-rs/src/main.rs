//! `ingest`: inspect the settings an agent would run with.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ingest_rs::report::{self, ValueType};
use ingest_rs::settings::{EnvSource, PropertyTable, Resolver, ResolverOptions};
use log::{debug, info};
use std::path::PathBuf;

/// Command-line options for the settings inspector.
#[derive(Parser)]
#[command(name = "ingest", version)]
struct Cli {
    /// Settings file that must exist (overrides NEW_RELIC_CONFIG_FILE)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// YAML environment section overlaid onto `common`
    #[arg(long = "env", global = true)]
    environment: Option<String>,
    /// Process property as name=value; repeatable
    #[arg(short = 'D', long = "property", global = true, value_name = "NAME=VALUE")]
    properties: Vec<String>,
    /// Ignore the live process environment
    #[arg(long, global = true)]
    no_process_env: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every effective setting with the layer that supplied it
    Show {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Print secret values unmasked
        #[arg(long)]
        reveal: bool,
    },
    /// Print one setting coerced to a type
    Get {
        /// Setting key, e.g. transaction_events.max_samples_stored
        key: String,
        /// Target type
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        ty: ValueType,
    },
    /// Load every layer and report dropped keys
    Check,
}

fn main() -> anyhow::Result<()> {
    ingest_rs::init_logging();
    let cli = Cli::parse();
    info!(
        "resolving settings (config_set={}, env_set={}, properties={})",
        cli.config.is_some(),
        cli.environment.is_some(),
        cli.properties.len()
    );

    let options = build_options(&cli)?;
    let resolution = Resolver::new(options)
        .resolve()
        .context("failed to resolve settings")?;
    debug!("resolved {} settings", resolution.config.len());

    match cli.command {
        Command::Show { json, reveal } => {
            let entries = report::show_entries(&resolution.config, reveal);
            if json {
                println!("{}", report::render_json(&entries)?);
            } else {
                print!("{}", report::render_text(&entries));
            }
        }
        Command::Get { key, ty } => {
            match report::typed_value(&resolution.config, &key, ty)
                .with_context(|| format!("failed to read {key}"))?
            {
                Some(value) => println!("{value}"),
                None => bail!("setting {key} is not set in any layer"),
            }
        }
        Command::Check => {
            let (text, dropped) = report::render_check(&resolution.layers);
            print!("{text}");
            if dropped > 0 {
                bail!("{dropped} key(s) were dropped");
            }
        }
    }
    Ok(())
}

fn build_options(cli: &Cli) -> anyhow::Result<ResolverOptions> {
    let mut properties = PropertyTable::new();
    for assignment in &cli.properties {
        properties
            .insert_assignment(assignment)
            .with_context(|| format!("invalid --property {assignment}"))?;
    }
    let env = if cli.no_process_env {
        EnvSource::fixed(Vec::<(String, String)>::new())
    } else {
        EnvSource::Process
    };

    let cwd = std::env::current_dir().context("cwd")?;
    let mut options = ResolverOptions::discover(&cwd, properties, env);
    if let Some(path) = &cli.config {
        options = options.with_config_file(path);
    }
    if let Some(name) = &cli.environment {
        options = options.with_environment(name.clone());
    }
    Ok(options)
}
