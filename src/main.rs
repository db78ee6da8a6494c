//! webmin-buildsrc - Webmin Debian package source maintenance
//!
//! Tracks upstream Webmin releases and rebuilds the package source tree:
//! - Checks for and resolves upstream versions
//! - Downloads and verifies the release archives
//! - Splits modules and themes into their own packages
//! - Regenerates debian/control

use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use std::process::ExitCode;
use webmin_buildsrc::cli::{CliArgs, Command};
use webmin_buildsrc::config::{Config, Layout};
use webmin_buildsrc::orchestrator::{Orchestrator, Services, UpdateOutcome};

/// Exit code of `check` when the source is already up to date
const EXIT_UP_TO_DATE: u8 = 100;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    env_logger::init_from_env(Env::default().default_filter_or(args.log_level()));

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let layout = Layout::new(&args.root);
    let mut config = Config::load(&args.config_path())?;
    if args.include_prereleases() {
        config.stable_only = false;
    }

    let services = Services::system(&layout, &config)?;
    let mut orchestrator =
        Orchestrator::new(layout, config, args.force, services).with_progress(!args.quiet);

    match args.command {
        Command::Latest { .. } => {
            println!("{}", orchestrator.latest_version()?);
        }
        Command::Versions { .. } => {
            for version in orchestrator.remote_versions()? {
                println!("{}", version);
            }
        }
        Command::Check => {
            let status = orchestrator.check()?;
            if !args.quiet {
                let label = if status.is_available() {
                    "Update available:".green().bold()
                } else {
                    "Up to date:".bold()
                };
                println!("{} {}", label, status.version());
            }
            return Ok(if status.is_available() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_UP_TO_DATE)
            });
        }
        Command::Update {
            version,
            no_control,
        } => {
            let outcome = orchestrator.update(&version).await?;
            if let UpdateOutcome::Updated {
                ref previous,
                ref version,
                ref plugins,
                ..
            } = outcome
            {
                if !no_control {
                    orchestrator.write_control(plugins)?;
                }
                if !args.quiet {
                    println!(
                        "{} {} -> {} ({} modules, {} themes)",
                        "Updated:".green().bold(),
                        previous,
                        version,
                        plugins.modules.len().to_string().green(),
                        plugins.themes.len().to_string().green()
                    );
                }
            }
        }
        Command::Control {
            full,
            minimal,
            version,
            skip_validation,
        } => {
            let version = version.unwrap_or_default();
            let plugins = orchestrator.load_trees(&full, &minimal, &version, skip_validation)?;
            orchestrator.write_control(&plugins)?;
            if !args.quiet {
                println!(
                    "{} {}",
                    "Wrote".green().bold(),
                    orchestrator.layout().control_file.display()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
