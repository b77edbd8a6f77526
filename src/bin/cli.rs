// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature Class to JSON regression harness CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use fcjson_harness::harness::{HarnessConfig, RunReporter, ScenarioRunner, CONFIG_FILE};
use fcjson_harness::{compare, HarnessError};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fcjson-harness")]
#[command(about = "Regression harness for the Feature Class to JSON tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an output file against its reference copy
    Compare {
        /// Reference (base) file
        base: PathBuf,

        /// File produced by the tool
        output: PathBuf,
    },

    /// Run the regression scenarios
    Run {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Only run scenarios whose name contains this text (repeatable)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Override the output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Run scenarios in parallel
        #[arg(long)]
        parallel: bool,

        /// Stop after the first failing scenario
        #[arg(long)]
        fail_fast: bool,

        /// Directory for run_report.json and run_report.md
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    /// List the configured scenarios
    List {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },

    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compare { base, output } => compare_command(base, output),
        Commands::Run {
            config,
            filter,
            out,
            parallel,
            fail_fast,
            report_dir,
        } => {
            let config_path = config;
            let mut config = HarnessConfig::load_from(&config_path)?;
            if !filter.is_empty() {
                config.filters = filter;
            }
            if let Some(out) = out {
                config.out_dir = out;
            }
            config.parallel |= parallel;
            config.fail_fast |= fail_fast;
            run_command(config, config_path, report_dir, cli.verbose)
        }
        Commands::List { config } => list_command(config),
        Commands::InitConfig { path, force } => init_config_command(path, force),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn compare_command(base: PathBuf, output: PathBuf) -> Result<()> {
    match compare(base.as_path(), output.as_path()) {
        Ok(_) => {
            println!("{} Files are equal", "✓".green());
            Ok(())
        }
        Err(err @ HarnessError::Mismatch { .. }) | Err(err @ HarnessError::MissingFile { .. }) => {
            eprintln!("{} {}", "✗".red(), err);
            std::process::exit(1);
        }
        Err(err) => Err(anyhow::Error::new(err).context("Comparison could not be completed")),
    }
}

fn run_command(
    config: HarnessConfig,
    config_path: PathBuf,
    report_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let tool = config.tool.command_tool();
    if !tool.is_available() {
        eprintln!(
            "{} '{}' could not be launched; scenarios will report errors",
            "Warning:".yellow(),
            tool.program()
        );
    }

    let report_dir = report_dir.unwrap_or_else(|| config.out_dir.clone());
    let out_dir = config.out_dir.clone();
    let runner = ScenarioRunner::new(tool, config).with_config_path(config_path);
    let total = runner.config().selected_scenarios().len();

    if verbose {
        println!("{}", "Starting regression run...".bold());
        println!("Running {} scenarios", total);
    }

    let progress = if verbose {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let report = runner.run_with_progress(|result| {
        if let Some(ref pb) = progress {
            pb.set_message(result.name.clone());
            pb.inc(1);
        }
    })?;

    if let Some(pb) = progress {
        pb.finish_with_message("Run complete");
    }

    std::fs::create_dir_all(&report_dir)
        .with_context(|| format!("Failed to create report directory: {:?}", report_dir))?;
    RunReporter::write_json(&report, report_dir.join("run_report.json"))?;
    RunReporter::write_markdown(&report, report_dir.join("run_report.md"))?;

    RunReporter::print_summary_with_verbose(&report, verbose);

    let diff_reports = RunReporter::diff_reports_in(&out_dir);
    if !diff_reports.is_empty() {
        println!(
            "{} {} diff report(s) in {}",
            "Note:".yellow(),
            diff_reports.len(),
            out_dir.display()
        );
        if verbose {
            for path in &diff_reports {
                println!("  {}", path.display());
            }
        }
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn list_command(config: PathBuf) -> Result<()> {
    let config = HarnessConfig::load_from(&config)?;

    println!("{}", "Scenarios".bold());
    println!("{}", "─".repeat(80).white());
    for scenario in config.scenarios() {
        let attributes = scenario
            .export_attributes
            .as_ref()
            .map(|a| a.join(";"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {} [{}] attributes: {}",
            scenario.name.cyan(),
            scenario.json_file_name(),
            scenario.structure,
            attributes
        );
        if !scenario.description.is_empty() {
            println!("      {}", scenario.description.white());
        }
    }

    Ok(())
}

fn init_config_command(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to replace it)", path.display());
    }

    let config = HarnessConfig {
        scenarios: fcjson_harness::harness::default_scenarios(),
        ..HarnessConfig::default()
    };
    config.save(&path)?;
    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
