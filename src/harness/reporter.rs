// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run report generation

use anyhow::Result;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::types::{RunReport, ScenarioResult, ScenarioStatus};

/// Run reporter
pub struct RunReporter;

impl RunReporter {
    /// Write JSON report
    pub fn write_json(report: &RunReport, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write Markdown report
    pub fn write_markdown(report: &RunReport, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, Self::render_markdown(report))?;
        Ok(())
    }

    pub fn render_markdown(report: &RunReport) -> String {
        let mut md = String::new();

        md.push_str("# Feature Class to JSON Regression Report\n\n");
        md.push_str(&format!("**Generated:** {}\n\n", report.timestamp));
        md.push_str(&format!("**Tool:** `{}`\n\n", report.tool));
        md.push_str("---\n\n");

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Total Scenarios:** {}\n", report.total));
        md.push_str(&format!(
            "- **Passed:** {} ({:.1}%)\n",
            report.passed,
            report.pass_rate()
        ));
        md.push_str(&format!("- **Failed:** {}\n", report.failed));
        md.push_str(&format!("- **Errors:** {}\n", report.errors));
        md.push_str(&format!("- **Skipped:** {}\n", report.skipped));
        md.push_str(&format!(
            "- **Total Duration:** {:.2}s\n\n",
            report.duration.as_secs_f64()
        ));
        md.push_str("---\n\n");

        md.push_str("## Scenarios\n\n");
        md.push_str("| Scenario | Status | Severity | Duration |\n");
        md.push_str("|----------|--------|----------|----------|\n");
        for result in &report.results {
            md.push_str(&format!(
                "| `{}` | {} | {} | {:.2}s |\n",
                result.name,
                result.status.as_str(),
                result
                    .severity
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                result.duration.as_secs_f64()
            ));
        }
        md.push('\n');

        if report.has_failures() {
            md.push_str("## Failures\n\n");
            for result in report.failures() {
                md.push_str(&format!("### {}\n\n", result.name));
                md.push_str(&format!("- Base: `{}`\n", result.base.display()));
                md.push_str(&format!("- Output: `{}`\n", result.output.display()));
                if let Some(ref diff) = result.diff_report {
                    md.push_str(&format!("- Diff report: `{}`\n", diff.display()));
                }
                if let Some(ref err) = result.error {
                    md.push_str("- Error:\n\n```text\n");
                    md.push_str(err);
                    md.push_str("\n```\n");
                }
                md.push('\n');
            }
        }

        md
    }

    /// Print terminal summary
    pub fn print_summary(report: &RunReport) {
        Self::print_summary_with_verbose(report, false)
    }

    /// Print terminal summary with optional verbose mode
    pub fn print_summary_with_verbose(report: &RunReport, verbose: bool) {
        println!("\n{}", "═".repeat(80).white());
        println!("{}", "Regression Report".bold());
        println!("{}", "═".repeat(80).white());
        println!("  {} {}", "Timestamp:".white(), report.timestamp.cyan());
        println!("  {} {}", "Tool:".white(), report.tool.cyan());
        println!("  {} {}", "Scenarios:".white(), report.total.to_string().cyan());
        println!(
            "  {} {} ({:.1}%)",
            "Passed:".white(),
            report.passed.to_string().green(),
            report.pass_rate()
        );
        println!(
            "  {} {}",
            "Failed:".white(),
            if report.failed > 0 {
                report.failed.to_string().red()
            } else {
                report.failed.to_string().green()
            }
        );
        println!(
            "  {} {}",
            "Errors:".white(),
            if report.errors > 0 {
                report.errors.to_string().red()
            } else {
                report.errors.to_string().green()
            }
        );
        println!(
            "  {} {}",
            "Skipped:".white(),
            report.skipped.to_string().yellow()
        );
        println!(
            "  {} {:.2}s",
            "Duration:".white(),
            report.duration.as_secs_f64()
        );

        println!("\n{}", "Scenarios".bold());
        println!("{}", "─".repeat(80).white());
        for result in &report.results {
            let icon = match result.status {
                ScenarioStatus::Passed => "✓".green(),
                ScenarioStatus::Skipped => "-".yellow(),
                ScenarioStatus::Failed | ScenarioStatus::Error => "✗".red(),
            };
            println!(
                "  {} {} ({:.2}s)",
                icon,
                result.name.cyan(),
                result.duration.as_secs_f64()
            );
        }

        if report.has_failures() {
            println!("\n{}", "Failed Scenarios".red().bold());
            println!("{}", "─".repeat(80).white());
            for result in report.failures() {
                Self::print_failure_details(result, verbose);
            }
        }

        println!("{}", "═".repeat(80).white());
    }

    fn print_failure_details(result: &ScenarioResult, verbose: bool) {
        println!("\n  {} {}", "❌".red(), result.name.bold());
        println!("     {}: {:?}", "Status".white(), result.status);
        if let Some(severity) = result.severity {
            println!("     {}: {}", "Severity".white(), severity);
        }
        if let Some(ref diff) = result.diff_report {
            println!("     {}: {}", "Diff Report".white(), diff.display());
        }
        if let Some(ref err) = result.error {
            println!("     {}:", "Error".red().bold());
            for line in err.lines() {
                println!("       {}", line.white());
            }
        }
        if verbose {
            println!("     {}: {}", "Base".white(), result.base.display());
            println!("     {}: {}", "Output".white(), result.output.display());
            if let (Some(base), Some(output)) = (&result.base_sha256, &result.output_sha256) {
                println!("     {}: {}", "Base SHA-256".white(), base);
                println!("     {}: {}", "Output SHA-256".white(), output);
            }
            for message in &result.tool_messages {
                println!("       {}", message.white());
            }
        }
    }

    /// Diff reports present in `dir`, sorted by path
    pub fn diff_reports_in(dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Vec::new();
        }

        let mut reports: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with("_diff.html"))
            .map(|e| e.path().to_path_buf())
            .collect();
        reports.sort();
        reports
    }
}
