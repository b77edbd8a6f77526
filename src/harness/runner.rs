// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scenario runner - executes the tool and checks its output

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::config::{HarnessConfig, CONFIG_FILE};
use super::scenario::Scenario;
use super::types::{RunReport, ScenarioResult, ScenarioStatus};
use crate::compare::{compare, FileHandle};
use crate::error::{HarnessError, Result};
use crate::tool::{ConversionTool, ToolRequest};

/// Runs regression scenarios against a conversion tool
pub struct ScenarioRunner<T: ConversionTool> {
    tool: T,
    config: HarnessConfig,
    config_path: PathBuf,
}

impl<T: ConversionTool> ScenarioRunner<T> {
    pub fn new(tool: T, config: HarnessConfig) -> Self {
        Self {
            tool,
            config,
            config_path: PathBuf::from(CONFIG_FILE),
        }
    }

    /// File the configuration was loaded from, named in validation errors
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Create the output directory if it is missing
    pub fn prepare(&self) -> Result<()> {
        if !self.config.out_dir.exists() {
            fs::create_dir_all(&self.config.out_dir)
                .map_err(|e| HarnessError::io(&self.config.out_dir, e))?;
            debug!(dir = %self.config.out_dir.display(), "created output directory");
        }
        Ok(())
    }

    /// Run every selected scenario
    pub fn run_all(&self) -> Result<RunReport> {
        self.run_with_progress(|_| {})
    }

    /// Run every selected scenario, calling `on_done` as each one finishes
    pub fn run_with_progress<F>(&self, on_done: F) -> Result<RunReport>
    where
        F: Fn(&ScenarioResult) + Sync,
    {
        self.config.validate(&self.config_path)?;
        self.prepare()?;

        let start = Instant::now();
        let scenarios = self.config.selected_scenarios();
        info!(
            count = scenarios.len(),
            parallel = self.config.parallel,
            "running scenarios"
        );

        let stop = AtomicBool::new(false);
        let run_one = |scenario: &Scenario| {
            let result = if self.config.fail_fast && stop.load(Ordering::Relaxed) {
                ScenarioResult::skipped(
                    &scenario.name,
                    &self.config.base_path(scenario),
                    &self.config.output_path(scenario),
                    "Skipped after an earlier failure",
                )
            } else {
                self.run_scenario(scenario)
            };
            if result.is_failure() {
                stop.store(true, Ordering::Relaxed);
            }
            on_done(&result);
            result
        };

        let results: Vec<ScenarioResult> = if self.config.parallel {
            scenarios.par_iter().map(run_one).collect()
        } else {
            scenarios.iter().map(run_one).collect()
        };

        let mut report = RunReport::new(self.tool.name());
        for result in results {
            report.add_result(result);
        }
        report.finish(start.elapsed());
        Ok(report)
    }

    /// Run one scenario: produce the output, require a clean severity, then compare
    pub fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        let base = self.config.base_path(scenario);
        let output = self.config.output_path(scenario);
        let mut result = ScenarioResult::new(&scenario.name, &base, &output);

        let request = ToolRequest {
            input: self.config.input_path(scenario),
            export_attributes: scenario.export_attributes.clone(),
            structure: scenario.structure,
            output: output.clone(),
            overwrite: self.config.overwrite_output,
        };

        match self.execute_and_compare(&request, &base, &mut result) {
            Ok(()) => {
                info!(scenario = %scenario.name, "passed");
            }
            Err(err) => {
                if let HarnessError::Mismatch { report } = &err {
                    result.diff_report = Some(report.clone());
                }
                result.status = status_for(&err);
                warn!(scenario = %scenario.name, status = result.status.as_str(), "{}", err);
                result.error = Some(err.to_string());
            }
        }

        result.base_sha256 = file_digest(&base);
        result.output_sha256 = file_digest(&output);
        result.duration = start.elapsed();
        result
    }

    fn execute_and_compare(
        &self,
        request: &ToolRequest,
        base: &Path,
        result: &mut ScenarioResult,
    ) -> Result<()> {
        let outcome = self.tool.execute(request)?;
        result.severity = Some(outcome.max_severity);
        result.tool_messages = outcome.message_list().to_vec();

        if !outcome.succeeded() {
            return Err(HarnessError::ToolFailed {
                severity: outcome.max_severity,
                messages: outcome.messages(),
            });
        }

        compare(FileHandle::base(base), FileHandle::output(&request.output))?;
        Ok(())
    }
}

/// Assertion-style failures are `Failed`; anything that stopped the check is `Error`
fn status_for(err: &HarnessError) -> ScenarioStatus {
    match err {
        HarnessError::Mismatch { .. }
        | HarnessError::MissingFile { .. }
        | HarnessError::ToolFailed { .. } => ScenarioStatus::Failed,
        _ => ScenarioStatus::Error,
    }
}

/// SHA-256 of a file's contents, if it can be read
pub fn file_digest(path: &Path) -> Option<String> {
    let bytes = fs::read(path).ok()?;
    Some(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{StructureType, ToolResult};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes canned content per output file name
    struct CannedTool {
        outputs: HashMap<String, String>,
        severity: i32,
        calls: Mutex<Vec<ToolRequest>>,
    }

    impl CannedTool {
        fn new(severity: i32) -> Self {
            Self {
                outputs: HashMap::new(),
                severity,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_output(mut self, file: &str, content: &str) -> Self {
            self.outputs.insert(file.to_string(), content.to_string());
            self
        }
    }

    impl ConversionTool for CannedTool {
        fn name(&self) -> &str {
            "canned"
        }

        fn execute(&self, request: &ToolRequest) -> Result<ToolResult> {
            self.calls.lock().unwrap().push(request.clone());
            let file = request.output.file_name().unwrap().to_string_lossy().into_owned();
            if let Some(content) = self.outputs.get(&file) {
                fs::write(&request.output, content).unwrap();
            }
            Ok(ToolResult::new(self.severity, vec![format!("Converted {}", request.input)]))
        }
    }

    fn config(dir: &TempDir) -> HarnessConfig {
        let base_dir = dir.path().join("base");
        fs::create_dir_all(&base_dir).unwrap();
        HarnessConfig {
            base_dir,
            out_dir: dir.path().join("out"),
            input_workspace: dir.path().join("TestInputs.gdb"),
            scenarios: vec![
                Scenario::new("stores_gp", "Stores", StructureType::GpFeatureRecordSetLayer)
                    .with_attributes(["Name"]),
            ],
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn test_passing_scenario() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        fs::write(config.base_dir.join("Stores_GP.json"), "{\"features\":[]}\n").unwrap();

        let tool = CannedTool::new(0).with_output("Stores_GP.json", "{\"features\":[]}\n");
        let runner = ScenarioRunner::new(tool, config);
        let report = runner.run_all().unwrap();

        assert_eq!(report.passed, 1);
        let result = &report.results[0];
        assert_eq!(result.severity, Some(0));
        assert_eq!(result.base_sha256, result.output_sha256);
        assert!(result.diff_report.is_none());

        let calls = runner.tool().calls.lock().unwrap();
        assert_eq!(calls[0].export_attributes, Some(vec!["Name".to_string()]));
        assert!(calls[0].input.ends_with("Stores"));
        assert!(calls[0].overwrite);
    }

    #[test]
    fn test_mismatch_records_report() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        fs::write(config.base_dir.join("Stores_GP.json"), "A\nB\nC\n").unwrap();

        let tool = CannedTool::new(0).with_output("Stores_GP.json", "A\nX\nC\n");
        let runner = ScenarioRunner::new(tool, config);
        let report = runner.run_all().unwrap();

        assert_eq!(report.failed, 1);
        let result = &report.results[0];
        assert_eq!(result.status, ScenarioStatus::Failed);
        let diff = result.diff_report.as_ref().unwrap();
        assert!(diff.ends_with("Stores_GP_diff.html"));
        assert!(diff.exists());
    }

    #[test]
    fn test_tool_warning_fails_before_comparison() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let tool = CannedTool::new(1).with_output("Stores_GP.json", "anything");
        let runner = ScenarioRunner::new(tool, config);
        let report = runner.run_all().unwrap();

        let result = &report.results[0];
        assert_eq!(result.status, ScenarioStatus::Failed);
        assert_eq!(result.severity, Some(1));
        assert!(result.error.as_ref().unwrap().contains("Converted"));
        // The missing base file was never looked at.
        assert!(!result.error.as_ref().unwrap().contains("does not exist"));
    }

    #[test]
    fn test_missing_base_fails() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let tool = CannedTool::new(0).with_output("Stores_GP.json", "{}");
        let runner = ScenarioRunner::new(tool, config);
        let report = runner.run_all().unwrap();

        let result = &report.results[0];
        assert_eq!(result.status, ScenarioStatus::Failed);
        assert!(result.error.as_ref().unwrap().starts_with("Base file"));
        assert!(result.base_sha256.is_none());
    }

    #[test]
    fn test_fail_fast_skips_rest() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.fail_fast = true;
        config.scenarios.push(Scenario::new(
            "stores_na",
            "Stores",
            StructureType::NaServerLocations,
        ));

        let runner = ScenarioRunner::new(CannedTool::new(2), config);
        let report = runner.run_all().unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.results[1].status, ScenarioStatus::Skipped);
    }

    #[test]
    fn test_validation_error_names_loaded_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        let duplicate = config.scenarios[0].clone();
        config.scenarios.push(duplicate);

        let runner = ScenarioRunner::new(CannedTool::new(0), config)
            .with_config_path(dir.path().join("nightly.toml"));
        let err = runner.run_all().unwrap_err();

        assert!(matches!(err, HarnessError::Config { .. }));
        let message = err.to_string();
        assert!(message.contains("nightly.toml"));
        assert!(!message.contains(CONFIG_FILE));
    }

    #[test]
    fn test_parallel_report_uses_wall_time() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.parallel = true;
        config.scenarios = crate::harness::default_scenarios();

        let start = Instant::now();
        let report = ScenarioRunner::new(CannedTool::new(2), config)
            .run_all()
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(report.failed, 4);
        assert!(report.duration <= elapsed);
        for result in &report.results {
            assert!(report.duration >= result.duration);
        }
    }

    #[test]
    fn test_parallel_keeps_scenario_order() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.parallel = true;
        config.scenarios = crate::harness::default_scenarios();
        for scenario in &config.scenarios {
            fs::write(config.base_dir.join(scenario.json_file_name()), "[]\n").unwrap();
        }

        let mut tool = CannedTool::new(0);
        for scenario in &config.scenarios {
            tool = tool.with_output(&scenario.json_file_name(), "[]\n");
        }
        let expected: Vec<_> = config.scenarios.iter().map(|s| s.name.clone()).collect();

        let report = ScenarioRunner::new(tool, config).run_all().unwrap();
        let names: Vec<_> = report.results.iter().map(|r| r.name.clone()).collect();

        assert_eq!(names, expected);
        assert_eq!(report.passed, 4);
    }
}
