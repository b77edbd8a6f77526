// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scenario result and run report types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Custom serialization for Duration
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs))
}

/// Scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    Passed,
    /// Tool warnings, missing reference, or output mismatch
    Failed,
    /// The scenario could not be carried out
    Error,
    Skipped,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Passed => "passed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Error => "error",
            ScenarioStatus::Skipped => "skipped",
        }
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    pub base: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_report: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sha256: Option<String>,
    pub error: Option<String>,
}

impl ScenarioResult {
    pub fn new(name: impl Into<String>, base: &Path, output: &Path) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Passed,
            duration: Duration::ZERO,
            base: base.to_path_buf(),
            output: output.to_path_buf(),
            severity: None,
            tool_messages: Vec::new(),
            diff_report: None,
            base_sha256: None,
            output_sha256: None,
            error: None,
        }
    }

    pub fn skipped(name: impl Into<String>, base: &Path, output: &Path, reason: &str) -> Self {
        let mut result = Self::new(name, base, output);
        result.status = ScenarioStatus::Skipped;
        result.error = Some(reason.to_string());
        result
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, ScenarioStatus::Failed | ScenarioStatus::Error)
    }
}

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: String,
    pub tool: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            tool: tool.into(),
            total: 0,
            passed: 0,
            failed: 0,
            errors: 0,
            skipped: 0,
            duration: Duration::ZERO,
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: ScenarioResult) {
        self.total += 1;
        match result.status {
            ScenarioStatus::Passed => self.passed += 1,
            ScenarioStatus::Failed => self.failed += 1,
            ScenarioStatus::Error => self.errors += 1,
            ScenarioStatus::Skipped => self.skipped += 1,
        }
        self.duration += result.duration;
        self.results.push(result);
    }

    /// Record the run's wall-clock time in place of the summed scenario times
    pub fn finish(&mut self, elapsed: Duration) {
        self.duration = elapsed;
    }

    pub fn pass_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f32 / self.total as f32) * 100.0
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errors > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| r.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: ScenarioStatus) -> ScenarioResult {
        let mut r = ScenarioResult::new(name, Path::new("base/a.json"), Path::new("out/a.json"));
        r.status = status;
        r.duration = Duration::from_millis(250);
        r
    }

    #[test]
    fn test_report_counts() {
        let mut report = RunReport::new("FeatureClassToJSON_sample");
        report.add_result(result("a", ScenarioStatus::Passed));
        report.add_result(result("b", ScenarioStatus::Failed));
        report.add_result(result("c", ScenarioStatus::Skipped));
        report.add_result(result("d", ScenarioStatus::Passed));

        assert_eq!(report.total, 4);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.pass_rate(), 50.0);
        assert_eq!(report.duration, Duration::from_secs(1));
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_finish_replaces_summed_duration() {
        let mut report = RunReport::new("FeatureClassToJSON_sample");
        report.add_result(result("a", ScenarioStatus::Passed));
        report.add_result(result("b", ScenarioStatus::Passed));
        assert_eq!(report.duration, Duration::from_millis(500));

        report.finish(Duration::from_millis(260));
        assert_eq!(report.duration, Duration::from_millis(260));
    }

    #[test]
    fn test_result_json_round_trip_keeps_duration() {
        let mut r = result("a", ScenarioStatus::Failed);
        r.diff_report = Some(PathBuf::from("out/a_diff.html"));

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"duration\":0.25"));
        assert!(!json.contains("base_sha256"));

        let back: ScenarioResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.duration, Duration::from_millis(250));
        assert_eq!(back.diff_report, r.diff_report);
    }
}
