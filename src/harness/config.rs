// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Harness configuration system

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::scenario::{default_scenarios, Scenario};
use crate::error::HarnessError;
use crate::tool::CommandTool;

/// Default configuration file name
pub const CONFIG_FILE: &str = "harness.toml";

/// How to launch the conversion tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable to launch
    pub program: String,
    /// Arguments placed before the tool name
    pub args: Vec<String>,
    /// Tool name passed to the program
    pub tool_name: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["run_tool.py".to_string()],
            tool_name: "FeatureClassToJSON_sample".to_string(),
        }
    }
}

impl ToolConfig {
    pub fn command_tool(&self) -> CommandTool {
        CommandTool::new(&self.program, &self.tool_name).with_args(self.args.iter().cloned())
    }
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding approved reference files
    pub base_dir: PathBuf,
    /// Directory the tool writes into; diff reports land here too
    pub out_dir: PathBuf,
    /// Workspace containing the input feature classes
    pub input_workspace: PathBuf,
    /// Replace outputs left over from a previous run
    pub overwrite_output: bool,
    /// Run scenarios concurrently
    pub parallel: bool,
    /// Skip remaining scenarios after the first failure
    pub fail_fast: bool,
    /// Substring filters on scenario names
    pub filters: Vec<String>,
    pub tool: ToolConfig,
    /// Scenarios to run; empty means the built-in set
    pub scenarios: Vec<Scenario>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("tests/base"),
            out_dir: PathBuf::from("tests/out"),
            input_workspace: PathBuf::from("tests/TestInputs.gdb"),
            overwrite_output: true,
            parallel: false,
            fail_fast: false,
            filters: Vec::new(),
            tool: ToolConfig::default(),
            scenarios: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: HarnessConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `harness.toml` from the working directory (if any) with environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load the given file (if it exists) with environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `FCJSON_*` overrides resolved through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("FCJSON_BASE_DIR") {
            self.base_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("FCJSON_OUT_DIR") {
            self.out_dir = PathBuf::from(dir);
        }

        if let Some(workspace) = lookup("FCJSON_INPUT_WORKSPACE") {
            self.input_workspace = PathBuf::from(workspace);
        }

        if let Some(program) = lookup("FCJSON_TOOL_PROGRAM") {
            self.tool.program = program;
        }

        if let Some(parallel) = lookup("FCJSON_PARALLEL") {
            match parse_flag(&parallel) {
                Some(flag) => self.parallel = flag,
                None => warn!(value = %parallel, "ignoring unrecognised FCJSON_PARALLEL"),
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Check if a scenario name matches filters
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        self.filters.iter().any(|filter| name.contains(filter))
    }

    /// Configured scenarios, or the built-in set when none are configured
    pub fn scenarios(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            default_scenarios()
        } else {
            self.scenarios.clone()
        }
    }

    /// Scenarios that pass the name filters
    pub fn selected_scenarios(&self) -> Vec<Scenario> {
        self.scenarios()
            .into_iter()
            .filter(|s| self.matches_filter(&s.name))
            .collect()
    }

    /// Reject scenario sets that would race on the same output or report
    pub fn validate(&self, config_path: &Path) -> Result<(), HarnessError> {
        let mut names = HashSet::new();
        let mut files = HashSet::new();

        for scenario in self.scenarios() {
            if !names.insert(scenario.name.clone()) {
                return Err(HarnessError::Config {
                    path: config_path.to_path_buf(),
                    message: format!("duplicate scenario name '{}'", scenario.name),
                });
            }
            if !files.insert(scenario.json_file_name()) {
                return Err(HarnessError::Config {
                    path: config_path.to_path_buf(),
                    message: format!(
                        "scenario '{}' writes {} which another scenario also writes",
                        scenario.name,
                        scenario.json_file_name()
                    ),
                });
            }
        }

        Ok(())
    }

    /// Tool input identifier for a scenario
    pub fn input_path(&self, scenario: &Scenario) -> String {
        self.input_workspace.join(&scenario.input).display().to_string()
    }

    pub fn base_path(&self, scenario: &Scenario) -> PathBuf {
        self.base_dir.join(scenario.json_file_name())
    }

    pub fn output_path(&self, scenario: &Scenario) -> PathBuf {
        self.out_dir.join(scenario.json_file_name())
    }
}

/// Boolean environment value: 1/0, true/false, yes/no, on/off
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::StructureType;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_use_builtin_scenarios() {
        let config = HarnessConfig::default();
        assert_eq!(config.scenarios().len(), 4);
        assert!(config.overwrite_output);
        assert!(config.validate(Path::new(CONFIG_FILE)).is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let config = HarnessConfig {
            parallel: true,
            filters: vec!["as_na".to_string()],
            scenarios: default_scenarios(),
            ..HarnessConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
out_dir = "target/out"

[tool]
program = "python3"

[[scenarios]]
name = "lines_as_gp"
input = "Roads"
structure = "GP_FEATURE_RECORD_SET_LAYER"
export_attributes = ["Name", "Type"]
"#,
        )
        .unwrap();

        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("target/out"));
        assert_eq!(config.base_dir, PathBuf::from("tests/base"));
        assert_eq!(config.tool.program, "python3");
        assert_eq!(config.tool.tool_name, "FeatureClassToJSON_sample");

        let scenarios = config.scenarios();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].json_file_name(), "Roads_GP.json");
        assert_eq!(
            config.output_path(&scenarios[0]),
            PathBuf::from("target/out/Roads_GP.json")
        );
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("FCJSON_OUT_DIR", "/tmp/fcjson"),
            ("FCJSON_TOOL_PROGRAM", "propy"),
            ("FCJSON_PARALLEL", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = HarnessConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.out_dir, PathBuf::from("/tmp/fcjson"));
        assert_eq!(config.tool.program, "propy");
        assert!(config.parallel);
        assert_eq!(config.base_dir, PathBuf::from("tests/base"));
    }

    #[test]
    fn test_parallel_override_spellings() {
        for (value, expected) in [
            ("1", true),
            ("YES", true),
            ("on", true),
            ("True", true),
            ("0", false),
            ("no", false),
            ("off", false),
        ] {
            let mut config = HarnessConfig {
                parallel: !expected,
                ..HarnessConfig::default()
            };
            config.apply_overrides(|key| (key == "FCJSON_PARALLEL").then(|| value.to_string()));
            assert_eq!(config.parallel, expected, "FCJSON_PARALLEL={}", value);
        }

        // Unrecognised values leave the configured setting alone.
        let mut config = HarnessConfig {
            parallel: true,
            ..HarnessConfig::default()
        };
        config.apply_overrides(|key| (key == "FCJSON_PARALLEL").then(|| "maybe".to_string()));
        assert!(config.parallel);
    }

    #[test]
    fn test_filters() {
        let config = HarnessConfig {
            filters: vec!["_as_gp".to_string()],
            ..HarnessConfig::default()
        };
        let names: Vec<_> = config
            .selected_scenarios()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(
            names,
            vec!["2d_point_fc_and_attributes_as_gp", "2d_point_fc_as_gp"]
        );
    }

    #[test]
    fn test_validate_rejects_shared_output() {
        let config = HarnessConfig {
            scenarios: vec![
                Scenario::new("a", "Stores", StructureType::GpFeatureRecordSetLayer),
                Scenario::new("b", "Stores", StructureType::GpFeatureRecordSetLayer)
                    .with_attributes(["Name"]),
            ],
            ..HarnessConfig::default()
        };

        let err = config.validate(Path::new(CONFIG_FILE)).unwrap_err();
        assert!(err.to_string().contains("Stores_GP.json"));
    }
}
