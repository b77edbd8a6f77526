// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Regression harness for the Feature Class to JSON tool
//!
//! Each scenario runs the tool once, requires a clean severity, and
//! compares the produced JSON with its approved copy under `base/`.

pub mod config;
pub mod reporter;
pub mod runner;
pub mod scenario;
pub mod types;

pub use config::{HarnessConfig, ToolConfig, CONFIG_FILE};
pub use reporter::RunReporter;
pub use runner::{file_digest, ScenarioRunner};
pub use scenario::{default_scenarios, Scenario};
pub use types::{RunReport, ScenarioResult, ScenarioStatus};
