// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature Class to JSON regression harness
//!
//! Compares files produced by the Feature Class to JSON tool against approved
//! reference copies and writes a side-by-side HTML diff report when they differ.

pub mod compare;
pub mod error;
pub mod harness;
pub mod tool;

pub use compare::{assert_files_equal, compare, FileArg, FileHandle, FileRole, HtmlDiff};
pub use error::{HarnessError, Result};
pub use harness::{HarnessConfig, RunReport, RunReporter, Scenario, ScenarioRunner};
pub use tool::{CommandTool, ConversionTool, StructureType, ToolRequest, ToolResult};
