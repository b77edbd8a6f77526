// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Subprocess execution of the conversion tool

use std::fs;
use std::process::{Command, ExitStatus};
use std::time::Instant;

use tracing::{debug, info};

use super::request::{ToolRequest, ToolResult};
use crate::error::{HarnessError, Result};

/// Severity reported when the tool exits abnormally
pub const SEVERITY_ERROR: i32 = 2;

/// Something that can turn a feature source into a JSON file
pub trait ConversionTool: Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    fn execute(&self, request: &ToolRequest) -> Result<ToolResult>;
}

/// Runs the tool as an external program.
///
/// The command line is
/// `<program> <args...> <tool-name> <input> <attributes> <structure> <output>`.
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
    args: Vec<String>,
    tool_name: String,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            tool_name: tool_name.into(),
        }
    }

    /// Arguments placed before the tool name (e.g. a bridge script)
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if the program can be launched at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.program).arg("--version").output().is_ok()
    }

    fn build_command(&self, request: &ToolRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&self.tool_name)
            .arg(&request.input)
            .arg(request.attributes_arg())
            .arg(request.structure.as_str())
            .arg(&request.output);
        command
    }
}

impl ConversionTool for CommandTool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn execute(&self, request: &ToolRequest) -> Result<ToolResult> {
        if request.output.exists() {
            if !request.overwrite {
                return Err(HarnessError::OutputExists {
                    path: request.output.clone(),
                });
            }
            fs::remove_file(&request.output).map_err(|e| HarnessError::io(&request.output, e))?;
            debug!(output = %request.output.display(), "removed previous output");
        }

        let start = Instant::now();
        debug!(
            tool = %self.tool_name,
            input = %request.input,
            structure = %request.structure,
            "launching {}",
            self.program
        );

        let output = self
            .build_command(request)
            .output()
            .map_err(|source| HarnessError::ToolLaunch {
                program: self.program.clone(),
                source,
            })?;

        let severity = severity_from_status(output.status);
        let messages: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&output.stderr).lines())
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        info!(
            tool = %self.tool_name,
            severity,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tool finished"
        );

        Ok(ToolResult::new(severity, messages))
    }
}

/// Map an exit status onto the 0/1/2 severity scale
fn severity_from_status(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code @ 0..=2) => code,
        _ => SEVERITY_ERROR,
    }
}
