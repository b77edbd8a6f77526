// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Request and result types for the Feature Class to JSON tool

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Placeholder the geoprocessing command line uses for an unset optional argument
pub const UNSET_ARGUMENT: &str = "#";

/// JSON structure the tool writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    /// Feature set for geoprocessing services
    #[serde(rename = "GP_FEATURE_RECORD_SET_LAYER")]
    GpFeatureRecordSetLayer,
    /// Stops/locations input for network analysis services
    #[serde(rename = "NASERVER_LOCATIONS")]
    NaServerLocations,
}

impl StructureType {
    pub const ALL: [StructureType; 2] = [
        StructureType::GpFeatureRecordSetLayer,
        StructureType::NaServerLocations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StructureType::GpFeatureRecordSetLayer => "GP_FEATURE_RECORD_SET_LAYER",
            StructureType::NaServerLocations => "NASERVER_LOCATIONS",
        }
    }

    /// Short tag used in output file names
    pub fn suffix(&self) -> &'static str {
        match self {
            StructureType::GpFeatureRecordSetLayer => "GP",
            StructureType::NaServerLocations => "NA",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GP_FEATURE_RECORD_SET_LAYER" | "GP" => Ok(StructureType::GpFeatureRecordSetLayer),
            "NASERVER_LOCATIONS" | "NA" => Ok(StructureType::NaServerLocations),
            other => Err(format!("unknown JSON structure type: {}", other)),
        }
    }
}

/// One invocation of the conversion tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Input feature source (e.g. a feature class inside a workspace)
    pub input: String,
    /// Attribute fields to export; `None` exports none
    pub export_attributes: Option<Vec<String>>,
    pub structure: StructureType,
    pub output: PathBuf,
    /// Replace an existing output instead of failing
    pub overwrite: bool,
}

impl ToolRequest {
    pub fn new(input: impl Into<String>, structure: StructureType, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            export_attributes: None,
            structure,
            output: output.into(),
            overwrite: false,
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.export_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Attribute list as a single command-line argument
    pub fn attributes_arg(&self) -> String {
        match &self.export_attributes {
            Some(fields) if !fields.is_empty() => fields.join(";"),
            _ => UNSET_ARGUMENT.to_string(),
        }
    }
}

/// Outcome reported by the tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// 0 = success without warnings, 1 = warnings, 2 = errors
    pub max_severity: i32,
    messages: Vec<String>,
}

impl ToolResult {
    pub fn new(max_severity: i32, messages: Vec<String>) -> Self {
        Self {
            max_severity,
            messages,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.max_severity == 0
    }

    pub fn message_list(&self) -> &[String] {
        &self.messages
    }

    /// All diagnostic messages as one block of text
    pub fn messages(&self) -> String {
        self.messages.join("\n")
    }
}
