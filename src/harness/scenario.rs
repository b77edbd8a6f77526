// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Regression scenarios for the Feature Class to JSON tool

use serde::{Deserialize, Serialize};

use crate::tool::StructureType;

/// A single regression case: which feature class to convert and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Feature class name inside the input workspace
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_attributes: Option<Vec<String>>,
    pub structure: StructureType,
}

impl Scenario {
    pub fn new(name: impl Into<String>, input: impl Into<String>, structure: StructureType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input: input.into(),
            export_attributes: None,
            structure,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.export_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Name of both the reference file and the produced file
    pub fn json_file_name(&self) -> String {
        format!("{}_{}.json", self.input, self.structure.suffix())
    }
}

/// The stock regression cases for point feature classes
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "2d_point_fc_and_attributes_as_gp",
            "CandidateStores_WebM",
            StructureType::GpFeatureRecordSetLayer,
        )
        .with_description(
            "Serialize attributes and geometries from a 2D point feature class in web mercator spatial reference as GPFeatureRecordSetLayer",
        )
        .with_attributes(["Name"]),
        Scenario::new(
            "2d_point_fc_as_gp",
            "CandidateStores_WGS84",
            StructureType::GpFeatureRecordSetLayer,
        )
        .with_description(
            "Serialize geometries from a 2D point feature class in WGS84 spatial reference as GPFeatureRecordSetLayer",
        ),
        Scenario::new(
            "2d_point_fc_and_attributes_as_na",
            "CandidateStores_WebM",
            StructureType::NaServerLocations,
        )
        .with_description(
            "Serialize attributes and geometries from a 2D point feature class in web mercator spatial reference as NAServerLocations",
        )
        .with_attributes(["Name"]),
        Scenario::new(
            "2d_point_fc_as_na",
            "CandidateStores_WGS84",
            StructureType::NaServerLocations,
        )
        .with_description(
            "Serialize geometries from a 2D point feature class in WGS84 spatial reference as NAServerLocations",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_json_file_name() {
        let scenario = Scenario::new("s", "CandidateStores_WebM", StructureType::NaServerLocations);
        assert_eq!(scenario.json_file_name(), "CandidateStores_WebM_NA.json");
    }

    #[test]
    fn test_default_scenarios_write_distinct_files() {
        let scenarios = default_scenarios();
        assert_eq!(scenarios.len(), 4);

        let files: HashSet<_> = scenarios.iter().map(Scenario::json_file_name).collect();
        assert_eq!(files.len(), 4);
        assert!(files.contains("CandidateStores_WGS84_GP.json"));

        let with_attributes = scenarios
            .iter()
            .filter(|s| s.export_attributes.as_deref() == Some(&["Name".to_string()][..]))
            .count();
        assert_eq!(with_attributes, 2);
    }
}
