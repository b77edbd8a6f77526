// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error type shared by the comparison utility and the tool boundary

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::compare::FileRole;

/// Errors surfaced by comparisons, tool invocations and scenario setup
#[derive(Debug, Error)]
pub enum HarnessError {
    /// One side of a comparison is absent
    #[error("{} file {} does not exist.", .role.label(), .path.display())]
    MissingFile { role: FileRole, path: PathBuf },

    /// Both files exist but their bytes differ
    #[error("Files are not equal. Check {} for differences", .report.display())]
    Mismatch { report: PathBuf },

    /// File content is not valid UTF-8 when re-read for diffing
    #[error("{} is not valid UTF-8 (valid up to byte {valid_up_to})", .path.display())]
    Decode { path: PathBuf, valid_up_to: usize },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to launch tool '{program}': {source}")]
    ToolLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Output {} already exists and overwrite is disabled", .path.display())]
    OutputExists { path: PathBuf },

    /// The conversion tool reported warnings or errors
    #[error("Tool finished with severity {severity}:\n{messages}")]
    ToolFailed { severity: i32, messages: String },

    #[error("Invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }

    /// Report path carried by a mismatch, if this is one
    pub fn report_path(&self) -> Option<&PathBuf> {
        match self {
            HarnessError::Mismatch { report } => Some(report),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
