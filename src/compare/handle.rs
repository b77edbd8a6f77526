// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! File handles and comparison arguments

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which side of a comparison a file plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Base,
    Output,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Base => "base",
            FileRole::Output => "output",
        }
    }

    /// Capitalized label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            FileRole::Base => "Base",
            FileRole::Output => "Output",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path bound to the role it plays in a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    role: FileRole,
    path: PathBuf,
}

impl FileHandle {
    pub fn new(role: FileRole, path: impl Into<PathBuf>) -> Self {
        Self {
            role,
            path: path.into(),
        }
    }

    pub fn base(path: impl Into<PathBuf>) -> Self {
        Self::new(FileRole::Base, path)
    }

    pub fn output(path: impl Into<PathBuf>) -> Self {
        Self::new(FileRole::Output, path)
    }

    pub fn role(&self) -> FileRole {
        self.role
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Argument accepted by [`compare`](super::compare): a bare path or a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileArg {
    RawPath(PathBuf),
    Named(FileHandle),
}

impl FileArg {
    /// The filesystem path this argument refers to
    pub fn path(&self) -> &Path {
        match self {
            FileArg::RawPath(path) => path,
            FileArg::Named(handle) => handle.path(),
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            FileArg::RawPath(path) => path,
            FileArg::Named(handle) => handle.path,
        }
    }
}

impl From<FileHandle> for FileArg {
    fn from(handle: FileHandle) -> Self {
        FileArg::Named(handle)
    }
}

impl From<&FileHandle> for FileArg {
    fn from(handle: &FileHandle) -> Self {
        FileArg::Named(handle.clone())
    }
}

impl From<PathBuf> for FileArg {
    fn from(path: PathBuf) -> Self {
        FileArg::RawPath(path)
    }
}

impl From<&PathBuf> for FileArg {
    fn from(path: &PathBuf) -> Self {
        FileArg::RawPath(path.clone())
    }
}

impl From<&Path> for FileArg {
    fn from(path: &Path) -> Self {
        FileArg::RawPath(path.to_path_buf())
    }
}

impl From<&str> for FileArg {
    fn from(path: &str) -> Self {
        FileArg::RawPath(PathBuf::from(path))
    }
}

impl From<String> for FileArg {
    fn from(path: String) -> Self {
        FileArg::RawPath(PathBuf::from(path))
    }
}
