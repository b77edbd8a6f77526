// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary to the external Feature Class to JSON tool

pub mod request;
pub mod runner;

pub use request::{StructureType, ToolRequest, ToolResult, UNSET_ARGUMENT};
pub use runner::{CommandTool, ConversionTool, SEVERITY_ERROR};
