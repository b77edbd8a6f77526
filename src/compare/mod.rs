// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! File equality checks and diff reporting

pub mod comparator;
pub mod handle;
pub mod html_diff;

pub use comparator::{
    assert_files_equal, compare, diff_report_path, files_identical, DIFF_CONTEXT_LINES,
    DIFF_WRAP_COLUMN,
};
pub use handle::{FileArg, FileHandle, FileRole};
pub use html_diff::{split_lines, HtmlDiff};
