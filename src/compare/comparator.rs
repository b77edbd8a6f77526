// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Byte-exact file comparison with HTML diff reports

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::handle::{FileArg, FileRole};
use super::html_diff::{split_lines, HtmlDiff};
use crate::error::{HarnessError, Result};

/// Column at which report lines wrap
pub const DIFF_WRAP_COLUMN: usize = 80;

/// Context lines around each hunk when a report is rendered in context mode
pub const DIFF_CONTEXT_LINES: usize = 5;

const CHUNK_SIZE: usize = 8 * 1024;

/// Compare `base` against `candidate` byte for byte.
///
/// Returns `Ok(true)` when the contents are identical. Otherwise both files
/// are decoded as UTF-8, a side-by-side HTML report is written to
/// [`diff_report_path`] of the candidate, and [`HarnessError::Mismatch`]
/// naming that report is returned.
///
/// The report's context flag follows the equality result, so a failing
/// comparison always renders every line of both files rather than hunks.
pub fn compare(base: impl Into<FileArg>, candidate: impl Into<FileArg>) -> Result<bool> {
    let base = base.into().into_path();
    let candidate = candidate.into().into_path();

    ensure_exists(FileRole::Base, &base)?;
    ensure_exists(FileRole::Output, &candidate)?;

    let is_equal = files_identical(&base, &candidate)?;
    if is_equal {
        debug!(base = %base.display(), output = %candidate.display(), "files are identical");
        return Ok(is_equal);
    }

    let candidate_text = read_utf8(&candidate)?;
    let base_text = read_utf8(&base)?;

    let html = HtmlDiff::new()
        .with_wrap_column(DIFF_WRAP_COLUMN)
        .make_file(
            &split_lines(&candidate_text),
            &split_lines(&base_text),
            &candidate.display().to_string(),
            &base.display().to_string(),
            is_equal,
            DIFF_CONTEXT_LINES,
        );

    let report = diff_report_path(&candidate);
    write_report(&report, &html, &candidate)?;

    warn!(report = %report.display(), "files differ");
    Err(HarnessError::Mismatch { report })
}

/// Panic with the comparison error unless both files are byte-identical
#[track_caller]
pub fn assert_files_equal(base: impl Into<FileArg>, candidate: impl Into<FileArg>) {
    if let Err(err) = compare(base, candidate) {
        panic!("{}", err);
    }
}

/// Location of the diff report for `candidate`: `<dir>/<stem>_diff.html`
pub fn diff_report_path(candidate: &Path) -> PathBuf {
    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    candidate.with_file_name(format!("{}_diff.html", stem))
}

/// Whether two files have exactly the same contents
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a).map_err(|e| HarnessError::io(a, e))?.len();
    let len_b = fs::metadata(b).map_err(|e| HarnessError::io(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut file_a = File::open(a).map_err(|e| HarnessError::io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| HarnessError::io(b, e))?;
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let n_a = read_chunk(&mut file_a, &mut buf_a).map_err(|e| HarnessError::io(a, e))?;
        let n_b = read_chunk(&mut file_b, &mut buf_b).map_err(|e| HarnessError::io(b, e))?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

fn ensure_exists(role: FileRole, path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(HarnessError::MissingFile {
            role,
            path: path.to_path_buf(),
        })
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| HarnessError::io(path, e))?;
    String::from_utf8(bytes).map_err(|e| HarnessError::Decode {
        path: path.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Write the report through a sibling temp file so a reader never sees a
/// half-written document; any previous report is replaced. The report takes
/// the permissions of `like`, not the temp file's private mode.
fn write_report(report: &Path, html: &str, like: &Path) -> Result<()> {
    let dir = match report.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| HarnessError::io(dir, e))?;
    tmp.write_all(html.as_bytes())
        .map_err(|e| HarnessError::io(tmp.path(), e))?;
    let permissions = fs::metadata(like)
        .map_err(|e| HarnessError::io(like, e))?
        .permissions();
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| HarnessError::io(tmp.path(), e))?;
    tmp.persist(report)
        .map_err(|e| HarnessError::io(report, e.error))?;

    debug!(report = %report.display(), "wrote diff report");
    Ok(())
}
