// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Side-by-side HTML diff rendering
//!
//! Produces a self-contained HTML document with one table row per aligned
//! line pair. Line alignment comes from a Myers diff over whole lines
//! (terminators included); paired lines inside a replaced block get a
//! character-level diff so the changed runs can be highlighted. Output is
//! fully deterministic: no timestamps, no per-process counters.

use similar::{capture_diff_slices, group_diff_ops, Algorithm, DiffOp, DiffTag};

const STYLES: &str = r#"
        table.diff {font-family:Courier; border:medium;}
        .diff_header {background-color:#e0e0e0}
        td.diff_header {text-align:right}
        .diff_next {background-color:#c0c0c0}
        .diff_add {background-color:#aaffaa}
        .diff_chg {background-color:#ffff77}
        .diff_sub {background-color:#ffaaaa}"#;

const LEGEND: &str = r#"
    <table class="diff" summary="Legends">
        <tr> <th colspan="2"> Legends </th> </tr>
        <tr> <td> <table border="" summary="Colors">
                      <tr><th> Colors </th> </tr>
                      <tr><td class="diff_add">&nbsp;Added&nbsp;</td></tr>
                      <tr><td class="diff_chg">Changed</td> </tr>
                      <tr><td class="diff_sub">Deleted</td> </tr>
                  </table></td>
             <td> <table border="" summary="Links">
                      <tr><th colspan="2"> Links </th> </tr>
                      <tr><td>(f)irst change</td> </tr>
                      <tr><td>(n)ext change</td> </tr>
                      <tr><td>(t)op</td> </tr>
                  </table></td> </tr>
    </table>"#;

/// Highlight applied to a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Add,
    Sub,
    Chg,
}

impl Mark {
    fn class(self) -> &'static str {
        match self {
            Mark::Add => "diff_add",
            Mark::Sub => "diff_sub",
            Mark::Chg => "diff_chg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    mark: Option<Mark>,
    text: String,
}

/// One side of an aligned row: its 1-based line number and marked-up text
#[derive(Debug, Clone)]
struct Side {
    number: usize,
    segments: Vec<Segment>,
}

/// An aligned line pair; a missing side means the line exists on one side only
#[derive(Debug, Clone)]
struct LineRow {
    left: Option<Side>,
    right: Option<Side>,
    changed: bool,
}

/// A rendered table row after wrapping
struct PhysicalRow {
    left: String,
    right: String,
    changed: bool,
}

/// Side-by-side HTML diff generator
#[derive(Debug, Clone)]
pub struct HtmlDiff {
    wrap_column: Option<usize>,
    tab_size: usize,
}

impl Default for HtmlDiff {
    fn default() -> Self {
        Self {
            wrap_column: None,
            tab_size: 8,
        }
    }
}

impl HtmlDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap lines longer than `column` characters onto continuation rows
    pub fn with_wrap_column(mut self, column: usize) -> Self {
        self.wrap_column = Some(column);
        self
    }

    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size.max(1);
        self
    }

    /// Render a complete HTML document comparing `from_lines` (left column)
    /// against `to_lines` (right column).
    ///
    /// With `context` set only the changed hunks plus `num_lines` lines of
    /// surrounding context are shown; otherwise every line of both inputs is.
    pub fn make_file(
        &self,
        from_lines: &[&str],
        to_lines: &[&str],
        from_desc: &str,
        to_desc: &str,
        context: bool,
        num_lines: usize,
    ) -> String {
        let table = self.make_table(from_lines, to_lines, from_desc, to_desc, context, num_lines);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html>\n\n<head>\n");
        html.push_str("    <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n");
        html.push_str("    <title></title>\n");
        html.push_str("    <style type=\"text/css\">");
        html.push_str(STYLES);
        html.push_str("\n    </style>\n</head>\n\n<body>\n");
        html.push_str(&table);
        html.push_str(LEGEND);
        html.push_str("\n</body>\n\n</html>\n");
        html
    }

    /// Render only the diff `<table>` element
    pub fn make_table(
        &self,
        from_lines: &[&str],
        to_lines: &[&str],
        from_desc: &str,
        to_desc: &str,
        context: bool,
        num_lines: usize,
    ) -> String {
        let logical = self.collect_rows(from_lines, to_lines, context, num_lines);

        let mut rows: Vec<Option<PhysicalRow>> = Vec::new();
        for row in &logical {
            match row {
                Some(row) => rows.extend(self.wrap_row(row).into_iter().map(Some)),
                None => rows.push(None),
            }
        }

        if rows.is_empty() {
            let message = if context {
                "<td></td><td>&nbsp;No Differences Found&nbsp;</td>"
            } else {
                "<td></td><td>&nbsp;Empty File&nbsp;</td>"
            };
            rows.push(Some(PhysicalRow {
                left: message.to_string(),
                right: message.to_string(),
                changed: false,
            }));
        }

        let (next_id, next_href) = navigation(&rows, num_lines);

        let mut table = String::new();
        table.push_str(
            "\n    <table class=\"diff\" id=\"change_top\"\n           cellspacing=\"0\" cellpadding=\"0\" rules=\"groups\" >\n",
        );
        table.push_str("        <colgroup></colgroup> <colgroup></colgroup> <colgroup></colgroup>\n");
        table.push_str("        <colgroup></colgroup> <colgroup></colgroup> <colgroup></colgroup>\n");
        table.push_str(&format!(
            "        <thead><tr><th class=\"diff_next\"><br /></th><th colspan=\"2\" class=\"diff_header\">{}</th><th class=\"diff_next\"><br /></th><th colspan=\"2\" class=\"diff_header\">{}</th></tr></thead>\n",
            escape_desc(from_desc),
            escape_desc(to_desc)
        ));
        table.push_str("        <tbody>\n");

        for (i, row) in rows.iter().enumerate() {
            match row {
                Some(row) => table.push_str(&format!(
                    "            <tr><td class=\"diff_next\"{}>{}</td>{}<td class=\"diff_next\">{}</td>{}</tr>\n",
                    next_id[i], next_href[i], row.left, next_href[i], row.right
                )),
                None => {
                    if i > 0 {
                        table.push_str("        </tbody>\n        <tbody>\n");
                    }
                }
            }
        }

        table.push_str("        </tbody>\n    </table>");
        table
    }

    /// Align the two inputs into logical rows; `None` separates context hunks.
    fn collect_rows(
        &self,
        from_lines: &[&str],
        to_lines: &[&str],
        context: bool,
        num_lines: usize,
    ) -> Vec<Option<LineRow>> {
        let ops = capture_diff_slices(Algorithm::Myers, from_lines, to_lines);
        let mut rows = Vec::new();

        if context {
            if ops.iter().all(|op| op.tag() == DiffTag::Equal) {
                return rows;
            }
            for (i, group) in group_diff_ops(ops, num_lines).iter().enumerate() {
                if i > 0 {
                    rows.push(None);
                }
                for op in group {
                    self.push_op(op, from_lines, to_lines, &mut rows);
                }
            }
        } else {
            for op in &ops {
                self.push_op(op, from_lines, to_lines, &mut rows);
            }
        }

        rows
    }

    fn push_op(
        &self,
        op: &DiffOp,
        from_lines: &[&str],
        to_lines: &[&str],
        rows: &mut Vec<Option<LineRow>>,
    ) {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for (i, j) in old.zip(new) {
                    rows.push(Some(LineRow {
                        left: Some(self.plain_side(i, from_lines[i], None)),
                        right: Some(self.plain_side(j, to_lines[j], None)),
                        changed: false,
                    }));
                }
            }
            DiffTag::Delete => {
                for i in old {
                    rows.push(Some(self.deleted_row(i, from_lines[i])));
                }
            }
            DiffTag::Insert => {
                for j in new {
                    rows.push(Some(self.inserted_row(j, to_lines[j])));
                }
            }
            DiffTag::Replace => {
                let paired = old.len().min(new.len());
                for k in 0..paired {
                    let (i, j) = (old.start + k, new.start + k);
                    let (left, right) = self.intraline(from_lines[i], to_lines[j]);
                    rows.push(Some(LineRow {
                        left: Some(Side {
                            number: i + 1,
                            segments: left,
                        }),
                        right: Some(Side {
                            number: j + 1,
                            segments: right,
                        }),
                        changed: true,
                    }));
                }
                for i in old.start + paired..old.end {
                    rows.push(Some(self.deleted_row(i, from_lines[i])));
                }
                for j in new.start + paired..new.end {
                    rows.push(Some(self.inserted_row(j, to_lines[j])));
                }
            }
        }
    }

    fn plain_side(&self, index: usize, line: &str, mark: Option<Mark>) -> Side {
        let (body, _) = split_terminator(line);
        let mut segments = Vec::new();
        push_segment(&mut segments, mark, &self.expand_tabs(body));
        Side {
            number: index + 1,
            segments,
        }
    }

    fn deleted_row(&self, index: usize, line: &str) -> LineRow {
        LineRow {
            left: Some(self.plain_side(index, line, Some(Mark::Sub))),
            right: None,
            changed: true,
        }
    }

    fn inserted_row(&self, index: usize, line: &str) -> LineRow {
        LineRow {
            left: None,
            right: Some(self.plain_side(index, line, Some(Mark::Add))),
            changed: true,
        }
    }

    /// Character-level markup for a pair of lines that replaced each other
    fn intraline(&self, old: &str, new: &str) -> (Vec<Segment>, Vec<Segment>) {
        let (old_body, old_end) = split_terminator(old);
        let (new_body, new_end) = split_terminator(new);
        let old_chars: Vec<char> = self.expand_tabs(old_body).chars().collect();
        let new_chars: Vec<char> = self.expand_tabs(new_body).chars().collect();

        let mut left = Vec::new();
        let mut right = Vec::new();

        for op in capture_diff_slices(Algorithm::Myers, &old_chars, &new_chars) {
            let (tag, o, n) = op.as_tag_tuple();
            let old_text: String = old_chars[o].iter().collect();
            let new_text: String = new_chars[n].iter().collect();
            match tag {
                DiffTag::Equal => {
                    push_segment(&mut left, None, &old_text);
                    push_segment(&mut right, None, &new_text);
                }
                DiffTag::Delete => push_segment(&mut left, Some(Mark::Sub), &old_text),
                DiffTag::Insert => push_segment(&mut right, Some(Mark::Add), &new_text),
                DiffTag::Replace => {
                    push_segment(&mut left, Some(Mark::Chg), &old_text);
                    push_segment(&mut right, Some(Mark::Chg), &new_text);
                }
            }
        }

        // Line endings are invisible unless they are the difference.
        if old_end != new_end {
            push_segment(&mut left, Some(Mark::Chg), terminator_label(old_end));
            push_segment(&mut right, Some(Mark::Chg), terminator_label(new_end));
        }

        (left, right)
    }

    fn expand_tabs(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut column = 0;
        for ch in text.chars() {
            if ch == '\t' {
                let width = self.tab_size - (column % self.tab_size);
                out.extend(std::iter::repeat(' ').take(width));
                column += width;
            } else {
                out.push(ch);
                column += 1;
            }
        }
        out
    }

    /// Split a logical row into wrapped physical rows
    fn wrap_row(&self, row: &LineRow) -> Vec<PhysicalRow> {
        let left = row.left.as_ref().map(|side| (side.number, self.wrap(&side.segments)));
        let right = row.right.as_ref().map(|side| (side.number, self.wrap(&side.segments)));

        let height = [&left, &right]
            .iter()
            .filter_map(|side| side.as_ref().map(|(_, chunks)| chunks.len()))
            .max()
            .unwrap_or(1);

        (0..height)
            .map(|i| PhysicalRow {
                left: format_cell("left", left.as_ref(), i),
                right: format_cell("right", right.as_ref(), i),
                changed: row.changed,
            })
            .collect()
    }

    fn wrap(&self, segments: &[Segment]) -> Vec<Vec<Segment>> {
        let width = match self.wrap_column {
            Some(width) if width > 0 => width,
            _ => return vec![segments.to_vec()],
        };

        let mut chunks: Vec<Vec<Segment>> = vec![Vec::new()];
        let mut used = 0;

        for segment in segments {
            let mut rest = segment.text.as_str();
            while !rest.is_empty() {
                if used == width {
                    chunks.push(Vec::new());
                    used = 0;
                }
                let take = width - used;
                let split = rest
                    .char_indices()
                    .nth(take)
                    .map(|(idx, _)| idx)
                    .unwrap_or(rest.len());
                let (head, tail) = rest.split_at(split);
                if let Some(chunk) = chunks.last_mut() {
                    push_segment(chunk, segment.mark, head);
                }
                used += head.chars().count();
                rest = tail;
            }
        }

        chunks
    }
}

/// Render the number and text cells of one side for wrapped row `index`
fn format_cell(prefix: &str, side: Option<&(usize, Vec<Vec<Segment>>)>, index: usize) -> String {
    let Some((number, chunks)) = side else {
        return "<td class=\"diff_header\"></td><td nowrap=\"nowrap\"></td>".to_string();
    };

    let (id, label) = if index == 0 {
        (format!(" id=\"{}_{}\"", prefix, number), number.to_string())
    } else if index < chunks.len() {
        (String::new(), "&gt;".to_string())
    } else {
        (String::new(), String::new())
    };

    let text = chunks
        .get(index)
        .map(|chunk| render_segments(chunk))
        .unwrap_or_default();

    format!(
        "<td class=\"diff_header\"{}>{}</td><td nowrap=\"nowrap\">{}</td>",
        id, label, text
    )
}

fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        let text = escape_text(&segment.text);
        match segment.mark {
            Some(mark) => {
                out.push_str(&format!("<span class=\"{}\">{}</span>", mark.class(), text))
            }
            None => out.push_str(&text),
        }
    }
    out
}

/// Compute the anchor ids and navigation links for each physical row.
///
/// Each change block gets an anchor `num_lines` rows ahead of it so that
/// following a link leaves some context visible above the change.
fn navigation(rows: &[Option<PhysicalRow>], num_lines: usize) -> (Vec<String>, Vec<String>) {
    let mut next_id = vec![String::new(); rows.len()];
    let mut next_href = vec![String::new(); rows.len()];
    let mut changes = 0;
    let mut in_change = false;
    let mut last = 0;

    for (i, row) in rows.iter().enumerate() {
        let changed = row.as_ref().map(|r| r.changed).unwrap_or(false);
        if changed {
            if !in_change {
                in_change = true;
                last = i;
                let anchor = i.saturating_sub(num_lines);
                next_id[anchor] = format!(" id=\"change_{}\"", changes);
                changes += 1;
                next_href[i] = format!("<a href=\"#change_{}\">n</a>", changes);
            }
        } else {
            in_change = false;
        }
    }

    let first_changed = rows
        .first()
        .and_then(|r| r.as_ref())
        .map(|r| r.changed)
        .unwrap_or(false);
    if !first_changed {
        next_href[0] = "<a href=\"#change_0\">f</a>".to_string();
    }
    next_href[last] = "<a href=\"#change_top\">t</a>".to_string();

    (next_id, next_href)
}

fn push_segment(segments: &mut Vec<Segment>, mark: Option<Mark>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.mark == mark => last.text.push_str(text),
        _ => segments.push(Segment {
            mark,
            text: text.to_string(),
        }),
    }
}

/// Single characters that end a line
fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        return (body, "\r\n");
    }
    match line.chars().next_back() {
        Some(ch) if is_line_boundary(ch) => line.split_at(line.len() - ch.len_utf8()),
        _ => (line, ""),
    }
}

fn terminator_label(terminator: &str) -> &'static str {
    match terminator {
        "\r\n" => "\\r\\n",
        "\n" => "\\n",
        "\r" => "\\r",
        "\u{0b}" => "\\x0b",
        "\u{0c}" => "\\x0c",
        "\u{1c}" => "\\x1c",
        "\u{1d}" => "\\x1d",
        "\u{1e}" => "\\x1e",
        "\u{85}" => "\\x85",
        "\u{2028}" => "\\u2028",
        "\u{2029}" => "\\u2029",
        _ => "(none)",
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(' ', "&nbsp;")
}

fn escape_desc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Split text into lines, keeping each line's terminator.
///
/// `\r\n`, a lone `\r`, `\n` and the other Unicode line boundaries
/// (vertical tab, form feed, the file/group/record separators, NEL,
/// U+2028 and U+2029) all end a line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_boundary(ch) {
            continue;
        }
        let mut end = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                end = next + 1;
                chars.next();
            }
        }
        lines.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(from: &str, to: &str, context: bool) -> String {
        HtmlDiff::new().with_wrap_column(80).make_table(
            &split_lines(from),
            &split_lines(to),
            "from",
            "to",
            context,
            5,
        )
    }

    #[test]
    fn test_split_lines_keeps_terminators() {
        assert_eq!(split_lines("A\nB\r\nC"), vec!["A\n", "B\r\n", "C"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_split_lines_on_every_line_boundary() {
        assert_eq!(split_lines("A\rB\rC\r"), vec!["A\r", "B\r", "C\r"]);
        assert_eq!(split_lines("A\r\nB\rC\n"), vec!["A\r\n", "B\r", "C\n"]);
        assert_eq!(
            split_lines("a\u{0b}b\u{0c}c\u{85}d\u{2028}e"),
            vec!["a\u{0b}", "b\u{0c}", "c\u{85}", "d\u{2028}", "e"]
        );
        assert_eq!(split_terminator("x\u{2029}"), ("x", "\u{2029}"));
        assert_eq!(split_terminator("x\r\n"), ("x", "\r\n"));
    }

    #[test]
    fn test_carriage_return_only_lines_align() {
        let html = table("A\rB\rC\r", "A\rX\rC\r", false);

        assert!(html.contains("id=\"left_3\">3</td><td nowrap=\"nowrap\">C</td>"));
        assert!(html.contains("id=\"right_3\">3</td><td nowrap=\"nowrap\">C</td>"));
        assert!(html.contains("<span class=\"diff_chg\">B</span>"));
        assert!(html.contains("<span class=\"diff_chg\">X</span>"));
    }

    #[test]
    fn test_changed_line_is_marked() {
        let html = table("A\nB\nC\n", "A\nX\nC\n", false);

        assert!(html.contains("<span class=\"diff_chg\">B</span>"));
        assert!(html.contains("<span class=\"diff_chg\">X</span>"));
        assert!(html.contains("id=\"left_1\">1</td><td nowrap=\"nowrap\">A</td>"));
        assert!(html.contains("id=\"right_3\">3</td><td nowrap=\"nowrap\">C</td>"));
    }

    #[test]
    fn test_insert_and_delete_are_marked() {
        let html = table("A\nB\n", "A\nB\nC\n", false);
        assert!(html.contains("<span class=\"diff_add\">C</span>"));
        assert!(!html.contains("diff_sub\">"));

        let html = table("A\nB\nC\n", "A\nC\n", false);
        assert!(html.contains("<span class=\"diff_sub\">B</span>"));
    }

    #[test]
    fn test_long_lines_wrap_at_column() {
        let long = "x".repeat(170);
        let diff = HtmlDiff::new().with_wrap_column(80);
        let html = diff.make_table(&[long.as_str()], &[long.as_str()], "a", "b", false, 5);

        // 170 chars wrap into 80 + 80 + 10 on both sides.
        assert_eq!(html.matches("<tr><td").count(), 3);
        assert_eq!(html.matches("<td class=\"diff_header\">&gt;</td>").count(), 4);
        assert!(html.contains(&format!(">{}</td>", "x".repeat(80))));
        assert!(html.contains(&format!(">{}</td>", "x".repeat(10))));
    }

    #[test]
    fn test_context_mode_without_differences() {
        let html = table("A\nB\n", "A\nB\n", true);
        assert!(html.contains("No Differences Found"));
    }

    #[test]
    fn test_full_mode_empty_inputs() {
        let html = table("", "", false);
        assert!(html.contains("Empty File"));
    }

    #[test]
    fn test_context_mode_hides_distant_lines() {
        let from: String = (0..40).map(|i| format!("line {}\n", i)).collect();
        let to = from.replace("line 20\n", "line twenty\n");

        let context = table(&from, &to, true);
        assert!(!context.contains(">line&nbsp;1</td>"));
        assert!(context.contains("line&nbsp;15"));

        let full = table(&from, &to, false);
        assert!(full.contains(">line&nbsp;1</td>"));
        assert!(full.contains(">line&nbsp;39</td>"));
    }

    #[test]
    fn test_line_ending_difference_is_visible() {
        let html = table("A\r\n", "A\n", false);
        assert!(html.contains("<span class=\"diff_chg\">\\r\\n</span>"));
        assert!(html.contains("<span class=\"diff_chg\">\\n</span>"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let html = table("<a & b>\n", "<a & c>\n", false);
        assert!(html.contains("&lt;a&nbsp;&amp;&nbsp;"));
        assert!(!html.contains("<a &"));
    }

    #[test]
    fn test_tabs_expand_to_tab_stops() {
        let diff = HtmlDiff::new().with_tab_size(4);
        assert_eq!(diff.expand_tabs("a\tb"), "a   b");
        assert_eq!(diff.expand_tabs("\t"), "    ");
    }

    #[test]
    fn test_navigation_links() {
        let html = table("A\nB\nC\n", "A\nX\nC\n", false);
        assert!(html.contains("id=\"change_0\""));
        assert!(html.contains("<a href=\"#change_0\">f</a>"));
        assert!(html.contains("<a href=\"#change_top\">t</a>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let diff = HtmlDiff::new().with_wrap_column(80);
        let a = split_lines("A\nB\n");
        let b = split_lines("A\nC\n");
        assert_eq!(
            diff.make_file(&a, &b, "a", "b", false, 5),
            diff.make_file(&a, &b, "a", "b", false, 5)
        );
    }
}
