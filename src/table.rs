//! Plain-text table rendering for terminal output.
//!
//! Column widths are measured in terminal cells as reported by `unicode-width`;
//! ANSI color sequences take none.

use std::borrow::Cow;
use std::fmt::Write as _;

use unicode_width::UnicodeWidthStr;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_cells = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator_cells, &separator_widths));

    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }

    output
}

pub fn print_rows(headers: &[&str], rows: &[Vec<String>]) {
    let headers = headers
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<_>>();
    print!("{}", render_table(&headers, rows));
}

/// Formats an optional statistic, printing `n/a` for "not available".
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(value);
        let display = display_width(sanitized.as_ref());
        let mut cell = sanitized.into_owned();
        let padding = widths[idx].saturating_sub(display);
        if padding > 0 {
            cell.push_str(&" ".repeat(padding));
        }
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

pub fn display_width(value: &str) -> usize {
    if !value.contains('\u{1b}') {
        return UnicodeWidthStr::width(value);
    }
    let mut width = 0usize;
    let mut rest = value;
    while let Some(escape) = rest.find('\u{1b}') {
        width += UnicodeWidthStr::width(&rest[..escape]);
        rest = match rest[escape..].find('m') {
            Some(end) => &rest[escape + end + 1..],
            None => "",
        };
    }
    width + UnicodeWidthStr::width(rest)
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn hangul_counts_as_two_cells() {
        assert_eq!(display_width("긴장도"), 6);
        assert_eq!(display_width("n/a"), 3);
    }

    #[test]
    fn emoji_take_two_cells() {
        assert_eq!(display_width("⭐"), 2);
        assert_eq!(display_width("✅"), 2);
        assert_eq!(display_width("🚀"), 2);
        assert_eq!(display_width("⭐ ok"), 5);
    }

    #[test]
    fn ansi_color_sequences_have_no_width() {
        assert_eq!(display_width("\u{1b}[31m긴장도\u{1b}[0m"), 6);
        assert_eq!(display_width("\u{1b}[1mn/a"), 3);
    }

    #[test]
    fn emoji_cells_stay_aligned() {
        let rendered = render_table(
            &strings(&["mark", "item"]),
            &[strings(&["🚀", "a"]), strings(&["ok", "b"])],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], "🚀    a");
        assert_eq!(lines[3], "ok    b");
    }

    #[test]
    fn render_table_aligns_mixed_scripts() {
        let rendered = render_table(
            &strings(&["item", "mean"]),
            &[strings(&["긴장도", "2.50"]), strings(&["focus", "3.00"])],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "item    mean");
        assert_eq!(lines[1], "------  ----");
        assert_eq!(lines[2], "긴장도  2.50");
        assert_eq!(lines[3], "focus   3.00");
    }

    #[test]
    fn control_characters_become_spaces() {
        let rendered = render_table(&strings(&["note"]), &[strings(&["a\nb\tc"])]);
        assert_eq!(rendered.lines().nth(2), Some("a b c"));
    }

    #[test]
    fn optional_values_render_not_available() {
        assert_eq!(format_optional(Some(1.5), 2), "1.50");
        assert_eq!(format_optional(None, 2), "n/a");
    }
}
