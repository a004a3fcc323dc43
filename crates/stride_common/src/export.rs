//! Solved-problems CSV export.
//!
//! Spreadsheet tools expect a UTF-8 BOM, so the output starts with one.

use chrono::SecondsFormat;

use crate::progress::Progress;

const HEADER: [&str; 6] = ["Step", "Topic", "Problem", "Difficulty", "LeetCode", "CompletedAt"];
const BOM: &str = "\u{feff}";

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut row = fields.into_iter().map(csv_field).collect::<Vec<_>>().join(",");
    row.push_str("\r\n");
    row
}

/// One row per completed problem, in tree order
pub fn export_solved_csv(progress: &Progress) -> String {
    let mut out = String::from(BOM);
    out.push_str(&csv_row(HEADER));

    for (step, topic, problem) in progress.problems().filter(|(_, _, p)| p.completed) {
        let completed_at = problem
            .completed_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        out.push_str(&csv_row([
            step.name.as_str(),
            topic.name.as_str(),
            problem.name.as_str(),
            problem.difficulty.as_str(),
            problem.external_link.as_str(),
            completed_at.as_str(),
        ]));
    }
    out
}
