//! Fixed-width terminal rendering.
//!
//! Formatting lives in one place so the tree code stays free of presentation
//! concerns and output changes stay localized.

use crate::report::{DistributionTable, RunReport, WirpRow};

const DATE_WIDTH: usize = 10;
const MIN_VALUE_WIDTH: usize = 9;

/// Format the run header (inputs, conventions, diagnostics).
pub fn format_run_summary(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str("=== ratepath - implied policy-rate distribution ===\n");
    out.push_str(&format!("Generated: {}\n", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!("Target rate: {:.4}\n", report.target_rate));
    out.push_str(&format!(
        "Step: {:.4} | zero change: {:?}\n",
        report.step.value(),
        report.zero_change
    ));
    if let (Some(first), Some(last)) = (report.quotes.first(), report.quotes.last()) {
        out.push_str(&format!(
            "Quotes: n={} | {} .. {}\n",
            report.quotes.len(),
            first.date,
            last.date
        ));
    }
    out.push_str(&format!(
        "Buckets: {} | decision dates: {}\n",
        report.distributions.buckets.columns.len(),
        report.distributions.buckets.rows.len()
    ));

    for w in &report.warnings {
        out.push_str(&format!(
            "  (warning) mass at {} sums to {:.9}, not 1\n",
            w.date, w.total
        ));
    }
    out.push('\n');

    out
}

/// Format the raw delta view.
pub fn format_wirp(rows: &[WirpRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<DATE_WIDTH$} {:>10} {:>10} {:>10} {:>10}\n",
            "date", "implied", "change", "#hike/cut", "%hike/cut"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<DATE_WIDTH$} {:-<10} {:-<10} {:-<10} {:-<10}",
        "", "", "", "", ""
    ));
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<DATE_WIDTH$} {:>10.4} {:>10} {:>10.3} {:>10}\n",
                r.date.to_string(),
                r.implied_rate,
                fmt_opt(r.rate_change, 4),
                r.step_count,
                fmt_opt(r.percent_step_change, 1),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a bucketed or cumulative table under a title line.
pub fn format_distribution(title: &str, table: &DistributionTable) -> String {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|c| c.label.len().max(MIN_VALUE_WIDTH))
        .collect();
    let precision = table.precision as usize;

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');

    let mut header = format!("{:<DATE_WIDTH$}", "date");
    let mut rule = "-".repeat(DATE_WIDTH);
    for (c, w) in table.columns.iter().zip(widths.iter().copied()) {
        header.push_str(&format!(" {:>w$}", c.label));
        rule.push(' ');
        rule.push_str(&"-".repeat(w));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for row in &table.rows {
        let mut line = format!("{:<DATE_WIDTH$}", row.date.to_string());
        for (v, w) in row.values.iter().zip(widths.iter().copied()) {
            line.push_str(&format!(" {v:>w$.precision$}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => "-".to_string(),
    }
}
