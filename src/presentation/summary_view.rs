// Plain-text rendering of dataset summaries for the terminal client
use crate::domain::chart::{ChartData, ChartKind};
use crate::domain::dataset::DatasetRecord;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 40;

/// One line per upload, as shown in the history list
pub fn history_line(record: &DatasetRecord) -> String {
    format!(
        "Dataset {} - {}",
        record.id,
        record.uploaded_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Labels, distribution table and both charts for one record
pub fn render_summary(record: &DatasetRecord) -> String {
    let summary = &record.summary;
    let mut out = String::new();

    let _ = writeln!(out, "{}", history_line(record));
    let _ = writeln!(out, "Total count: {}", summary.total_count);
    let _ = writeln!(out, "Avg flowrate: {:.2}", summary.avg_flowrate);
    let _ = writeln!(out, "Avg pressure: {:.2}", summary.avg_pressure);
    let _ = writeln!(out, "Avg temperature: {:.2}", summary.avg_temperature);
    out.push('\n');

    out.push_str(&render_chart(&ChartData::type_distribution(record)));
    out.push('\n');
    out.push_str(&render_chart(&ChartData::averages(record)));
    out
}

/// Horizontal text chart. Bars are scaled to the largest value; line
/// charts mark each point with `*` at its scaled position.
pub fn render_chart(chart: &ChartData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart.title);

    if chart.points.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }

    let label_width = chart
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = chart.max_value();

    for point in &chart.points {
        let width = if max > 0.0 {
            ((point.value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };

        let mark = match chart.kind {
            ChartKind::Bar => "#".repeat(width),
            ChartKind::Line => format!("{}*", " ".repeat(width.saturating_sub(1))),
        };

        let value = match chart.kind {
            ChartKind::Bar => format!("{}", point.value),
            ChartKind::Line => format!("{:.2}", point.value),
        };

        let _ = writeln!(
            out,
            "  {:<label_width$} | {:<bar$} {}",
            point.label,
            mark,
            value,
            label_width = label_width,
            bar = BAR_WIDTH
        );
    }

    out
}
