// Chart view models derived from a dataset record
use super::dataset::DatasetRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    pub fn new(title: impl Into<String>, kind: ChartKind, points: Vec<ChartPoint>) -> Self {
        Self {
            title: title.into(),
            kind,
            points,
        }
    }

    /// Largest value in the chart, never below zero so the axis starts at 0.
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }

    /// Bar chart of equipment counts per type
    pub fn type_distribution(record: &DatasetRecord) -> Self {
        let points = record
            .summary
            .ranked_distribution()
            .into_iter()
            .map(|(label, count)| ChartPoint::new(label, count as f64))
            .collect();
        Self::new("Type Distribution", ChartKind::Bar, points)
    }

    /// Line through the three column averages
    pub fn averages(record: &DatasetRecord) -> Self {
        let summary = &record.summary;
        Self::new(
            "Averages",
            ChartKind::Line,
            vec![
                ChartPoint::new("Flowrate", summary.avg_flowrate),
                ChartPoint::new("Pressure", summary.avg_pressure),
                ChartPoint::new("Temperature", summary.avg_temperature),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{DatasetId, DatasetSummary};
    use chrono::Utc;

    fn record_with(summary: DatasetSummary) -> DatasetRecord {
        DatasetRecord {
            id: DatasetId(1),
            uploaded_at: Utc::now(),
            artifact: None,
            summary,
        }
    }

    #[test]
    fn test_averages_chart_keeps_column_order() {
        let mut summary = DatasetSummary::empty();
        summary.avg_flowrate = 20.0;
        summary.avg_pressure = 7.0;
        summary.avg_temperature = 22.0;

        let chart = ChartData::averages(&record_with(summary));

        assert_eq!(chart.kind, ChartKind::Line);
        let labels: Vec<&str> = chart.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Flowrate", "Pressure", "Temperature"]);
        assert_eq!(chart.max_value(), 22.0);
    }

    #[test]
    fn test_distribution_chart_of_empty_upload() {
        let chart = ChartData::type_distribution(&record_with(DatasetSummary::empty()));

        assert_eq!(chart.kind, ChartKind::Bar);
        assert!(chart.points.is_empty());
        assert_eq!(chart.max_value(), 0.0);
    }
}
