// Aggregator - summary statistics over a validated table
use crate::application::validator::{ValidatedTable, FLOWRATE, PRESSURE, TEMPERATURE};
use crate::domain::dataset::DatasetSummary;
use crate::domain::error::DatasetError;
use csv::StringRecord;
use std::collections::BTreeMap;

/// Running mean over the present values of one numeric column. Updated
/// incrementally so large finite readings do not overflow a running sum.
#[derive(Debug, Default)]
struct ColumnMean {
    mean: f64,
    present: u64,
}

impl ColumnMean {
    fn add(&mut self, column: &str, row: &StringRecord, index: usize) -> Result<(), DatasetError> {
        let raw = row.get(index).unwrap_or("");
        let cell = raw.trim();

        // Empty cells are missing values and do not take part in the mean
        if cell.is_empty() {
            return Ok(());
        }

        let value: f64 = cell.parse().map_err(|_| non_numeric(column, row, raw))?;
        if !value.is_finite() {
            return Err(non_numeric(column, row, raw));
        }

        self.present += 1;
        self.mean += (value - self.mean) / self.present as f64;
        if !self.mean.is_finite() {
            return Err(DatasetError::Aggregation(format!(
                "mean of column '{}' is out of range at line {}",
                column,
                line_of(row)
            )));
        }
        Ok(())
    }

    fn mean(&self) -> f64 {
        self.mean
    }
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or_default()
}

fn non_numeric(column: &str, row: &StringRecord, raw: &str) -> DatasetError {
    DatasetError::Aggregation(format!(
        "column '{}' has non-numeric value '{}' on line {}",
        column,
        raw,
        line_of(row)
    ))
}

/// Compute the record's statistics. Every row counts toward `total_count`;
/// `type` labels are counted exactly as written.
pub fn aggregate(table: &ValidatedTable) -> Result<DatasetSummary, DatasetError> {
    if table.rows.is_empty() {
        return Ok(DatasetSummary::empty());
    }

    let columns = table.columns;
    let mut flowrate = ColumnMean::default();
    let mut pressure = ColumnMean::default();
    let mut temperature = ColumnMean::default();
    let mut type_distribution: BTreeMap<String, u64> = BTreeMap::new();

    for row in &table.rows {
        flowrate.add(FLOWRATE, row, columns.flowrate)?;
        pressure.add(PRESSURE, row, columns.pressure)?;
        temperature.add(TEMPERATURE, row, columns.temperature)?;

        let label = row.get(columns.equipment_type).unwrap_or("");
        *type_distribution.entry(label.to_string()).or_insert(0) += 1;
    }

    let summary = DatasetSummary {
        total_count: table.row_count() as u64,
        avg_flowrate: flowrate.mean(),
        avg_pressure: pressure.mean(),
        avg_temperature: temperature.mean(),
        type_distribution,
    };

    tracing::debug!(
        "Aggregated {} rows into {} equipment types",
        summary.total_count,
        summary.type_distribution.len()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::validator::validate;
    use pretty_assertions::assert_eq;

    fn summarize(csv: &str) -> Result<DatasetSummary, DatasetError> {
        aggregate(&validate(csv.as_bytes()).unwrap())
    }

    #[test]
    fn test_pump_and_valve_readings() {
        let summary = summarize(
            "flowrate,pressure,temperature,type\n\
             10,5,20,Pump\n\
             20,7,22,Pump\n\
             30,9,24,Valve\n",
        )
        .unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("Pump".to_string(), 2);
        expected.insert("Valve".to_string(), 1);

        assert_eq!(
            summary,
            DatasetSummary {
                total_count: 3,
                avg_flowrate: 20.0,
                avg_pressure: 7.0,
                avg_temperature: 22.0,
                type_distribution: expected,
            }
        );
    }

    #[test]
    fn test_zero_rows_yield_zero_averages() {
        let summary = summarize("flowrate,pressure,temperature,type\n").unwrap();
        assert_eq!(summary, DatasetSummary::empty());
    }

    #[test]
    fn test_labels_are_not_normalized() {
        let summary = summarize(
            "flowrate,pressure,temperature,type\n\
             1,1,1,Pump\n\
             1,1,1,pump\n\
             1,1,1,Pump \n\
             1,1,1,Pump\n",
        )
        .unwrap();

        assert_eq!(summary.type_distribution.len(), 3);
        assert_eq!(summary.type_distribution["Pump"], 2);
        assert_eq!(summary.type_distribution["pump"], 1);
        assert_eq!(summary.type_distribution["Pump "], 1);
    }

    #[test]
    fn test_total_matches_distribution_with_missing_cells() {
        let summary = summarize(
            "flowrate,pressure,temperature,type\n\
             10,,20,Pump\n\
             ,4,22,\n\
             30,6\n",
        )
        .unwrap();

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.type_distribution.values().sum::<u64>(), 3);
        assert_eq!(summary.type_distribution[""], 2);
        assert_eq!(summary.avg_flowrate, 20.0);
        assert_eq!(summary.avg_pressure, 5.0);
        assert_eq!(summary.avg_temperature, 21.0);
    }

    #[test]
    fn test_column_without_values_averages_to_zero() {
        let summary = summarize("flowrate,pressure,temperature,type\n1,,3,Pump\n").unwrap();
        assert_eq!(summary.avg_pressure, 0.0);
    }

    #[test]
    fn test_numeric_cells_are_trimmed() {
        let summary = summarize("flowrate,pressure,temperature,type\n 1.5 ,2e1,-3,Pump\n").unwrap();
        assert_eq!(summary.avg_flowrate, 1.5);
        assert_eq!(summary.avg_pressure, 20.0);
        assert_eq!(summary.avg_temperature, -3.0);
    }

    #[test]
    fn test_non_numeric_value_fails() {
        let err = summarize("flowrate,pressure,temperature,type\n10,5,20,Pump\nfast,5,20,Pump\n")
            .unwrap_err();

        match err {
            DatasetError::Aggregation(message) => {
                assert!(message.contains("'flowrate'"), "{}", message);
                assert!(message.contains("'fast'"), "{}", message);
                assert!(message.contains("line 3"), "{}", message);
            }
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_large_finite_values_average_without_overflow() {
        let summary = summarize(
            "flowrate,pressure,temperature,type\n\
             1e308,1,1,Pump\n\
             1e308,3,1,Pump\n",
        )
        .unwrap();

        assert_eq!(summary.avg_flowrate, 1e308);
        assert_eq!(summary.avg_pressure, 2.0);
        assert!(serde_json::to_string(&summary).unwrap().contains("1e308"));
    }

    #[test]
    fn test_mean_out_of_range_fails() {
        let err = summarize(
            "flowrate,pressure,temperature,type\n\
             -1.7e308,1,1,Pump\n\
             1.7e308,1,1,Pump\n",
        )
        .unwrap_err();

        match err {
            DatasetError::Aggregation(message) => {
                assert!(message.contains("'flowrate'"), "{}", message);
                assert!(message.contains("out of range"), "{}", message);
            }
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_value_fails() {
        let err = summarize("flowrate,pressure,temperature,type\n10,NaN,20,Pump\n").unwrap_err();
        assert!(matches!(err, DatasetError::Aggregation(_)));

        let err = summarize("flowrate,pressure,temperature,type\n10,5,inf,Pump\n").unwrap_err();
        assert!(matches!(err, DatasetError::Aggregation(_)));
    }
}
