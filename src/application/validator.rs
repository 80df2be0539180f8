// Validator - checks an upload parses as CSV and carries the required columns
use crate::domain::error::DatasetError;
use csv::{ReaderBuilder, StringRecord};

pub const FLOWRATE: &str = "flowrate";
pub const PRESSURE: &str = "pressure";
pub const TEMPERATURE: &str = "temperature";
pub const TYPE: &str = "type";

/// Required header names, matched case-sensitively.
pub const REQUIRED_COLUMNS: [&str; 4] = [FLOWRATE, PRESSURE, TEMPERATURE, TYPE];

/// Positions of the required columns within each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub flowrate: usize,
    pub pressure: usize,
    pub temperature: usize,
    pub equipment_type: usize,
}

/// A parsed table whose header contains every required column.
#[derive(Debug, Clone)]
pub struct ValidatedTable {
    pub columns: ColumnIndex,
    pub rows: Vec<StringRecord>,
}

impl ValidatedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse `contents` as CSV with a header row and check the required columns.
pub fn validate(contents: &[u8]) -> Result<ValidatedTable, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(contents);

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::MalformedInput(e.to_string()))?
        .clone();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DatasetError::MalformedInput(
            "No columns to parse from file".to_string(),
        ));
    }

    let columns = locate_columns(&headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| DatasetError::MalformedInput(e.to_string()))?;
        if row.len() > headers.len() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(DatasetError::MalformedInput(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                line,
                row.len()
            )));
        }
        rows.push(row);
    }

    tracing::debug!("Validated CSV with {} rows", rows.len());
    Ok(ValidatedTable { columns, rows })
}

fn locate_columns(headers: &StringRecord) -> Result<ColumnIndex, DatasetError> {
    let position = |name: &str| headers.iter().position(|h| h == name);

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&name| position(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        missing.sort();
        return Err(DatasetError::MissingColumns(missing));
    }

    // Every column was found above.
    let index = |name: &str| position(name).unwrap_or_default();
    Ok(ColumnIndex {
        flowrate: index(FLOWRATE),
        pressure: index(PRESSURE),
        temperature: index(TEMPERATURE),
        equipment_type: index(TYPE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_columns(csv: &str) -> Vec<String> {
        match validate(csv.as_bytes()) {
            Err(DatasetError::MissingColumns(missing)) => missing,
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_required_columns_in_any_order() {
        let table = validate(b"type,temperature,extra,pressure,flowrate\nPump,20,x,5,10\n").unwrap();

        assert_eq!(
            table.columns,
            ColumnIndex {
                flowrate: 4,
                pressure: 3,
                temperature: 1,
                equipment_type: 0,
            }
        );
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_names_the_missing_type_column() {
        assert_eq!(
            missing_columns("flowrate,pressure,temperature\n1,2,3\n"),
            vec!["type"]
        );
    }

    #[test]
    fn test_lists_every_missing_column_sorted() {
        assert_eq!(
            missing_columns("type,flowrate\nPump,1\n"),
            vec!["pressure", "temperature"]
        );
        assert_eq!(
            missing_columns("name\nx\n"),
            vec!["flowrate", "pressure", "temperature", "type"]
        );
    }

    #[test]
    fn test_header_names_are_case_sensitive() {
        assert_eq!(
            missing_columns("Flowrate,pressure,temperature,TYPE\n1,2,3,Pump\n"),
            vec!["flowrate", "type"]
        );
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = validate(b"").unwrap_err();
        assert!(matches!(err, DatasetError::MalformedInput(_)));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = validate(b"flowrate,pressure,temperature,type\n1,2,3,\xff\xfe\n").unwrap_err();
        assert!(matches!(err, DatasetError::MalformedInput(_)));
    }

    #[test]
    fn test_row_with_extra_fields_is_malformed() {
        let err = validate(b"flowrate,pressure,temperature,type\n1,2,3,Pump,surplus\n").unwrap_err();
        match err {
            DatasetError::MalformedInput(reason) => assert!(reason.contains("line 2"), "{}", reason),
            other => panic!("expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_short_rows_are_kept() {
        let table = validate(b"flowrate,pressure,temperature,type\n1,2\n").unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].get(table.columns.equipment_type), None);
    }

    #[test]
    fn test_header_only_table_has_no_rows() {
        let table = validate(b"flowrate,pressure,temperature,type\n").unwrap();
        assert_eq!(table.row_count(), 0);
    }
}
