use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use super::{column_names, FrameError};

/// Sheet as it was read: every cell kept as its original text.
///
/// The prediction export is written from this table so the uploaded
/// columns come back unchanged, only the prediction column is new.
/// Empty cells are null.
#[derive(Debug, Clone)]
pub struct RawTable {
    frame: DataFrame,
}

/// `Some(0)` reads every column as text, `None` infers from all rows
fn read_csv(bytes: &[u8], infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

impl RawTable {
    /// A row with more cells than the header is rejected, cells are never shifted
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        // Strip UTF-8 BOM if present
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let frame = read_csv(bytes, Some(0))?;
        Ok(Self { frame })
    }

    pub fn from_path(path: &Path) -> Result<Self, FrameError> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(&bytes)
    }

    /// Builds the table from a client-parsed sheet (header -> cell maps)
    pub fn from_sheet(
        headers: &[String],
        rows: &[HashMap<String, String>],
    ) -> Result<Self, FrameError> {
        let columns: Vec<Column> = headers
            .iter()
            .map(|header| {
                let cells: Vec<Option<&str>> = rows
                    .iter()
                    .map(|row| row.get(header).map(String::as_str).filter(|c| !c.is_empty()))
                    .collect();
                Series::new(header.as_str().into(), cells).into()
            })
            .collect();
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn headers(&self) -> Vec<String> {
        column_names(&self.frame)
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Trimmed cell text of a column; empty cells are `None`
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let cells = self
            .frame
            .column(name)
            .ok()?
            .as_materialized_series()
            .str()
            .ok()?;
        Some(
            cells
                .into_iter()
                .map(|cell| cell.map(str::trim).filter(|cell| !cell.is_empty()))
                .collect(),
        )
    }

    /// Typed copy: polars infers integer, float and boolean columns from
    /// every row, anything else stays text
    pub fn typed(&self) -> Result<DataFrame, FrameError> {
        let bytes = self.to_csv_bytes()?;
        Ok(read_csv(&bytes, None)?)
    }

    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Result<Self, FrameError> {
        if values.len() != self.row_count() {
            return Err(FrameError::LengthMismatch {
                name: name.to_string(),
                expected: self.row_count(),
                actual: values.len(),
            });
        }
        if self.has_column(name) {
            return Err(FrameError::DuplicateColumn(name.to_string()));
        }
        self.frame.with_column(Series::new(name.into(), values))?;
        Ok(self)
    }

    fn to_csv_bytes(&self) -> Result<Vec<u8>, FrameError> {
        let mut frame = self.frame.clone();
        let mut buffer = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .finish(&mut frame)?;
        Ok(buffer)
    }

    pub fn to_csv(&self) -> Result<String, FrameError> {
        let bytes = self.to_csv_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::{is_categorical, numeric_values};

    #[test]
    fn reads_csv_with_bom_as_text() {
        let csv = "\u{FEFF}Boutique,Quantite,Montant_Total\nShopA,2,3500.50\nShopB,1,\n";
        let table = RawTable::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.headers(), vec!["Boutique", "Quantite", "Montant_Total"]);
        assert_eq!(
            table.column("Montant_Total").unwrap(),
            vec![Some("3500.50"), None]
        );

        let typed = table.typed().unwrap();
        assert_eq!(typed.height(), 2);
        assert!(!is_categorical(typed.column("Quantite").unwrap()));
        assert!(is_categorical(typed.column("Boutique").unwrap()));
        assert_eq!(
            numeric_values(typed.column("Montant_Total").unwrap()).unwrap(),
            vec![Some(3500.5), None]
        );
    }

    #[test]
    fn row_longer_than_header_is_rejected() {
        let csv = "Nom_Complet,Quantite,Montant_Total\nJane,3,1500\nDoe, John,3,1500\n";
        assert!(RawTable::from_csv_bytes(csv.as_bytes()).is_err());
    }

    #[test]
    fn appended_column_keeps_original_cells() {
        let csv = "SKU,Montant_Total\nA-01,3500.50\nB-02,0010\n";
        let table = RawTable::from_csv_bytes(csv.as_bytes())
            .unwrap()
            .with_column("Prediction_Fraude", vec!["1".into(), "0".into()])
            .unwrap();
        assert_eq!(
            table.to_csv().unwrap(),
            "SKU,Montant_Total,Prediction_Fraude\nA-01,3500.50,1\nB-02,0010,0\n"
        );
    }

    #[test]
    fn sheet_rows_follow_header_order() {
        let headers = vec!["b".to_string(), "a".to_string()];
        let mut row = HashMap::new();
        row.insert("a".to_string(), "1".to_string());
        let table = RawTable::from_sheet(&headers, &[row]).unwrap();
        assert_eq!(table.headers(), headers);
        assert_eq!(table.column("b").unwrap(), vec![None]);
        assert_eq!(table.column("a").unwrap(), vec![Some("1")]);
    }

    #[test]
    fn duplicate_prediction_column_is_rejected() {
        let table = RawTable::from_csv_bytes(b"x\n1\n").unwrap();
        assert!(table.with_column("x", vec!["0".into()]).is_err());
    }
}
