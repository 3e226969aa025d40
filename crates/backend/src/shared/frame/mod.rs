//! Tabular layer of the training and prediction pipelines, on polars.
//!
//! A sheet is kept as uploaded text (`RawTable`) and re-read with polars
//! schema inference when the pipelines need typed columns. Text columns
//! holding at least one value are categorical; integer, float, boolean and
//! empty columns are numeric.

pub mod raw_table;

pub use raw_table::RawTable;

use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{name}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn is_text(column: &Column) -> bool {
    matches!(column.dtype(), DataType::String)
}

/// Text column with at least one value
pub fn is_categorical(column: &Column) -> bool {
    let series = column.as_materialized_series();
    is_text(column) && series.null_count() < series.len()
}

/// Values cast to f64; nulls and NaN/inf are `None`
pub fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>, FrameError> {
    let values = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Cells as text: strings as read, numbers without a trailing fraction
pub fn text_values(column: &Column) -> Result<Vec<Option<String>>, FrameError> {
    if is_text(column) {
        let cells = column.as_materialized_series().str()?;
        return Ok(cells.into_iter().map(|c| c.map(str::to_string)).collect());
    }
    Ok(numeric_values(column)?
        .into_iter()
        .map(|v| v.map(format_number))
        .collect())
}

/// Renames every column through `f`; fails if two names collide
pub fn rename_with<F>(frame: &DataFrame, f: F) -> Result<DataFrame, FrameError>
where
    F: Fn(&str) -> String,
{
    let mut seen = HashSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(frame.width());
    for column in frame.get_columns() {
        let name = f(column.name().as_str());
        if !seen.insert(name.clone()) {
            return Err(FrameError::DuplicateColumn(name));
        }
        let series = column.as_materialized_series().clone().with_name(name.into());
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

pub fn rename(frame: &DataFrame, from: &str, to: &str) -> Result<DataFrame, FrameError> {
    if frame.get_column_index(from).is_none() {
        return Err(FrameError::MissingColumn(from.to_string()));
    }
    rename_with(frame, |name| {
        if name == from {
            to.to_string()
        } else {
            name.to_string()
        }
    })
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Boutique".into(), &[Some("A"), None, Some("B")]).into(),
            Series::new("Quantite".into(), &[Some(2i64), None, Some(1)]).into(),
            Series::new("Vide".into(), &[None::<&str>, None, None]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn text_with_values_is_categorical() {
        let frame = frame();
        assert!(is_categorical(frame.column("Boutique").unwrap()));
        assert!(!is_categorical(frame.column("Quantite").unwrap()));
        // an empty text column carries no categories
        assert!(!is_categorical(frame.column("Vide").unwrap()));
    }

    #[test]
    fn numbers_read_as_text_and_floats() {
        let frame = frame();
        let quantity = frame.column("Quantite").unwrap();
        assert_eq!(numeric_values(quantity).unwrap(), vec![Some(2.0), None, Some(1.0)]);
        assert_eq!(
            text_values(quantity).unwrap(),
            vec![Some("2".to_string()), None, Some("1".to_string())]
        );
    }

    #[test]
    fn rename_with_detects_collisions() {
        let frame = DataFrame::new(vec![
            Series::new("a b".into(), &[1.0]).into(),
            Series::new("a_b".into(), &[2.0]).into(),
        ])
        .unwrap();
        let err = rename_with(&frame, |n| n.replace(' ', "_")).unwrap_err();
        assert!(matches!(err, FrameError::DuplicateColumn(name) if name == "a_b"));
    }

    #[test]
    fn rename_keeps_order_and_data() {
        let renamed = rename(&frame(), "Quantite", "quantite").unwrap();
        assert_eq!(column_names(&renamed), vec!["Boutique", "quantite", "Vide"]);
        assert_eq!(
            numeric_values(renamed.column("quantite").unwrap()).unwrap(),
            vec![Some(2.0), None, Some(1.0)]
        );
        assert!(matches!(
            rename(&frame(), "missing", "x"),
            Err(FrameError::MissingColumn(_))
        ));
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-999.0), "-999");
        assert_eq!(format_number(2.5), "2.5");
    }
}
