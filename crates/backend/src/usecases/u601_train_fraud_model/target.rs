use polars::prelude::*;
use thiserror::Error;

use crate::shared::frame::{format_number, is_text, numeric_values, text_values, FrameError};

const POSITIVE: &[&str] = &["1", "true", "yes", "oui", "vrai"];
const NEGATIVE: &[&str] = &["0", "false", "no", "non", "faux"];

#[derive(Debug, Error)]
pub enum LabelError {
    /// `row` counts data rows from 1, the header excluded
    #[error("data row {row}: '{value}' is not a 0/1 label")]
    Invalid { row: usize, value: String },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Приведение целевой колонки к 0/1.
///
/// Числа: 0 -> 0, любое другое целое -> 1, дробные значения недопустимы.
/// Текст: true/yes/oui/1 и false/no/non/0 без учета регистра.
/// Пустая ячейка недопустима.
pub fn coerce_labels(column: &Column) -> Result<Vec<u8>, LabelError> {
    if is_text(column) {
        return text_values(column)?
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let text = value.as_deref().unwrap_or("").trim().to_lowercase();
                if POSITIVE.contains(&text.as_str()) {
                    Ok(1)
                } else if NEGATIVE.contains(&text.as_str()) {
                    Ok(0)
                } else {
                    Err(LabelError::Invalid {
                        row: idx + 1,
                        value: value.unwrap_or_default(),
                    })
                }
            })
            .collect();
    }
    numeric_values(column)?
        .into_iter()
        .enumerate()
        .map(|(idx, value)| match value {
            Some(v) if v == 0.0 => Ok(0),
            Some(v) if v.fract() == 0.0 => Ok(1),
            other => Err(LabelError::Invalid {
                row: idx + 1,
                value: other.map(format_number).unwrap_or_default(),
            }),
        })
        .collect()
}

/// Краткая сводка для лога: "n0 / n1"
pub fn class_balance(labels: &[u8]) -> String {
    let positives = labels.iter().filter(|&&y| y == 1).count();
    format!(
        "{} legit / {} fake",
        format_number((labels.len() - positives) as f64),
        format_number(positives as f64)
    )
}
