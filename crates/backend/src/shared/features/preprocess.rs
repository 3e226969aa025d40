use contracts::shared::order_schema::{CATEGORICAL_MISSING, NUMERIC_MISSING};
use polars::prelude::*;

use super::{FeatureFrame, OrdinalEncoder, PipelineError};
use crate::shared::frame::{is_categorical, numeric_values, text_values, FrameError};

/// What to do with categorical columns
#[derive(Debug, Clone, Copy)]
pub enum EncoderMode<'a> {
    /// Training: learn a new encoder from the categorical columns
    Fit,
    /// Inference: apply the persisted encoder, if one was saved
    Apply(Option<&'a OrdinalEncoder>),
}

#[derive(Debug, Clone)]
pub struct PreparedFeatures {
    pub features: FeatureFrame,
    /// Set only in `Fit` mode when categorical columns were present
    pub fitted_encoder: Option<OrdinalEncoder>,
}

fn category_cells(column: &Column) -> Result<Vec<String>, FrameError> {
    Ok(text_values(column)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| CATEGORICAL_MISSING.to_string()))
        .collect())
}

/// Imputes missing values, encodes categorical columns and casts to f64.
///
/// Numeric gaps become `-999`, text gaps become `"NA"` before encoding.
/// Column order of the input frame is preserved.
pub fn prepare_features(
    frame: &DataFrame,
    mode: EncoderMode<'_>,
) -> Result<PreparedFeatures, PipelineError> {
    let fitted_encoder = match mode {
        EncoderMode::Fit => {
            let categorical = frame
                .get_columns()
                .iter()
                .filter(|column| is_categorical(column))
                .map(|column| Ok((column.name().to_string(), category_cells(column)?)))
                .collect::<Result<Vec<_>, FrameError>>()?;
            if categorical.is_empty() {
                None
            } else {
                Some(OrdinalEncoder::fit(
                    categorical
                        .iter()
                        .map(|(name, values)| (name.as_str(), values.as_slice())),
                ))
            }
        }
        EncoderMode::Apply(_) => None,
    };
    let encoder = match mode {
        EncoderMode::Fit => fitted_encoder.as_ref(),
        EncoderMode::Apply(encoder) => encoder,
    };

    let mut names = Vec::with_capacity(frame.width());
    let mut columns = Vec::with_capacity(frame.width());

    for column in frame.get_columns() {
        let name = column.name().as_str();
        let values: Vec<f64> = if is_categorical(column) {
            let encoder =
                encoder.ok_or_else(|| PipelineError::UnencodedCategorical(name.to_string()))?;
            encoder
                .transform(name, &category_cells(column)?)
                .ok_or_else(|| PipelineError::UnknownCategoricalColumn(name.to_string()))?
        } else {
            match encoder {
                // categorical at training time, numeric in this file
                Some(encoder) if encoder.knows_column(name) => encoder
                    .transform(name, &category_cells(column)?)
                    .ok_or_else(|| PipelineError::UnknownCategoricalColumn(name.to_string()))?,
                _ => numeric_values(column)?
                    .into_iter()
                    .map(|v| v.unwrap_or(NUMERIC_MISSING))
                    .collect(),
            }
        };
        names.push(name.to_string());
        columns.push(values);
    }

    Ok(PreparedFeatures {
        features: FeatureFrame::new(names, columns, frame.height())?,
        fitted_encoder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Series::new("boutique".into(), &[Some("B"), None, Some("A")]).into(),
            Series::new("quantite".into(), &[Some(2i64), None, Some(1)]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn fit_imputes_and_encodes() {
        let prepared = prepare_features(&sample(), EncoderMode::Fit).unwrap();
        let encoder = prepared.fitted_encoder.expect("encoder fitted");
        // sorted categories: A, B, NA
        assert_eq!(encoder.columns()[0].categories, vec!["A", "B", "NA"]);

        let features = prepared.features;
        assert_eq!(features.names(), &["boutique".to_string(), "quantite".to_string()]);
        assert_eq!(features.column("boutique").unwrap(), &[1.0, 2.0, 0.0]);
        assert_eq!(features.column("quantite").unwrap(), &[2.0, -999.0, 1.0]);
    }

    #[test]
    fn apply_uses_persisted_encoder_for_unseen_values() {
        let fitted = prepare_features(&sample(), EncoderMode::Fit)
            .unwrap()
            .fitted_encoder
            .unwrap();

        let new = DataFrame::new(vec![
            Series::new("boutique".into(), &["C", "A"]).into(),
            Series::new("quantite".into(), &[5.0f64, 6.0]).into(),
        ])
        .unwrap();
        let prepared = prepare_features(&new, EncoderMode::Apply(Some(&fitted))).unwrap();
        assert!(prepared.fitted_encoder.is_none());
        assert_eq!(prepared.features.column("boutique").unwrap(), &[-1.0, 0.0]);
    }

    #[test]
    fn numeric_only_frame_needs_no_encoder() {
        let frame =
            DataFrame::new(vec![Series::new("quantite".into(), &[None, Some(3.0f64)]).into()]).unwrap();

        let fitted = prepare_features(&frame, EncoderMode::Fit).unwrap();
        assert!(fitted.fitted_encoder.is_none());

        let applied = prepare_features(&frame, EncoderMode::Apply(None)).unwrap();
        assert_eq!(applied.features.column("quantite").unwrap(), &[-999.0, 3.0]);
    }

    #[test]
    fn numeric_cells_of_an_encoded_column_are_encoded() {
        let training = DataFrame::new(vec![Series::new("sku".into(), &["10", "A7"]).into()]).unwrap();
        let encoder = prepare_features(&training, EncoderMode::Fit)
            .unwrap()
            .fitted_encoder
            .unwrap();

        let upload = DataFrame::new(vec![Series::new("sku".into(), &[10i64, 11]).into()]).unwrap();
        let prepared = prepare_features(&upload, EncoderMode::Apply(Some(&encoder))).unwrap();
        assert_eq!(prepared.features.column("sku").unwrap(), &[0.0, -1.0]);
    }

    #[test]
    fn text_without_encoder_is_a_pipeline_error() {
        let err = prepare_features(&sample(), EncoderMode::Apply(None)).unwrap_err();
        assert!(matches!(err, PipelineError::UnencodedCategorical(name) if name == "boutique"));
    }

    #[test]
    fn text_column_unknown_to_the_encoder_is_rejected() {
        let encoder = prepare_features(&sample(), EncoderMode::Fit)
            .unwrap()
            .fitted_encoder
            .unwrap();

        // numeric at training time, text in this upload
        let upload = DataFrame::new(vec![
            Series::new("boutique".into(), &["A", "B"]).into(),
            Series::new("quantite".into(), &["3", "2 pcs"]).into(),
        ])
        .unwrap();
        let err = prepare_features(&upload, EncoderMode::Apply(Some(&encoder))).unwrap_err();
        assert!(
            matches!(err, PipelineError::UnknownCategoricalColumn(name) if name == "quantite")
        );
    }
}
