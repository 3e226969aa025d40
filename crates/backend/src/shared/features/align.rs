use contracts::shared::order_schema::NUMERIC_MISSING;

use super::FeatureFrame;

/// Reindexes the features to exactly `feature_names`, in that order.
///
/// Names missing from the input are filled with `-999`, extra input
/// columns are dropped.
pub fn align_to_features(features: &FeatureFrame, feature_names: &[String]) -> FeatureFrame {
    let height = features.height();
    let mut missing = Vec::new();

    let columns: Vec<Vec<f64>> = feature_names
        .iter()
        .map(|name| match features.column(name) {
            Some(values) => values.to_vec(),
            None => {
                missing.push(name.as_str());
                vec![NUMERIC_MISSING; height]
            }
        })
        .collect();

    let dropped: Vec<&str> = features
        .names()
        .iter()
        .filter(|n| !feature_names.contains(n))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() || !dropped.is_empty() {
        tracing::info!(
            "Feature alignment: filled {:?} with {}, dropped {:?}",
            missing,
            NUMERIC_MISSING,
            dropped
        );
    }

    FeatureFrame {
        names: feature_names.to_vec(),
        columns,
        height,
    }
}
