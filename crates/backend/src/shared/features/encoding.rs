use contracts::shared::order_schema::UNKNOWN_CATEGORY_CODE;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Categories learned for one column, sorted; the code is the index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodedColumn {
    pub name: String,
    pub categories: Vec<String>,
}

/// Ordinal encoder fitted by the trainer and applied read-only by the predictor.
///
/// Unseen values map to `UNKNOWN_CATEGORY_CODE`; a column the encoder
/// never saw has no encoding at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrdinalEncoder {
    columns: Vec<EncodedColumn>,
    #[serde(skip)]
    lookup: HashMap<String, HashMap<String, usize>>,
}

impl OrdinalEncoder {
    /// Learns the sorted category list of every given column
    pub fn fit<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let categories: BTreeSet<&String> = values.iter().collect();
                EncodedColumn {
                    name: name.to_string(),
                    categories: categories.into_iter().cloned().collect(),
                }
            })
            .collect();
        Self::from_columns(columns)
    }

    pub fn from_columns(columns: Vec<EncodedColumn>) -> Self {
        let lookup = columns
            .iter()
            .map(|c| {
                let codes = c
                    .categories
                    .iter()
                    .enumerate()
                    .map(|(code, value)| (value.clone(), code))
                    .collect();
                (c.name.clone(), codes)
            })
            .collect();
        Self { columns, lookup }
    }

    pub fn columns(&self) -> &[EncodedColumn] {
        &self.columns
    }

    pub fn knows_column(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// `None` when `name` was not part of the fit
    pub fn transform(&self, name: &str, values: &[String]) -> Option<Vec<f64>> {
        let codes = self.lookup.get(name)?;
        Some(
            values
                .iter()
                .map(|v| {
                    codes
                        .get(v)
                        .map(|&code| code as f64)
                        .unwrap_or(UNKNOWN_CATEGORY_CODE)
                })
                .collect(),
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The lookup table is rebuilt after deserialisation
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let raw: OrdinalEncoder = serde_json::from_str(text)?;
        Ok(Self::from_columns(raw.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn codes_follow_sorted_categories() {
        let shops = strings(&["B", "A", "B"]);
        let encoder = OrdinalEncoder::fit([("shop", shops.as_slice())]);
        assert_eq!(encoder.columns()[0].categories, strings(&["A", "B"]));
        assert_eq!(encoder.transform("shop", &shops), Some(vec![1.0, 0.0, 1.0]));
    }

    #[test]
    fn unseen_category_maps_to_unknown_code() {
        let shops = strings(&["A", "B"]);
        let encoder = OrdinalEncoder::fit([("shop", shops.as_slice())]);
        let codes = encoder.transform("shop", &strings(&["C", "A", "NA"]));
        assert_eq!(codes, Some(vec![-1.0, 0.0, -1.0]));
    }

    #[test]
    fn unfitted_column_has_no_encoding() {
        let shops = strings(&["A"]);
        let encoder = OrdinalEncoder::fit([("shop", shops.as_slice())]);
        assert!(!encoder.knows_column("wilaya"));
        assert_eq!(encoder.transform("wilaya", &strings(&["Alger", "Oran"])), None);
    }

    #[test]
    fn lookup_survives_json_round_trip() {
        let shops = strings(&["A", "B"]);
        let encoder = OrdinalEncoder::fit([("shop", shops.as_slice())]);
        let restored = OrdinalEncoder::from_json(&encoder.to_json().unwrap()).unwrap();
        assert_eq!(restored.transform("shop", &strings(&["B"])), Some(vec![1.0]));
    }
}
