//! Схема колонок заказа, общая для тренера (u601) и предиктора (u602).
//!
//! Все имена колонок, синонимы целевой колонки, таблица переименования
//! и значения-заглушки определены здесь один раз, чтобы оба процесса
//! строили одинаковый набор признаков.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Кандидаты на обучающий датасет, первый существующий файл выигрывает
pub const TRAINING_DATASET_CANDIDATES: &[&str] =
    &["prediction.csv", "prediciton.csv", "dataset_commandes.csv"];

/// Допустимые написания целевой колонки (сравнение без учета регистра)
pub const TARGET_SYNONYMS: &[&str] = &[
    "fausse_commande",
    "fausse-commande",
    "fausse commande",
    "is_fake",
    "is fake",
    "isfake",
];

/// Каноническое имя целевой колонки после переименования
pub const TARGET_COLUMN: &str = "is_fake";

/// Колонка, добавляемая к исходному файлу с результатом предсказания
pub const PREDICTION_COLUMN: &str = "Prediction_Fraude";

/// Ровно этот набор колонок должен быть в загружаемом файле (порядок не важен)
pub const EXPECTED_UPLOAD_COLUMNS: [&str; 10] = [
    "IP_Client",
    "Date_Creation",
    "Nom_Complet",
    "Numero_Telephone",
    "Quantite",
    "Wilaya",
    "Commune",
    "SKU",
    "Boutique",
    "Montant_Total",
];

/// Переименование колонок загрузки во внутренние имена признаков
pub const UPLOAD_RENAMES: &[(&str, &str)] = &[
    ("IP_Client", "ip_client"),
    ("Date_Creation", "date_creation"),
    ("Nom_Complet", "nom_complet"),
    ("Numero_Telephone", "numero_telephone"),
    ("Quantite", "quantite"),
    ("Wilaya", "wilaya"),
    ("Commune", "commune"),
    ("SKU", "sku"),
    ("Boutique", "boutique"),
    ("Montant_Total", "montant_total"),
];

/// Подстроки, по которым ищется колонка даты создания
pub const DATE_COLUMN_TOKENS: &[&str] = &["date", "creation"];

pub const NUMERIC_MISSING: f64 = -999.0;
pub const CATEGORICAL_MISSING: &str = "NA";
pub const UNKNOWN_CATEGORY_CODE: f64 = -1.0;
pub const MISSING_TIME_PART: i64 = -1;
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Производные временные признаки, один и тот же набор для обучения и
/// для инференса (timestamp = секунды от эпохи)
pub const TIME_FEATURES: &[&str] = &[
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "dayofweek",
    "timestamp",
];

static RENAME_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| UPLOAD_RENAMES.iter().copied().collect());

/// Внутреннее имя для колонки загрузки (регистр важен)
pub fn canonical_name(column: &str) -> Option<&'static str> {
    RENAME_MAP.get(column).copied()
}

/// trim + замена пробелов, дефисов и апострофов на `_`
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '\'' => '_',
            other => other,
        })
        .collect()
}

/// Находит целевую колонку: синонимы перебираются по порядку,
/// первый совпавший (без учета регистра) определяет колонку.
pub fn find_target_column<'a, I>(columns: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    for synonym in TARGET_SYNONYMS {
        let raw = synonym.to_lowercase();
        let normalized = normalize_column_name(synonym).to_lowercase();
        let found = columns.clone().into_iter().find(|column| {
            let lower = column.to_lowercase();
            lower == raw || lower == normalized
        });
        if let Some(column) = found {
            return Some(column.to_string());
        }
    }
    None
}

/// Колонка похожа на дату создания, если содержит "date" или "creation"
pub fn is_date_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    DATE_COLUMN_TOKENS.iter().any(|token| lower.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_separators() {
        assert_eq!(normalize_column_name("  is fake "), "is_fake");
        assert_eq!(normalize_column_name("fausse-commande"), "fausse_commande");
        assert_eq!(normalize_column_name("Nom d'usine"), "Nom_d_usine");
    }

    #[test]
    fn target_found_for_any_spelling() {
        let cols = ["Boutique", "Fausse_Commande", "SKU"];
        assert_eq!(
            find_target_column(cols.iter().copied()).as_deref(),
            Some("Fausse_Commande")
        );

        let cols = ["Boutique", "is_fake"];
        assert_eq!(
            find_target_column(cols.iter().copied()).as_deref(),
            Some("is_fake")
        );

        let cols = ["Boutique", "label"];
        assert!(find_target_column(cols.iter().copied()).is_none());
    }

    #[test]
    fn date_heuristic_is_case_insensitive() {
        assert!(is_date_column("Date_Creation"));
        assert!(is_date_column("CREATION_TS"));
        assert!(!is_date_column("Boutique"));
    }

    #[test]
    fn every_upload_column_has_a_canonical_name() {
        for column in EXPECTED_UPLOAD_COLUMNS {
            assert!(canonical_name(column).is_some(), "{column}");
        }
        assert_eq!(canonical_name("date_creation"), None);
    }

    #[test]
    fn time_features_end_with_epoch() {
        assert_eq!(TIME_FEATURES.len(), 7);
        assert_eq!(TIME_FEATURES.last(), Some(&"timestamp"));
    }
}
