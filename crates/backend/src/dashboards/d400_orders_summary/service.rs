use chrono::{Datelike, NaiveDate};
use contracts::dashboards::d400_orders_summary::{
    Breakdown, Bucket, Evolution, EvolutionMode, OrderKpis, OrdersSummaryRequest,
    OrdersSummaryResponse, Slice, DELIVERY_STATUS_ORDER, ORDER_STATUS_ORDER, STATUS_CANCELLED,
    STATUS_CONFIRMED, STATUS_PENDING,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::repository::{OrdersDataset, CREATED_AT_COLUMN};

const ORDER_STATUS: &str = "Etat_Commande";
const DELIVERY_STATUS: &str = "Etat_Livraison";
const SHOP: &str = "Boutique";
const SOURCE: &str = "Source";
const SHIFT: &str = "Shift";

/// Сводка по заказам: KPI, круговые диаграммы и эволюция
pub fn get_orders_summary(
    dataset: &OrdersDataset,
    request: &OrdersSummaryRequest,
) -> OrdersSummaryResponse {
    let mut info = Vec::new();
    let all_rows: Vec<usize> = (0..dataset.row_count()).collect();
    let statuses = dataset.column(ORDER_STATUS);

    // === KPI ===
    let mut kpis = OrderKpis {
        total: dataset.row_count(),
        ..OrderKpis::default()
    };
    match &statuses {
        Some(values) => {
            for status in values.iter().flatten() {
                match *status {
                    STATUS_CONFIRMED => kpis.confirmed += 1,
                    STATUS_CANCELLED => kpis.cancelled += 1,
                    STATUS_PENDING => kpis.pending += 1,
                    _ => {}
                }
            }
        }
        None => info.push(missing_column(ORDER_STATUS)),
    }

    // === Диаграммы по всему датасету ===
    let mut breakdowns = Vec::new();
    for (dimension, title) in [
        (ORDER_STATUS, "État des commandes"),
        (SHOP, "Commandes par boutique"),
    ] {
        match dataset.column(dimension) {
            Some(values) => breakdowns.push(breakdown(dimension, title, &values, &all_rows)),
            None if dimension != ORDER_STATUS => info.push(missing_column(dimension)),
            None => {}
        }
    }

    // === Диаграммы по выбранному периоду ===
    let date_range = dataset.created_at().and_then(date_bounds);
    let period_rows = rows_in_period(dataset, request);
    if period_rows.is_empty() && dataset.row_count() > 0 {
        info.push("Aucune commande sur la période sélectionnée".to_string());
    }

    match dataset.column(SOURCE) {
        Some(values) => breakdowns.push(breakdown(
            SOURCE,
            "Répartition des commandes par Source",
            &values,
            &period_rows,
        )),
        None => info.push(missing_column(SOURCE)),
    }

    match (dataset.column(SHIFT), &statuses) {
        (Some(shifts), Some(statuses)) => {
            let confirmed: Vec<usize> = period_rows
                .iter()
                .copied()
                .filter(|&row| statuses[row] == Some(STATUS_CONFIRMED))
                .collect();
            if confirmed.is_empty() {
                info.push("Aucune commande confirmée sur la période sélectionnée".to_string());
            } else {
                breakdowns.push(breakdown(SHIFT, "Confirmées : Matin vs Soir", &shifts, &confirmed));
            }
        }
        (None, _) => info.push(missing_column(SHIFT)),
        (Some(_), None) => {}
    }

    // === Эволюция ===
    let evolution = match (dataset.created_at(), &statuses) {
        (Some(dates), Some(statuses)) => build_evolution(dataset, dates, statuses, request, &mut info),
        (None, _) => {
            info.push(missing_column(CREATED_AT_COLUMN));
            None
        }
        (Some(_), None) => None,
    };

    OrdersSummaryResponse {
        kpis,
        breakdowns,
        evolution,
        date_range,
        info,
    }
}

fn missing_column(name: &str) -> String {
    format!("Colonne '{}' absente du fichier", name)
}

fn date_bounds(dates: &[Option<chrono::NaiveDateTime>]) -> Option<(NaiveDate, NaiveDate)> {
    let min = dates.iter().flatten().min()?;
    let max = dates.iter().flatten().max()?;
    Some((min.date(), max.date()))
}

/// Строки внутри [date_from, date_to]; без колонки даты фильтр не применяется.
/// Строки без распознанной даты в период не попадают.
fn rows_in_period(dataset: &OrdersDataset, request: &OrdersSummaryRequest) -> Vec<usize> {
    let Some(dates) = dataset.created_at() else {
        return (0..dataset.row_count()).collect();
    };
    dates
        .iter()
        .enumerate()
        .filter_map(|(row, dt)| {
            let day = dt.as_ref()?.date();
            let after_start = request.date_from.map_or(true, |from| day >= from);
            let before_end = request.date_to.map_or(true, |to| day <= to);
            (after_start && before_end).then_some(row)
        })
        .collect()
}

/// Count per distinct value, largest first; empty cells are skipped
fn breakdown(dimension: &str, title: &str, values: &[Option<&str>], rows: &[usize]) -> Breakdown {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &row in rows {
        if let Some(value) = values[row] {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    let mut slices: Vec<Slice> = counts
        .into_iter()
        .map(|(label, count)| Slice {
            label: label.to_string(),
            count,
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    Breakdown {
        dimension: dimension.to_string(),
        title: title.to_string(),
        slices,
    }
}

fn build_evolution(
    dataset: &OrdersDataset,
    dates: &[Option<chrono::NaiveDateTime>],
    statuses: &[Option<&str>],
    request: &OrdersSummaryRequest,
    info: &mut Vec<String>,
) -> Option<Evolution> {
    let mode = request.mode.unwrap_or(EvolutionMode::Monthly);
    let period_of = |dt: &chrono::NaiveDateTime| match mode {
        EvolutionMode::Monthly => format!("{:04}-{:02}", dt.year(), dt.month()),
        EvolutionMode::Annual => format!("{:04}", dt.year()),
    };

    let available: Vec<String> = dates
        .iter()
        .flatten()
        .map(period_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let latest = available.last()?.clone();

    let requested = match mode {
        EvolutionMode::Monthly => request.period.clone(),
        EvolutionMode::Annual => request.year.map(|y| format!("{:04}", y)),
    };
    let selected = match requested {
        Some(period) if available.contains(&period) => period,
        Some(period) => {
            info.push(format!(
                "Période '{}' sans commandes, affichage de '{}'",
                period, latest
            ));
            latest
        }
        None => latest,
    };

    let rows: Vec<(usize, u32)> = dates
        .iter()
        .enumerate()
        .filter_map(|(row, dt)| {
            let dt = dt.as_ref()?;
            if period_of(dt) != selected {
                return None;
            }
            let key = match mode {
                EvolutionMode::Monthly => dt.day(),
                EvolutionMode::Annual => dt.month(),
            };
            Some((row, key))
        })
        .collect();

    let orders = bucketize(&rows, statuses, ORDER_STATUS_ORDER);
    let deliveries = match dataset.column(DELIVERY_STATUS) {
        Some(values) => bucketize(&rows, &values, DELIVERY_STATUS_ORDER),
        None => {
            info.push(missing_column(DELIVERY_STATUS));
            Vec::new()
        }
    };

    Some(Evolution {
        mode,
        selected,
        available,
        orders,
        deliveries,
    })
}

/// Stacked counts per key; known labels keep their fixed order,
/// others follow alphabetically
fn bucketize(rows: &[(usize, u32)], values: &[Option<&str>], order: &[&str]) -> Vec<Bucket> {
    let mut buckets: BTreeMap<u32, HashMap<&str, usize>> = BTreeMap::new();
    for &(row, key) in rows {
        if let Some(value) = values[row] {
            *buckets.entry(key).or_default().entry(value).or_insert(0) += 1;
        }
    }

    let rank = |label: &str| order.iter().position(|o| *o == label).unwrap_or(order.len());
    buckets
        .into_iter()
        .map(|(key, counts)| {
            let mut counts: Vec<Slice> = counts
                .into_iter()
                .map(|(label, count)| Slice {
                    label: label.to_string(),
                    count,
                })
                .collect();
            counts.sort_by(|a, b| {
                rank(&a.label)
                    .cmp(&rank(&b.label))
                    .then_with(|| a.label.cmp(&b.label))
            });
            Bucket { key, counts }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::RawTable;

    fn dataset() -> OrdersDataset {
        let csv = "\
Date_Creation,Etat_Commande,Etat_Livraison,Boutique,Source,Shift
2024-04-28 09:00:00,Confirmée,Livrée,A,Facebook,Matin
2024-05-01 10:00:00,Confirmée,Retour,A,Facebook,Matin
2024-05-01 18:00:00,Annulée,,B,Instagram,Soir
2024-05-02 11:00:00,En confirmation,,A,Facebook,Matin
2024-05-02 20:00:00,Confirmée,Livrée,B,Instagram,Soir
2024-05-02 21:00:00,Confirmée,Preparation Stock,B,,Soir
";
        OrdersDataset::from_table(RawTable::from_csv_bytes(csv.as_bytes()).unwrap())
    }

    fn slice<'a>(response: &'a OrdersSummaryResponse, dimension: &str) -> &'a [Slice] {
        &response
            .breakdowns
            .iter()
            .find(|b| b.dimension == dimension)
            .unwrap()
            .slices
    }

    #[test]
    fn test_kpis_count_statuses() {
        let response = get_orders_summary(&dataset(), &OrdersSummaryRequest::default());
        assert_eq!(
            response.kpis,
            OrderKpis {
                total: 6,
                confirmed: 4,
                cancelled: 1,
                pending: 1
            }
        );
        assert_eq!(
            response.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 4, 28).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
            ))
        );
        assert!(response.info.is_empty());
    }

    #[test]
    fn period_filter_applies_to_source_and_shift_only() {
        let request = OrdersSummaryRequest {
            date_from: NaiveDate::from_ymd_opt(2024, 5, 2),
            date_to: NaiveDate::from_ymd_opt(2024, 5, 2),
            ..OrdersSummaryRequest::default()
        };
        let response = get_orders_summary(&dataset(), &request);

        // whole dataset
        assert_eq!(
            slice(&response, "Boutique"),
            &[
                Slice { label: "A".into(), count: 3 },
                Slice { label: "B".into(), count: 3 }
            ]
        );
        // 2024-05-02 only, empty Source skipped
        assert_eq!(
            slice(&response, "Source"),
            &[
                Slice { label: "Facebook".into(), count: 1 },
                Slice { label: "Instagram".into(), count: 1 }
            ]
        );
        // confirmed on 2024-05-02: both in the evening
        assert_eq!(
            slice(&response, "Shift"),
            &[Slice { label: "Soir".into(), count: 2 }]
        );
    }

    #[test]
    fn empty_period_is_an_info_state() {
        let request = OrdersSummaryRequest {
            date_from: NaiveDate::from_ymd_opt(2023, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2023, 1, 31),
            ..OrdersSummaryRequest::default()
        };
        let response = get_orders_summary(&dataset(), &request);
        assert!(response
            .info
            .iter()
            .any(|m| m.contains("Aucune commande sur la période")));
        assert!(slice(&response, "Source").is_empty());
        assert!(response.breakdowns.iter().all(|b| b.dimension != "Shift"));
    }

    #[test]
    fn monthly_evolution_defaults_to_latest_month() {
        let response = get_orders_summary(&dataset(), &OrdersSummaryRequest::default());
        let evolution = response.evolution.unwrap();

        assert_eq!(evolution.mode, EvolutionMode::Monthly);
        assert_eq!(evolution.available, vec!["2024-04", "2024-05"]);
        assert_eq!(evolution.selected, "2024-05");
        assert_eq!(evolution.orders.len(), 2);
        assert_eq!(evolution.orders[0].key, 1);
        assert_eq!(
            evolution.orders[0].counts,
            vec![
                Slice { label: "Confirmée".into(), count: 1 },
                Slice { label: "Annulée".into(), count: 1 }
            ]
        );
        assert_eq!(
            evolution.deliveries[1].counts,
            vec![
                Slice { label: "Livrée".into(), count: 1 },
                Slice { label: "Preparation Stock".into(), count: 1 }
            ]
        );
    }

    #[test]
    fn annual_evolution_buckets_by_month() {
        let request = OrdersSummaryRequest {
            mode: Some(EvolutionMode::Annual),
            year: Some(2024),
            ..OrdersSummaryRequest::default()
        };
        let evolution = get_orders_summary(&dataset(), &request).evolution.unwrap();
        assert_eq!(evolution.selected, "2024");
        let keys: Vec<u32> = evolution.orders.iter().map(|b| b.key).collect();
        assert_eq!(keys, vec![4, 5]);
        let may_total: usize = evolution.orders[1].counts.iter().map(|s| s.count).sum();
        assert_eq!(may_total, 5);
    }

    #[test]
    fn unknown_period_falls_back_with_info() {
        let request = OrdersSummaryRequest {
            period: Some("2022-01".into()),
            ..OrdersSummaryRequest::default()
        };
        let response = get_orders_summary(&dataset(), &request);
        assert_eq!(response.evolution.unwrap().selected, "2024-05");
        assert!(response.info.iter().any(|m| m.contains("2022-01")));
    }

    #[test]
    fn missing_optional_columns_are_reported() {
        let table = RawTable::from_csv_bytes("Etat_Commande\nConfirmée\n".as_bytes()).unwrap();
        let response =
            get_orders_summary(&OrdersDataset::from_table(table), &OrdersSummaryRequest::default());

        assert_eq!(response.kpis.confirmed, 1);
        assert!(response.evolution.is_none());
        for column in ["Boutique", "Source", "Shift", "Date_Creation"] {
            assert!(
                response.info.iter().any(|m| m.contains(column)),
                "no info for {column}"
            );
        }
    }
}
