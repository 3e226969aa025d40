use chrono::NaiveDateTime;
use std::path::Path;

use crate::shared::features::time_features::parse_datetime;
use crate::shared::frame::{FrameError, RawTable};

/// Колонка даты создания заказа в файле дашборда
pub const CREATED_AT_COLUMN: &str = "Date_Creation";

/// Orders sheet behind the dashboard, with the creation date pre-parsed
#[derive(Debug, Clone)]
pub struct OrdersDataset {
    table: RawTable,
    /// `None` when the sheet has no creation date column
    created_at: Option<Vec<Option<NaiveDateTime>>>,
}

impl OrdersDataset {
    pub fn from_table(table: RawTable) -> Self {
        let created_at = table.column(CREATED_AT_COLUMN).map(|cells| {
            cells
                .into_iter()
                .map(|cell| cell.and_then(parse_datetime))
                .collect()
        });
        Self { table, created_at }
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.table.has_column(name)
    }

    /// Trimmed cell text of a column; empty cells are `None`
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        self.table.column(name)
    }

    pub fn created_at(&self) -> Option<&[Option<NaiveDateTime>]> {
        self.created_at.as_deref()
    }
}

/// Загрузить файл заказов для дашборда
pub fn load_orders(path: &Path) -> Result<OrdersDataset, FrameError> {
    let table = RawTable::from_path(path)?;
    let dataset = OrdersDataset::from_table(table);
    let unparsed = dataset
        .created_at()
        .map(|dates| dates.iter().filter(|d| d.is_none()).count())
        .unwrap_or(0);
    tracing::info!(
        "D400 Dashboard: loaded {} orders from {} ({} without a valid creation date)",
        dataset.row_count(),
        path.display(),
        unparsed
    );
    Ok(dataset)
}
