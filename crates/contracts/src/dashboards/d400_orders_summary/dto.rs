use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Статусы заказа, используемые в KPI
pub const STATUS_CONFIRMED: &str = "Confirmée";
pub const STATUS_CANCELLED: &str = "Annulée";
pub const STATUS_PENDING: &str = "En confirmation";

/// Фиксированный порядок статусов на графиках эволюции
pub const ORDER_STATUS_ORDER: &[&str] = &[STATUS_CONFIRMED, STATUS_PENDING, STATUS_CANCELLED];
pub const DELIVERY_STATUS_ORDER: &[&str] = &["Livrée", "Preparation Stock", "Retour"];

/// Query для GET /api/d400/orders-summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersSummaryRequest {
    /// Начало периода для диаграмм (включительно)
    pub date_from: Option<NaiveDate>,
    /// Конец периода для диаграмм (включительно)
    pub date_to: Option<NaiveDate>,
    /// "monthly" (по дням выбранного месяца) или "annual" (по месяцам года)
    pub mode: Option<EvolutionMode>,
    /// "YYYY-MM" для monthly
    pub period: Option<String>,
    /// Год для annual
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionMode {
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersSummaryResponse {
    pub kpis: OrderKpis,
    /// Круговые диаграммы: статус, магазин, источник, смена
    pub breakdowns: Vec<Breakdown>,
    pub evolution: Option<Evolution>,
    /// Минимальная и максимальная дата создания в датасете
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Информационные сообщения (нет колонки, пустой срез и т.п.)
    pub info: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderKpis {
    pub total: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub pending: usize,
}

/// Распределение заказов по значениям одной колонки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Breakdown {
    /// Колонка-источник, например "Boutique"
    pub dimension: String,
    /// Подпись для UI
    pub title: String,
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
}

/// Столбчатые диаграммы эволюции заказов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evolution {
    pub mode: EvolutionMode,
    /// Выбранный период ("2024-05" или "2024")
    pub selected: String,
    /// Все доступные периоды для выбранного режима
    pub available: Vec<String>,
    /// Бакеты по Etat_Commande
    pub orders: Vec<Bucket>,
    /// Бакеты по Etat_Livraison (если колонка есть)
    pub deliveries: Vec<Bucket>,
}

/// Один столбец: день месяца или номер месяца, счетчики по статусам
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub key: u32,
    pub counts: Vec<Slice>,
}
