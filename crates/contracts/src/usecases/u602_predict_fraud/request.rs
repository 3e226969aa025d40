use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Лист, разобранный на стороне клиента (например, из Excel)
///
/// `file_headers` задает порядок колонок, `rows` содержит значения ячеек
/// по имени заголовка. Отсутствующая или пустая ячейка = пропуск.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedSheet {
    #[serde(default)]
    pub file_name: Option<String>,
    pub file_headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}
