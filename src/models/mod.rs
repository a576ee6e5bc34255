pub mod distribusi;
pub mod kategori;
pub mod penerimaan;
pub mod periode;
pub mod pihak;
pub mod statistik;
pub mod unit;
pub mod user;

use serde::{Deserialize, Serialize};

/// How a receipt or unit is paid: in rice or in cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "zakat_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ZakatType {
    Beras,
    Uang,
}
