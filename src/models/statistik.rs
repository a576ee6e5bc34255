use serde::Serialize;
use rust_decimal::Decimal;

/// One bar of the receipts-vs-distributions chart for a period.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodStatistic {
    pub zakat: &'static str,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_muzakki: i64,
    pub total_mustahik: i64,
    pub total_penerimaan: Decimal,
    pub total_distribusi: Decimal,
}
