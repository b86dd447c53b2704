use serde::Serialize;
use tabled::Tabled;

/// One normalized row of the long-format budget table.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub region: String,
    pub province: String,
    pub island: String,
    pub category1: String,
    pub category2: String,
    pub value: f64,
}

/// Grouping key shared by every aggregate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionKey {
    pub region: String,
    pub province: String,
    pub island: String,
}

impl RegionKey {
    pub fn of(item: &LineItem) -> Self {
        Self {
            region: item.region.clone(),
            province: item.province.clone(),
            island: item.island.clone(),
        }
    }
}

/// One row per `(region, province, island)` with totals, components and ratios.
///
/// Ratios are `None` when their denominator is not strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub province: String,
    pub island: String,
    pub total_revenue: f64,
    pub total_expenditure: f64,
    pub own_source_revenue: f64,
    pub operating_expenditure: f64,
    pub capital_expenditure: f64,
    pub contingency_expenditure: f64,
    pub transfer_expenditure: f64,
    pub surplus_deficit: f64,
    pub own_source_ratio: Option<f64>,
    pub capital_ratio: Option<f64>,
    pub operating_ratio: Option<f64>,
}

// Display rows below carry pre-formatted strings, the same way the exported
// CSVs and console previews present money and percentages.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RevenueRankRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Provinsi")]
    #[tabled(rename = "Provinsi")]
    pub province: String,
    #[serde(rename = "Pulau")]
    #[tabled(rename = "Pulau")]
    pub island: String,
    #[serde(rename = "TotalPendapatan")]
    #[tabled(rename = "TotalPendapatan")]
    pub total_revenue: String,
    #[serde(rename = "PAD")]
    #[tabled(rename = "PAD")]
    pub own_source_revenue: String,
    #[serde(rename = "RasioPAD")]
    #[tabled(rename = "RasioPAD")]
    pub own_source_ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ExpenditureRankRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Provinsi")]
    #[tabled(rename = "Provinsi")]
    pub province: String,
    #[serde(rename = "Pulau")]
    #[tabled(rename = "Pulau")]
    pub island: String,
    #[serde(rename = "TotalBelanja")]
    #[tabled(rename = "TotalBelanja")]
    pub total_expenditure: String,
    #[serde(rename = "BelanjaOperasi")]
    #[tabled(rename = "BelanjaOperasi")]
    pub operating: String,
    #[serde(rename = "BelanjaModal")]
    #[tabled(rename = "BelanjaModal")]
    pub capital: String,
    #[serde(rename = "RasioModal")]
    #[tabled(rename = "RasioModal")]
    pub capital_ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SurplusRankRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Provinsi")]
    #[tabled(rename = "Provinsi")]
    pub province: String,
    #[serde(rename = "Pulau")]
    #[tabled(rename = "Pulau")]
    pub island: String,
    #[serde(rename = "SurplusDefisit")]
    #[tabled(rename = "SurplusDefisit")]
    pub surplus_deficit: String,
    #[serde(rename = "TotalPendapatan")]
    #[tabled(rename = "TotalPendapatan")]
    pub total_revenue: String,
    #[serde(rename = "TotalBelanja")]
    #[tabled(rename = "TotalBelanja")]
    pub total_expenditure: String,
    #[serde(rename = "RasioPAD")]
    #[tabled(rename = "RasioPAD")]
    pub own_source_ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChartPoint {
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Kategori")]
    #[tabled(rename = "Kategori")]
    pub series: String,
    #[serde(rename = "Nilai")]
    #[tabled(rename = "Nilai")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CompositionRow {
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Provinsi")]
    #[tabled(rename = "Provinsi")]
    pub province: String,
    #[serde(rename = "BelanjaOperasi")]
    #[tabled(rename = "BelanjaOperasi")]
    pub operating: String,
    #[serde(rename = "BelanjaModal")]
    #[tabled(rename = "BelanjaModal")]
    pub capital: String,
    #[serde(rename = "BelanjaTidakTerduga")]
    #[tabled(rename = "BelanjaTidakTerduga")]
    pub contingency: String,
    #[serde(rename = "BelanjaTransfer")]
    #[tabled(rename = "BelanjaTransfer")]
    pub transfer: String,
    #[serde(rename = "TotalBelanja")]
    #[tabled(rename = "TotalBelanja")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct InsightRow {
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Provinsi")]
    #[tabled(rename = "Provinsi")]
    pub province: String,
    #[serde(rename = "Rasio")]
    #[tabled(rename = "Rasio")]
    pub ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RatioPointRow {
    #[serde(rename = "Daerah")]
    #[tabled(rename = "Daerah")]
    pub region: String,
    #[serde(rename = "Pulau")]
    #[tabled(rename = "Pulau")]
    pub island: String,
    #[serde(rename = "RasioPAD")]
    #[tabled(rename = "RasioPAD")]
    pub own_source_ratio: String,
    #[serde(rename = "RasioModal")]
    #[tabled(rename = "RasioModal")]
    pub capital_ratio: String,
    #[serde(rename = "TotalPendapatan")]
    #[tabled(rename = "TotalPendapatan")]
    pub total_revenue: String,
    #[serde(rename = "Kuadran")]
    #[tabled(rename = "Kuadran")]
    pub quadrant: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Komponen")]
    #[tabled(rename = "Komponen")]
    pub component: String,
    #[serde(rename = "Nilai")]
    #[tabled(rename = "Nilai")]
    pub value: String,
    #[serde(rename = "Porsi")]
    #[tabled(rename = "Porsi")]
    pub share: String,
}

/// Raw numeric export of one summary row; undefined ratios become empty cells.
#[derive(Debug, Serialize)]
pub struct SummaryCsvRow<'a> {
    pub daerah: &'a str,
    pub provinsi: &'a str,
    pub pulau: &'a str,
    pub total_pendapatan: f64,
    pub total_belanja: f64,
    pub pad: f64,
    pub belanja_operasi: f64,
    pub belanja_modal: f64,
    pub belanja_tidak_terduga: f64,
    pub belanja_transfer: f64,
    pub surplus_defisit: f64,
    pub rasio_pad: Option<f64>,
    pub rasio_modal: Option<f64>,
    pub rasio_operasi: Option<f64>,
}

impl<'a> From<&'a RegionSummary> for SummaryCsvRow<'a> {
    fn from(s: &'a RegionSummary) -> Self {
        Self {
            daerah: &s.region,
            provinsi: &s.province,
            pulau: &s.island,
            total_pendapatan: s.total_revenue,
            total_belanja: s.total_expenditure,
            pad: s.own_source_revenue,
            belanja_operasi: s.operating_expenditure,
            belanja_modal: s.capital_expenditure,
            belanja_tidak_terduga: s.contingency_expenditure,
            belanja_transfer: s.transfer_expenditure,
            surplus_defisit: s.surplus_deficit,
            rasio_pad: s.own_source_ratio,
            rasio_modal: s.capital_ratio,
            rasio_operasi: s.operating_ratio,
        }
    }
}

/// Aggregate figures shown on the KPI cards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Totals {
    pub region_count: usize,
    pub total_revenue: f64,
    pub total_expenditure: f64,
    pub surplus_deficit: f64,
    pub surplus_label: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Indikator")]
    pub label: String,
    #[tabled(rename = "Nilai")]
    pub value: String,
    #[tabled(rename = "Keterangan")]
    pub hint: String,
}
