use crate::error::Result;
use crate::loader::LoadReport;
use crate::output::{preview_table, write_csv};
use crate::types::{
    BreakdownRow, ChartPoint, CompositionRow, ExpenditureRankRow, InsightRow, RatioPointRow,
    RegionSummary, RevenueRankRow, SurplusRankRow, Totals,
};
use crate::util::{format_idr, format_pct};
use crate::view::{
    breakdown, ratio_map, top_n, top_n_defined, totals, Filter, RatioMap, SortKey,
};
use serde::Serialize;
use std::path::Path;

pub const RANKING_LIMIT: usize = 20;
pub const CHART_LIMIT: usize = 15;
pub const INSIGHT_LIMIT: usize = 5;
pub const COMPOSITION_DEFAULT: usize = 15;
pub const COMPOSITION_MIN: usize = 5;
pub const COMPOSITION_MAX: usize = 35;
pub const BREAKDOWN_DEFAULT_PICKS: usize = 3;
pub const RATIO_BAR_DEFAULT_PICKS: usize = 8;

/// Money metric the ranking tab orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Revenue,
    Expenditure,
    Surplus,
}

impl RankMetric {
    pub fn key(self) -> SortKey {
        match self {
            RankMetric::Revenue => SortKey::TotalRevenue,
            RankMetric::Expenditure => SortKey::TotalExpenditure,
            RankMetric::Surplus => SortKey::SurplusDeficit,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RankMetric::Revenue => "Top Daerah berdasarkan Total Pendapatan",
            RankMetric::Expenditure => "Top Daerah berdasarkan Total Belanja",
            RankMetric::Surplus => "Top Daerah berdasarkan Surplus/Defisit",
        }
    }
}

/// Ranked rows; the columns depend on the metric.
#[derive(Debug, Clone)]
pub enum Ranking {
    Revenue(Vec<RevenueRankRow>),
    Expenditure(Vec<ExpenditureRankRow>),
    Surplus(Vec<SurplusRankRow>),
}

impl Ranking {
    pub fn len(&self) -> usize {
        match self {
            Ranking::Revenue(rows) => rows.len(),
            Ranking::Expenditure(rows) => rows.len(),
            Ranking::Surplus(rows) => rows.len(),
        }
    }

    pub fn preview(&self, title: &str) {
        match self {
            Ranking::Revenue(rows) => preview_table(title, None, rows, rows.len()),
            Ranking::Expenditure(rows) => preview_table(title, None, rows, rows.len()),
            Ranking::Surplus(rows) => preview_table(title, None, rows, rows.len()),
        }
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        match self {
            Ranking::Revenue(rows) => write_csv(path, rows),
            Ranking::Expenditure(rows) => write_csv(path, rows),
            Ranking::Surplus(rows) => write_csv(path, rows),
        }
    }
}

/// Ranking tab: top `limit` regions by one of the three money metrics.
pub fn ranking(rows: &[&RegionSummary], metric: RankMetric, limit: usize) -> Ranking {
    let top = top_n(rows, metric.key(), limit).into_iter().zip(1..);
    match metric {
        RankMetric::Revenue => Ranking::Revenue(
            top.map(|(r, rank)| RevenueRankRow {
                rank,
                region: r.region.clone(),
                province: r.province.clone(),
                island: r.island.clone(),
                total_revenue: format_idr(r.total_revenue),
                own_source_revenue: format_idr(r.own_source_revenue),
                own_source_ratio: format_pct(r.own_source_ratio),
            })
            .collect(),
        ),
        RankMetric::Expenditure => Ranking::Expenditure(
            top.map(|(r, rank)| ExpenditureRankRow {
                rank,
                region: r.region.clone(),
                province: r.province.clone(),
                island: r.island.clone(),
                total_expenditure: format_idr(r.total_expenditure),
                operating: format_idr(r.operating_expenditure),
                capital: format_idr(r.capital_expenditure),
                capital_ratio: format_pct(r.capital_ratio),
            })
            .collect(),
        ),
        RankMetric::Surplus => Ranking::Surplus(
            top.map(|(r, rank)| SurplusRankRow {
                rank,
                region: r.region.clone(),
                province: r.province.clone(),
                island: r.island.clone(),
                surplus_deficit: format_idr(r.surplus_deficit),
                total_revenue: format_idr(r.total_revenue),
                total_expenditure: format_idr(r.total_expenditure),
                own_source_ratio: format_pct(r.own_source_ratio),
            })
            .collect(),
        ),
    }
}

/// "Insight cepat": the regions with the highest capital and operating ratios.
pub fn quick_insights(rows: &[&RegionSummary]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(top) = ratio_insights(rows, SortKey::CapitalRatio).into_iter().next() {
        lines.push(format!(
            "Belanja modal paling tinggi (rasio): {} ({}) dari total belanja.",
            top.region, top.ratio
        ));
    }
    if let Some(top) = ratio_insights(rows, SortKey::OperatingRatio).into_iter().next() {
        lines.push(format!(
            "Belanja operasi paling 'gendut' (rasio): {} ({}) dari total belanja.",
            top.region, top.ratio
        ));
    }
    lines
}

/// Grouped-bar series: revenue and expenditure for the top regions by revenue.
pub fn revenue_vs_expenditure(rows: &[&RegionSummary]) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    for r in top_n(rows, SortKey::TotalRevenue, CHART_LIMIT) {
        for (series, value) in [
            ("Pendapatan", r.total_revenue),
            ("Belanja", r.total_expenditure),
        ] {
            points.push(ChartPoint {
                region: r.region.clone(),
                series: series.to_string(),
                value: format_idr(value),
            });
        }
    }
    points
}

/// Composition tab: expenditure components for the top `limit` regions,
/// with `limit` clamped to the slider range.
pub fn composition(rows: &[&RegionSummary], key: SortKey, limit: usize) -> Vec<CompositionRow> {
    let limit = limit.clamp(COMPOSITION_MIN, COMPOSITION_MAX);
    top_n(rows, key, limit)
        .into_iter()
        .map(|r| CompositionRow {
            region: r.region.clone(),
            province: r.province.clone(),
            operating: format_idr(r.operating_expenditure),
            capital: format_idr(r.capital_expenditure),
            contingency: format_idr(r.contingency_expenditure),
            transfer: format_idr(r.transfer_expenditure),
            total: format_idr(r.total_expenditure),
        })
        .collect()
}

/// Highest defined ratios, for the capital and operating insight lists.
pub fn ratio_insights(rows: &[&RegionSummary], key: SortKey) -> Vec<InsightRow> {
    top_n_defined(rows, key, INSIGHT_LIMIT)
        .into_iter()
        .map(|r| InsightRow {
            region: r.region.clone(),
            province: r.province.clone(),
            ratio: format_pct(key.value(r)),
        })
        .collect()
}

pub fn ratio_points(map: &RatioMap<'_>) -> Vec<RatioPointRow> {
    map.points
        .iter()
        .map(|p| RatioPointRow {
            region: p.row.region.clone(),
            island: p.row.island.clone(),
            own_source_ratio: format_pct(Some(p.own_source_ratio)),
            capital_ratio: format_pct(Some(p.capital_ratio)),
            total_revenue: format_idr(p.row.total_revenue),
            quadrant: p.quadrant.label().to_string(),
        })
        .collect()
}

/// Regions for the ratio bar chart: every row whose region is named or, when
/// none are named, the top regions by revenue.
pub fn ratio_picks<'a>(rows: &[&'a RegionSummary], names: &[String]) -> Vec<&'a RegionSummary> {
    if names.is_empty() {
        return top_n(rows, SortKey::TotalRevenue, RATIO_BAR_DEFAULT_PICKS);
    }
    rows.iter()
        .copied()
        .filter(|r| names.contains(&r.region))
        .collect()
}

/// Grouped-bar series of own-source and capital ratio per picked region.
pub fn ratio_bars(picks: &[&RegionSummary]) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    for r in picks {
        for (series, value) in [
            ("Rasio PAD / Pendapatan", r.own_source_ratio),
            ("Rasio Modal / Belanja", r.capital_ratio),
        ] {
            points.push(ChartPoint {
                region: r.region.clone(),
                series: series.to_string(),
                value: format_pct(value),
            });
        }
    }
    points
}

pub fn breakdown_rows(row: &RegionSummary) -> Vec<BreakdownRow> {
    breakdown(row)
        .into_iter()
        .map(|s| BreakdownRow {
            component: s.label.to_string(),
            value: format_idr(s.value),
            share: format_pct(s.share),
        })
        .collect()
}

/// Regions for the pie view: the named ones (first match each, in the order
/// given) or, when none are named, the top regions by expenditure.
pub fn breakdown_picks<'a>(rows: &[&'a RegionSummary], names: &[String]) -> Vec<&'a RegionSummary> {
    if names.is_empty() {
        return top_n(rows, SortKey::TotalExpenditure, BREAKDOWN_DEFAULT_PICKS);
    }
    names
        .iter()
        .filter_map(|name| rows.iter().copied().find(|r| &r.region == name))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct RatioSummary {
    pub points: usize,
    pub own_source_median: f64,
    pub capital_median: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary<'a> {
    pub filter: &'a Filter,
    pub totals: Totals,
    pub load: &'a LoadReport,
    pub ratios: RatioSummary,
    pub top_own_source_ratio: Option<String>,
    pub top_capital_ratio: Option<String>,
    pub top_operating_ratio: Option<String>,
}

pub fn generate_summary<'a>(
    rows: &[&RegionSummary],
    filter: &'a Filter,
    load: &'a LoadReport,
) -> DashboardSummary<'a> {
    let map = ratio_map(rows);
    let leader = |key: SortKey| {
        top_n_defined(rows, key, 1)
            .first()
            .map(|r| r.region.clone())
    };
    DashboardSummary {
        filter,
        totals: totals(rows),
        load,
        ratios: RatioSummary {
            points: map.points.len(),
            own_source_median: map.own_source_median,
            capital_median: map.capital_median,
        },
        top_own_source_ratio: leader(SortKey::OwnSourceRatio),
        top_capital_ratio: leader(SortKey::CapitalRatio),
        top_operating_ratio: leader(SortKey::OperatingRatio),
    }
}
