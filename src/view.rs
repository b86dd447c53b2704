//! Filtering, ranking and derived views over region summaries.
//!
//! Everything here works on already-aggregated `RegionSummary` rows; nothing
//! re-derives totals from line items.

use crate::aggregate::ratio;
use crate::rules::Bucket;
use crate::types::{LineItem, RegionSummary, Totals};
use crate::util::median;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Sidebar-style filter. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Filter {
    pub island: Option<String>,
    pub provinces: Vec<String>,
    pub query: Option<String>,
}

impl Filter {
    pub fn matches(&self, row: &RegionSummary) -> bool {
        if let Some(island) = &self.island {
            if &row.island != island {
                return false;
            }
        }
        if !self.provinces.is_empty() && !self.provinces.contains(&row.province) {
            return false;
        }
        if let Some(query) = self.query.as_deref().map(str::trim) {
            if !query.is_empty() {
                let q = query.to_lowercase();
                let hit = [&row.region, &row.province, &row.island]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q));
                if !hit {
                    return false;
                }
            }
        }
        true
    }

    pub fn apply<'a>(&self, rows: &'a [RegionSummary]) -> Vec<&'a RegionSummary> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// Island choices for the filter: unique, non-blank, sorted.
pub fn island_options(items: &[LineItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.island.as_str())
        .filter(|s| !s.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn province_options(items: &[LineItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.province.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TotalRevenue,
    TotalExpenditure,
    SurplusDeficit,
    OwnSourceRatio,
    CapitalRatio,
    OperatingRatio,
}

impl SortKey {
    pub fn value(self, row: &RegionSummary) -> Option<f64> {
        match self {
            SortKey::TotalRevenue => Some(row.total_revenue),
            SortKey::TotalExpenditure => Some(row.total_expenditure),
            SortKey::SurplusDeficit => Some(row.surplus_deficit),
            SortKey::OwnSourceRatio => row.own_source_ratio,
            SortKey::CapitalRatio => row.capital_ratio,
            SortKey::OperatingRatio => row.operating_ratio,
        }
    }
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    // Undefined values sort after every defined one.
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The `n` rows with the largest `key`, undefined values last, ties kept in
/// input order.
pub fn top_n<'a>(rows: &[&'a RegionSummary], key: SortKey, n: usize) -> Vec<&'a RegionSummary> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| descending(key.value(a), key.value(b)));
    sorted.truncate(n);
    sorted
}

/// Like [`top_n`] but drops rows whose key is undefined.
pub fn top_n_defined<'a>(
    rows: &[&'a RegionSummary],
    key: SortKey,
    n: usize,
) -> Vec<&'a RegionSummary> {
    let defined: Vec<&RegionSummary> = rows
        .iter()
        .copied()
        .filter(|r| key.value(r).is_some())
        .collect();
    top_n(&defined, key, n)
}

pub fn totals(rows: &[&RegionSummary]) -> Totals {
    let total_revenue: f64 = rows.iter().map(|r| r.total_revenue).sum();
    let total_expenditure: f64 = rows.iter().map(|r| r.total_expenditure).sum();
    let surplus_deficit: f64 = rows.iter().map(|r| r.surplus_deficit).sum();
    let surplus_label = if surplus_deficit >= 0.0 {
        "Surplus (net)"
    } else {
        "Defisit (net)"
    };
    Totals {
        region_count: rows.len(),
        total_revenue,
        total_expenditure,
        surplus_deficit,
        surplus_label: surplus_label.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    UpperRight,
    LowerRight,
    UpperLeft,
    LowerLeft,
}

impl Quadrant {
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::UpperRight => "kanan-atas",
            Quadrant::LowerRight => "kanan-bawah",
            Quadrant::UpperLeft => "kiri-atas",
            Quadrant::LowerLeft => "kiri-bawah",
        }
    }

    fn locate(x: f64, y: f64, x_median: f64, y_median: f64) -> Self {
        match (x >= x_median, y >= y_median) {
            (true, true) => Quadrant::UpperRight,
            (true, false) => Quadrant::LowerRight,
            (false, true) => Quadrant::UpperLeft,
            (false, false) => Quadrant::LowerLeft,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatioPoint<'a> {
    pub row: &'a RegionSummary,
    pub own_source_ratio: f64,
    pub capital_ratio: f64,
    pub quadrant: Quadrant,
}

/// Own-source ratio (x) against capital ratio (y), split at the medians.
#[derive(Debug, Clone)]
pub struct RatioMap<'a> {
    pub points: Vec<RatioPoint<'a>>,
    pub own_source_median: f64,
    pub capital_median: f64,
}

pub fn ratio_map<'a>(rows: &[&'a RegionSummary]) -> RatioMap<'a> {
    let defined: Vec<(&RegionSummary, f64, f64)> = rows
        .iter()
        .filter_map(|r| match (r.own_source_ratio, r.capital_ratio) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*r, x, y)),
            _ => None,
        })
        .collect();
    let own_source_median = median(defined.iter().map(|(_, x, _)| *x).collect());
    let capital_median = median(defined.iter().map(|(_, _, y)| *y).collect());
    let points = defined
        .into_iter()
        .map(|(row, x, y)| RatioPoint {
            row,
            own_source_ratio: x,
            capital_ratio: y,
            quadrant: Quadrant::locate(x, y, own_source_median, capital_median),
        })
        .collect();
    RatioMap {
        points,
        own_source_median,
        capital_median,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: &'static str,
    pub value: f64,
    /// Share of the four-component sum; `None` when that sum is not positive.
    pub share: Option<f64>,
}

/// Pie-chart breakdown of one region's expenditure components.
pub fn breakdown(row: &RegionSummary) -> Vec<Slice> {
    let parts = [
        (Bucket::OperatingExpenditure, row.operating_expenditure),
        (Bucket::CapitalExpenditure, row.capital_expenditure),
        (Bucket::ContingencyExpenditure, row.contingency_expenditure),
        (Bucket::TransferExpenditure, row.transfer_expenditure),
    ];
    let sum: f64 = parts.iter().map(|(_, v)| v).sum();
    parts
        .into_iter()
        .map(|(bucket, value)| Slice {
            label: bucket.label(),
            value,
            share: ratio(value, sum),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(
        region: &str,
        province: &str,
        island: &str,
        revenue: f64,
        expenditure: f64,
    ) -> RegionSummary {
        RegionSummary {
            region: region.to_string(),
            province: province.to_string(),
            island: island.to_string(),
            total_revenue: revenue,
            total_expenditure: expenditure,
            own_source_revenue: revenue / 4.0,
            operating_expenditure: expenditure / 2.0,
            capital_expenditure: expenditure / 4.0,
            contingency_expenditure: 0.0,
            transfer_expenditure: expenditure / 4.0,
            surplus_deficit: revenue - expenditure,
            own_source_ratio: ratio(revenue / 4.0, revenue),
            capital_ratio: ratio(expenditure / 4.0, expenditure),
            operating_ratio: ratio(expenditure / 2.0, expenditure),
        }
    }

    fn sample() -> Vec<RegionSummary> {
        vec![
            summary("Kota Bogor", "Jawa Barat", "Jawa", 300.0, 250.0),
            summary("Kab. Badung", "Bali", "Bali dan Nusa Tenggara", 500.0, 600.0),
            summary("Kota Medan", "Sumatera Utara", "Sumatera", 0.0, 100.0),
            summary("Kab. Bogor", "Jawa Barat", "Jawa", 800.0, 0.0),
        ]
    }

    fn item(province: &str, island: &str) -> LineItem {
        LineItem {
            region: "R".to_string(),
            province: province.to_string(),
            island: island.to_string(),
            category1: String::new(),
            category2: String::new(),
            value: 0.0,
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let rows = sample();
        assert_eq!(Filter::default().apply(&rows).len(), 4);
    }

    #[test]
    fn test_filter_island_and_province() {
        let rows = sample();
        let filter = Filter {
            island: Some("Jawa".to_string()),
            provinces: vec!["Jawa Barat".to_string(), "Bali".to_string()],
            query: None,
        };
        let hits = filter.apply(&rows);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.island == "Jawa"));
    }

    #[test]
    fn test_filter_query_is_case_insensitive_substring() {
        let rows = sample();
        let filter = Filter {
            query: Some("  BOGOR ".to_string()),
            ..Filter::default()
        };
        assert_eq!(filter.apply(&rows).len(), 2);

        let by_island = Filter {
            query: Some("nusa".to_string()),
            ..Filter::default()
        };
        assert_eq!(by_island.apply(&rows)[0].region, "Kab. Badung");

        let blank = Filter {
            query: Some("   ".to_string()),
            ..Filter::default()
        };
        assert_eq!(blank.apply(&rows).len(), 4);
    }

    #[test]
    fn test_filter_can_yield_empty() {
        let rows = sample();
        let filter = Filter {
            island: Some("Papua".to_string()),
            ..Filter::default()
        };
        assert!(filter.apply(&rows).is_empty());
        assert_eq!(totals(&[]).region_count, 0);
    }

    #[test]
    fn test_filter_options() {
        let items = vec![
            item("Jawa Barat", "Jawa"),
            item("Bali", " "),
            item("Aceh", "Sumatera"),
            item("Jawa Barat", "Jawa"),
        ];
        assert_eq!(island_options(&items), vec!["Jawa", "Sumatera"]);
        assert_eq!(province_options(&items), vec!["Aceh", "Bali", "Jawa Barat"]);
    }

    #[test]
    fn test_top_n_descending_with_limit() {
        let rows = sample();
        let all = Filter::default().apply(&rows);
        let top = top_n(&all, SortKey::TotalRevenue, 2);
        let names: Vec<&str> = top.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(names, vec!["Kab. Bogor", "Kab. Badung"]);
    }

    #[test]
    fn test_top_n_puts_undefined_ratios_last() {
        let rows = sample();
        let all = Filter::default().apply(&rows);
        let top = top_n(&all, SortKey::OwnSourceRatio, 4);
        assert_eq!(top[3].region, "Kota Medan");

        let defined = top_n_defined(&all, SortKey::CapitalRatio, 10);
        assert_eq!(defined.len(), 3);
        assert!(defined.iter().all(|r| r.capital_ratio.is_some()));
    }

    #[test]
    fn test_totals_label() {
        let rows = sample();
        let all = Filter::default().apply(&rows);
        let t = totals(&all);
        assert_eq!(t.region_count, 4);
        assert_eq!(t.total_revenue, 1600.0);
        assert_eq!(t.total_expenditure, 950.0);
        assert_eq!(t.surplus_deficit, 650.0);
        assert_eq!(t.surplus_label, "Surplus (net)");

        let deficit = totals(&[&rows[1]]);
        assert_eq!(deficit.surplus_label, "Defisit (net)");
    }

    #[test]
    fn test_ratio_map_skips_undefined_and_splits_at_median() {
        let mut rows = sample();
        rows[0].own_source_ratio = Some(0.5);
        rows[0].capital_ratio = Some(0.1);
        rows[1].own_source_ratio = Some(0.1);
        rows[1].capital_ratio = Some(0.3);
        let all = Filter::default().apply(&rows);
        let map = ratio_map(&all);

        assert_eq!(map.points.len(), 2);
        assert!((map.own_source_median - 0.3).abs() < 1e-12);
        assert!((map.capital_median - 0.2).abs() < 1e-12);
        assert_eq!(map.points[0].quadrant, Quadrant::LowerRight);
        assert_eq!(map.points[1].quadrant, Quadrant::UpperLeft);
    }

    #[test]
    fn test_ratio_map_empty() {
        let map = ratio_map(&[]);
        assert!(map.points.is_empty());
        assert_eq!(map.own_source_median, 0.0);
        assert_eq!(map.capital_median, 0.0);
    }

    #[test]
    fn test_breakdown_shares() {
        let rows = sample();
        let slices = breakdown(&rows[0]);
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0].label, "Belanja Operasi");
        assert_eq!(slices[0].share, Some(0.5));
        assert_eq!(slices[2].share, Some(0.0));

        let empty = breakdown(&rows[3]);
        assert!(empty.iter().all(|s| s.share.is_none()));
    }
}
