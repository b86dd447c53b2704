use crate::rules::Bucket;
use crate::types::{LineItem, RegionKey, RegionSummary};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Default)]
struct Acc {
    // A region appears in the output only when it has a revenue or
    // expenditure item; component buckets alone never create a row.
    has_revenue: bool,
    has_expenditure: bool,
    total_revenue: f64,
    total_expenditure: f64,
    own_source_revenue: f64,
    operating: f64,
    capital: f64,
    contingency: f64,
    transfer: f64,
}

impl Acc {
    fn add(&mut self, bucket: Bucket, value: f64) {
        match bucket {
            Bucket::Revenue => {
                self.has_revenue = true;
                self.total_revenue += value;
            }
            Bucket::Expenditure => {
                self.has_expenditure = true;
                self.total_expenditure += value;
            }
            Bucket::OwnSourceRevenue => self.own_source_revenue += value,
            Bucket::OperatingExpenditure => self.operating += value,
            Bucket::CapitalExpenditure => self.capital += value,
            Bucket::ContingencyExpenditure => self.contingency += value,
            Bucket::TransferExpenditure => self.transfer += value,
        }
    }
}

/// `numerator / denominator` when the denominator is strictly positive.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// Reshape long-format line items into one summary row per region.
///
/// Rows come back ordered by `(region, province, island)`. Component sums are
/// keyword matches and are not forced to add up to the expenditure total.
pub fn aggregate(items: &[LineItem]) -> Vec<RegionSummary> {
    let mut map: BTreeMap<RegionKey, Acc> = BTreeMap::new();
    let mut unmatched = 0usize;
    for item in items {
        let buckets: Vec<Bucket> = Bucket::ALL
            .into_iter()
            .filter(|b| b.matches(item))
            .collect();
        if buckets.is_empty() {
            unmatched += 1;
            continue;
        }
        let acc = map.entry(RegionKey::of(item)).or_default();
        for bucket in buckets {
            acc.add(bucket, item.value);
        }
    }

    let rows: Vec<RegionSummary> = map
        .into_iter()
        .filter(|(_, acc)| acc.has_revenue || acc.has_expenditure)
        .map(|(key, acc)| RegionSummary {
            region: key.region,
            province: key.province,
            island: key.island,
            total_revenue: acc.total_revenue,
            total_expenditure: acc.total_expenditure,
            own_source_revenue: acc.own_source_revenue,
            operating_expenditure: acc.operating,
            capital_expenditure: acc.capital,
            contingency_expenditure: acc.contingency,
            transfer_expenditure: acc.transfer,
            surplus_deficit: acc.total_revenue - acc.total_expenditure,
            own_source_ratio: ratio(acc.own_source_revenue, acc.total_revenue),
            capital_ratio: ratio(acc.capital, acc.total_expenditure),
            operating_ratio: ratio(acc.operating, acc.total_expenditure),
        })
        .collect();

    debug!(
        items = items.len(),
        unmatched,
        regions = rows.len(),
        "aggregated region summaries"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(region: &str, category1: &str, category2: &str, value: f64) -> LineItem {
        LineItem {
            region: region.to_string(),
            province: "Prov".to_string(),
            island: "Jawa".to_string(),
            category1: category1.to_string(),
            category2: category2.to_string(),
            value,
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let items = vec![
            item("A", "Pendapatan Daerah", "PAD", 100.0),
            item("A", "Belanja Daerah", "Belanja Modal", 40.0),
        ];
        let rows = aggregate(&items);

        assert_eq!(rows.len(), 1);
        let a = &rows[0];
        assert_eq!(a.total_revenue, 100.0);
        assert_eq!(a.own_source_revenue, 100.0);
        assert_eq!(a.total_expenditure, 40.0);
        assert_eq!(a.capital_expenditure, 40.0);
        assert_eq!(a.operating_expenditure, 0.0);
        assert_eq!(a.surplus_deficit, 60.0);
        assert_eq!(a.own_source_ratio, Some(1.0));
        assert_eq!(a.capital_ratio, Some(1.0));
        assert_eq!(a.operating_ratio, Some(0.0));
    }

    #[test]
    fn test_revenue_only_region_is_kept() {
        let items = vec![
            item("A", "Pendapatan", "PAD", 30.0),
            item("A", "Pendapatan", "Dana Transfer", 70.0),
            item("B", "Belanja", "Belanja Operasi", 5.0),
        ];
        let rows = aggregate(&items);

        assert_eq!(rows.len(), 2);
        let a = &rows[0];
        assert_eq!(a.region, "A");
        assert_eq!(a.total_revenue, 100.0);
        assert_eq!(a.total_expenditure, 0.0);
        assert_eq!(a.operating_expenditure, 0.0);
        assert_eq!(a.capital_expenditure, 0.0);
        assert_eq!(a.contingency_expenditure, 0.0);
        assert_eq!(a.transfer_expenditure, 0.0);
        assert_eq!(a.capital_ratio, None);
        assert_eq!(a.own_source_ratio, Some(0.3));

        let b = &rows[1];
        assert_eq!(b.total_revenue, 0.0);
        assert_eq!(b.own_source_revenue, 0.0);
        assert_eq!(b.own_source_ratio, None);
        assert_eq!(b.operating_ratio, Some(1.0));
    }

    #[test]
    fn test_zero_revenue_gives_undefined_ratio() {
        let items = vec![item("A", "Pendapatan", "PAD", 0.0)];
        let rows = aggregate(&items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].own_source_ratio, None);
    }

    #[test]
    fn test_negative_expenditure_gives_undefined_ratio() {
        let items = vec![item("A", "Belanja", "Belanja Modal", -10.0)];
        let rows = aggregate(&items);
        assert_eq!(rows[0].capital_ratio, None);
        assert_eq!(rows[0].operating_ratio, None);
        assert_eq!(rows[0].surplus_deficit, 10.0);
    }

    #[test]
    fn test_keyword_double_counting() {
        let items = vec![item(
            "A",
            "Belanja Daerah",
            "Belanja Operasi dan Belanja Modal",
            10.0,
        )];
        let rows = aggregate(&items);
        let a = &rows[0];
        assert_eq!(a.operating_expenditure, 10.0);
        assert_eq!(a.capital_expenditure, 10.0);
        assert_eq!(a.total_expenditure, 10.0);
    }

    #[test]
    fn test_abbreviated_capital_keyword_is_not_matched() {
        let items = vec![item("A", "Belanja Daerah", "Belanja Operasi dan Modal", 10.0)];
        let rows = aggregate(&items);
        let a = &rows[0];
        assert_eq!(a.operating_expenditure, 10.0);
        assert_eq!(a.capital_expenditure, 0.0);
        assert_eq!(a.total_expenditure, 10.0);
        assert_eq!(a.capital_ratio, Some(0.0));
    }

    #[test]
    fn test_unmatched_items_are_excluded() {
        let items = vec![
            item("A", "Pendapatan", "PAD", 10.0),
            item("A", "Pembiayaan", "Penerimaan", 999.0),
            item("C", "Pembiayaan", "Pengeluaran", 5.0),
        ];
        let rows = aggregate(&items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_revenue, 10.0);
        assert_eq!(rows[0].total_expenditure, 0.0);
    }

    #[test]
    fn test_grouping_key_includes_province_and_island() {
        let mut other = item("A", "Pendapatan", "PAD", 5.0);
        other.province = "Other".to_string();
        let items = vec![item("A", "Pendapatan", "PAD", 1.0), other];
        let rows = aggregate(&items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province, "Other");
        assert_eq!(rows[1].province, "Prov");
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let items = vec![
            item("B", "Pendapatan", "PAD", 0.1),
            item("A", "Belanja", "Belanja Transfer", 0.2),
            item("A", "Belanja", "Belanja Tidak Terduga", 0.3),
            item("B", "Pendapatan", "Lain", 0.7),
        ];
        let first = aggregate(&items);
        let second = aggregate(&items);
        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(&second) {
            assert_eq!(x.total_revenue.to_bits(), y.total_revenue.to_bits());
            assert_eq!(
                x.total_expenditure.to_bits(),
                y.total_expenditure.to_bits()
            );
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_ratio_guard() {
        assert_eq!(ratio(1.0, 0.0), None);
        assert_eq!(ratio(1.0, -2.0), None);
        assert_eq!(ratio(1.0, 4.0), Some(0.25));
    }
}
