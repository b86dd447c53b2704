//! One function per dashboard view. Each prints its tables to stdout.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::output::{preview_table, write_csv, write_json};
use crate::reports::{
    breakdown_picks, breakdown_rows, composition, generate_summary, quick_insights, ranking,
    ratio_bars, ratio_insights, ratio_picks, ratio_points, revenue_vs_expenditure, RankMetric,
    COMPOSITION_MAX, RANKING_LIMIT,
};
use crate::types::{KpiRow, RegionSummary, SummaryCsvRow};
use crate::util::{format_idr, format_int, format_number, format_pct};
use crate::view::{ratio_map, top_n_defined, totals, Filter, SortKey};
use std::path::Path;
use tracing::{info, warn};

/// Filtered rows, or `None` (after telling the user) when nothing matches.
pub fn filtered<'a>(dataset: &'a Dataset, filter: &Filter) -> Option<Vec<&'a RegionSummary>> {
    let rows = filter.apply(&dataset.summaries);
    if rows.is_empty() {
        warn!(?filter, "filter matched no regions");
        println!("Tidak ada data yang cocok dengan filter. Coba reset filter.\n");
        return None;
    }
    Some(rows)
}

pub fn kpi_rows(rows: &[&RegionSummary]) -> Vec<KpiRow> {
    let t = totals(rows);
    vec![
        KpiRow {
            label: "Jumlah daerah (terfilter)".to_string(),
            value: format_int(t.region_count),
            hint: "unit pemda".to_string(),
        },
        KpiRow {
            label: "Total pendapatan".to_string(),
            value: format_idr(t.total_revenue),
            hint: "akumulasi".to_string(),
        },
        KpiRow {
            label: "Total belanja".to_string(),
            value: format_idr(t.total_expenditure),
            hint: "akumulasi".to_string(),
        },
        KpiRow {
            label: t.surplus_label,
            value: format_idr(t.surplus_deficit),
            hint: "pendapatan - belanja".to_string(),
        },
    ]
}

pub fn run_summary(dataset: &Dataset, filter: &Filter) -> Result<()> {
    let Some(rows) = filtered(dataset, filter) else {
        return Ok(());
    };
    preview_table("Ringkasan APBD 2023", None, &kpi_rows(&rows), 4);

    let insights = quick_insights(&rows);
    if !insights.is_empty() {
        println!("Insight cepat");
        for line in &insights {
            println!("- {}", line);
        }
        println!();
    }
    Ok(())
}

pub fn run_rank(dataset: &Dataset, filter: &Filter, metric: RankMetric, limit: usize) -> Result<()> {
    let Some(rows) = filtered(dataset, filter) else {
        return Ok(());
    };
    ranking(&rows, metric, limit).preview(metric.title());

    let series = revenue_vs_expenditure(&rows);
    preview_table(
        "Pendapatan vs Belanja",
        Some("Top 15 berdasarkan total pendapatan"),
        &series,
        series.len(),
    );
    Ok(())
}

pub fn run_composition(dataset: &Dataset, filter: &Filter, key: SortKey, limit: usize) -> Result<()> {
    let Some(rows) = filtered(dataset, filter) else {
        return Ok(());
    };
    let comp = composition(&rows, key, limit);
    preview_table(
        "Komposisi Belanja per Daerah",
        Some("Belanja Operasi / Modal / Tidak Terduga / Transfer"),
        &comp,
        COMPOSITION_MAX,
    );
    preview_table(
        "Proporsi belanja modal besar",
        Some("indikasi investasi jangka panjang"),
        &ratio_insights(&rows, SortKey::CapitalRatio),
        5,
    );
    preview_table(
        "Belanja operasi besar",
        Some("indikasi dominasi biaya rutin"),
        &ratio_insights(&rows, SortKey::OperatingRatio),
        5,
    );
    Ok(())
}

pub fn run_ratios(dataset: &Dataset, filter: &Filter, names: &[String]) -> Result<()> {
    let Some(rows) = filtered(dataset, filter) else {
        return Ok(());
    };
    let bars = ratio_bars(&ratio_picks(&rows, names));
    preview_table(
        "Perbandingan Rasio",
        Some("Rasio PAD / Pendapatan dan Rasio Modal / Belanja per daerah terpilih"),
        &bars,
        bars.len(),
    );

    let map = ratio_map(&rows);
    let points = ratio_points(&map);
    preview_table(
        "Rasio PAD / Total Pendapatan vs Rasio Belanja Modal / Total Belanja",
        Some("hanya daerah dengan kedua rasio terdefinisi"),
        &points,
        points.len(),
    );
    println!(
        "Median rasio PAD: {} | Median rasio modal: {}\n",
        format_pct(Some(map.own_source_median)),
        format_pct(Some(map.capital_median))
    );
    Ok(())
}

pub fn run_breakdown(dataset: &Dataset, filter: &Filter, names: &[String]) -> Result<()> {
    let Some(rows) = filtered(dataset, filter) else {
        return Ok(());
    };
    let picks = breakdown_picks(&rows, names);
    if picks.is_empty() {
        println!("Pilih minimal 1 daerah untuk menampilkan breakdown.\n");
        return Ok(());
    }
    for row in &picks {
        preview_table(&row.region, None, &breakdown_rows(row), 4);
        println!(
            "Total belanja: {} | Rasio modal: {}\n",
            format_idr(row.total_expenditure),
            format_pct(row.capital_ratio)
        );
    }

    let best_modal = top_n_defined(&picks, SortKey::CapitalRatio, 1);
    let best_ops = top_n_defined(&picks, SortKey::OperatingRatio, 1);
    if let (Some(m), Some(o)) = (best_modal.first(), best_ops.first()) {
        println!("Modal tertinggi: {} ({})", m.region, format_pct(m.capital_ratio));
        println!("Operasi tertinggi: {} ({})\n", o.region, format_pct(o.operating_ratio));
    }
    Ok(())
}

pub fn run_export(dataset: &Dataset, filter: &Filter, out_dir: &Path) -> Result<()> {
    let Some(rows) = filtered(dataset, filter) else {
        return Ok(());
    };
    std::fs::create_dir_all(out_dir).map_err(|source| crate::error::ReportError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let summary_rows: Vec<SummaryCsvRow> = rows.iter().map(|r| SummaryCsvRow::from(*r)).collect();
    write_csv(&out_dir.join("region_summary.csv"), &summary_rows)?;
    let ranked = ranking(&rows, RankMetric::Revenue, RANKING_LIMIT);
    ranked.write_csv(&out_dir.join("ranking.csv"))?;
    write_csv(
        &out_dir.join("composition.csv"),
        &composition(&rows, SortKey::TotalExpenditure, COMPOSITION_MAX),
    )?;
    write_csv(&out_dir.join("ratio_map.csv"), &ratio_points(&ratio_map(&rows)))?;

    let summary = generate_summary(&rows, filter, &dataset.report);
    write_json(&out_dir.join("summary.json"), &summary)?;

    info!(
        dir = %out_dir.display(),
        regions = rows.len(),
        ranked = ranked.len(),
        "exported reports"
    );
    println!(
        "Outputs saved to {} ({} regions, net {})",
        out_dir.display(),
        format_int(rows.len()),
        format_number(summary.totals.surplus_deficit, 2)
    );
    Ok(())
}
