//! Command-line arguments.

use crate::logging::LogFormat;
use crate::reports::RankMetric;
use crate::view::{Filter, SortKey};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/APBD_2023.csv";

#[derive(Parser)]
#[command(
    name = "apbd_report",
    version,
    about = "APBD 2023 regional fiscal dashboard",
    long_about = "Summarize a long-format APBD budget table per region: revenue, \
                  expenditure, expenditure composition and fiscal ratios."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Long-format budget CSV.
    #[arg(long = "data", value_name = "PATH", default_value = DEFAULT_DATA_PATH, global = true)]
    pub data: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only regions on this island.
    #[arg(long, global = true)]
    pub island: Option<String>,

    /// Keep only regions in these provinces (repeatable).
    #[arg(long = "province", value_name = "PROVINCE", global = true)]
    pub provinces: Vec<String>,

    /// Case-insensitive search over region, province and island.
    #[arg(long = "search", value_name = "TEXT", global = true)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Filter {
        Filter {
            island: self.island.clone(),
            provinces: self.provinces.clone(),
            query: self.search.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// KPI totals for the filtered regions.
    Summary,

    /// Top regions by revenue, expenditure or surplus.
    Rank {
        #[arg(long, value_enum, default_value = "revenue")]
        by: RankByArg,
        #[arg(long, default_value_t = crate::reports::RANKING_LIMIT)]
        limit: usize,
    },

    /// Expenditure composition per region.
    Composition {
        #[arg(long, value_enum, default_value = "expenditure")]
        by: CompositionByArg,
        /// Number of regions (5..=35).
        #[arg(long, default_value_t = crate::reports::COMPOSITION_DEFAULT)]
        limit: usize,
    },

    /// Ratio bars for selected regions (default: top 8 by revenue) and the
    /// own-source against capital ratio map with quadrants.
    Ratios {
        #[arg(value_name = "REGION")]
        regions: Vec<String>,
    },

    /// Expenditure breakdown for selected regions (default: top 3 by expenditure).
    Breakdown {
        #[arg(value_name = "REGION")]
        regions: Vec<String>,
    },

    /// Write summary tables and summary.json to a directory.
    Export {
        #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Menu-driven session over all views (default).
    Interactive,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RankByArg {
    Revenue,
    Expenditure,
    Surplus,
}

impl From<RankByArg> for RankMetric {
    fn from(value: RankByArg) -> Self {
        match value {
            RankByArg::Revenue => RankMetric::Revenue,
            RankByArg::Expenditure => RankMetric::Expenditure,
            RankByArg::Surplus => RankMetric::Surplus,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompositionByArg {
    Expenditure,
    CapitalRatio,
    OperatingRatio,
}

impl From<CompositionByArg> for SortKey {
    fn from(value: CompositionByArg) -> Self {
        match value {
            CompositionByArg::Expenditure => SortKey::TotalExpenditure,
            CompositionByArg::CapitalRatio => SortKey::CapitalRatio,
            CompositionByArg::OperatingRatio => SortKey::OperatingRatio,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
