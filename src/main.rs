// Entry point and high-level CLI flow.
//
// Each subcommand loads the dataset once and prints one dashboard view.
// Without a subcommand the program runs a menu loop that keeps the loaded
// dataset in a `DatasetCache`, so switching views never re-reads the file
// unless it changed on disk.
mod aggregate;
mod cli;
mod commands;
mod dataset;
mod error;
mod loader;
mod logging;
mod output;
mod reports;
mod rules;
mod types;
mod util;
mod view;

use clap::Parser;
use cli::{Cli, Command};
use dataset::{Dataset, DatasetCache};
use error::Result;
use logging::{init_logging, LogConfig};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use reports::RankMetric;
use view::{Filter, SortKey};

/// Read a single line of input after printing `prompt`; `None` at end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Comma-separated list of names; blank entries are dropped.
fn read_names(prompt: &str) -> Vec<String> {
    read_line(prompt)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask whether to go back to the view selection menu.
///
/// Returns `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to View Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(dataset: &Dataset) {
    println!(
        "Processing dataset... ({} rows loaded, {} regions)",
        util::format_int(dataset.report.total_rows),
        util::format_int(dataset.summaries.len())
    );
    if dataset.report.coerced_values > 0 {
        println!(
            "Note: {} non-numeric values treated as 0.",
            util::format_int(dataset.report.coerced_values)
        );
    }
    println!();
}

struct Session {
    data_path: PathBuf,
    filter: Filter,
    cache: DatasetCache,
}

impl Session {
    fn dataset(&mut self) -> Result<&Dataset> {
        self.cache.get_or_load(&self.data_path)
    }

    fn run_view(&mut self, choice: &str) -> Result<()> {
        let filter = self.filter.clone();
        match choice {
            "1" => {
                let dataset = self.dataset()?;
                if commands::filtered(dataset, &filter).is_none() {
                    return Ok(());
                }
                commands::run_summary(dataset, &filter)?;
                commands::run_rank(dataset, &filter, RankMetric::Revenue, reports::RANKING_LIMIT)
            }
            "2" => {
                let limit = read_line("Jumlah daerah (5-35, default 15): ")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(reports::COMPOSITION_DEFAULT);
                let dataset = self.dataset()?;
                commands::run_composition(dataset, &filter, SortKey::TotalExpenditure, limit)
            }
            "3" => {
                let names = read_names("Daerah (pisahkan dengan koma, kosong = top 8): ");
                commands::run_ratios(self.dataset()?, &filter, &names)
            }
            "4" => {
                let names = read_names("Daerah (pisahkan dengan koma, kosong = top 3): ");
                commands::run_breakdown(self.dataset()?, &filter, &names)
            }
            _ => Ok(()),
        }
    }

    fn edit_filter(&mut self) -> Result<()> {
        let dataset = self.dataset()?;
        let islands = view::island_options(&dataset.items);
        let province_choices = view::province_options(&dataset.items);
        println!("Pulau: (Semua), {}", islands.join(", "));
        let island = read_line("Pulau (kosong = semua): ").unwrap_or_default();
        println!("Provinsi tersedia: {}", util::format_int(province_choices.len()));
        let provinces = read_names("Provinsi (pisahkan dengan koma, kosong = semua): ");
        let query = read_line("Cari daerah / provinsi: ").unwrap_or_default();

        self.filter = Filter {
            island: (!island.is_empty() && island != "(Semua)").then_some(island),
            provinces,
            query: (!query.is_empty()).then_some(query),
        };
        println!();
        Ok(())
    }
}

fn run_interactive(data_path: &Path, filter: Filter) -> Result<()> {
    let mut session = Session {
        data_path: data_path.to_path_buf(),
        filter,
        cache: DatasetCache::new(),
    };
    // A load failure here is fatal for the session.
    print_load_report(session.dataset()?);

    loop {
        println!("Select View:");
        println!("[1] Ringkasan");
        println!("[2] Komposisi Belanja");
        println!("[3] Rasio & Kinerja");
        println!("[4] Breakdown Daerah");
        println!("[5] Filter");
        println!("[6] Reload data\n");
        let Some(choice) = read_line("Enter choice: ") else {
            return Ok(());
        };
        match choice.as_str() {
            choice @ ("1" | "2" | "3" | "4") => {
                println!();
                session.run_view(choice)?;
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    return Ok(());
                }
            }
            "5" => session.edit_filter()?,
            "6" => {
                session.cache.invalidate();
                print_load_report(session.dataset()?);
            }
            _ => println!("Invalid choice. Please enter 1 to 6.\n"),
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = cli.filter.to_filter();
    let command = cli.command.unwrap_or(Command::Interactive);
    if let Command::Interactive = command {
        return run_interactive(&cli.data, filter);
    }

    let dataset = Dataset::load(&cli.data)?;
    print_load_report(&dataset);
    match command {
        Command::Summary => commands::run_summary(&dataset, &filter),
        Command::Rank { by, limit } => commands::run_rank(&dataset, &filter, by.into(), limit),
        Command::Composition { by, limit } => {
            commands::run_composition(&dataset, &filter, by.into(), limit)
        }
        Command::Ratios { regions } => commands::run_ratios(&dataset, &filter, &regions),
        Command::Breakdown { regions } => commands::run_breakdown(&dataset, &filter, &regions),
        Command::Export { out_dir } => commands::run_export(&dataset, &filter, &out_dir),
        Command::Interactive => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format.into())
        .with_ansi(io::stderr().is_terminal());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
