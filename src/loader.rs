use crate::error::{ReportError, Result};
use crate::types::LineItem;
use crate::util::parse_f64_finite;
use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Canonical columns every input must provide after normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "region",
    "province",
    "island",
    "category1",
    "category2",
    "value",
];

// Alternate (normalized) header names accepted for each canonical column.
static COLUMN_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("daerah", "region"),
        ("namapemda", "region"),
        ("nama_pemda", "region"),
        ("pemda", "region"),
        ("provinsi", "province"),
        ("pulau", "island"),
        ("level1", "category1"),
        ("level2", "category2"),
        ("nilai", "value"),
    ])
});

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Non-empty `value` cells that could not be parsed and became `0.0`.
    pub coerced_values: usize,
    /// Header names after normalization and synonym renaming.
    pub columns: Vec<String>,
}

struct ColumnIndex {
    region: usize,
    province: usize,
    island: usize,
    category1: usize,
    category2: usize,
    value: usize,
}

/// Trim, lowercase and replace spaces with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Map a normalized header name to its canonical name, if it has one.
pub fn canonical_column(normalized: &str) -> &str {
    COLUMN_SYNONYMS
        .get(normalized)
        .copied()
        .unwrap_or(normalized)
}

fn resolve_columns(headers: &StringRecord) -> Result<(ColumnIndex, Vec<String>)> {
    let present: Vec<String> = headers
        .iter()
        .map(|h| canonical_column(&normalize_column_name(h)).to_string())
        .collect();
    // First matching column wins when a name and its synonym both appear.
    let lookup: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|name| present.iter().position(|c| c == name))
        .collect();

    match lookup.as_slice() {
        [Some(region), Some(province), Some(island), Some(category1), Some(category2), Some(value)] => {
            let index = ColumnIndex {
                region: *region,
                province: *province,
                island: *island,
                category1: *category1,
                category2: *category2,
                value: *value,
            };
            Ok((index, present))
        }
        _ => {
            let mut missing: Vec<String> = REQUIRED_COLUMNS
                .iter()
                .zip(&lookup)
                .filter(|(_, pos)| pos.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            missing.sort();
            Err(ReportError::Schema { missing, present })
        }
    }
}

fn text(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").trim().to_string()
}

/// Load and normalize the long-format budget table at `path`.
///
/// Fails with [`ReportError::Schema`] when a required column is missing.
/// Unparsable `value` cells degrade to `0.0`; no row is dropped.
pub fn load(path: &Path) -> Result<(Vec<LineItem>, LoadReport)> {
    let file = File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_items(file, path)
}

/// Same as [`load`] over any reader; `source` only labels errors.
pub fn read_items<R: Read>(reader: R, source: &Path) -> Result<(Vec<LineItem>, LoadReport)> {
    let csv_err = |err: csv::Error| ReportError::Csv {
        path: source.to_path_buf(),
        source: err,
    };
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let (index, columns) = resolve_columns(&headers)?;

    let mut items = Vec::new();
    let mut coerced_values = 0usize;
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        let raw_value = record.get(index.value).unwrap_or("");
        let value = match parse_f64_finite(raw_value) {
            Some(v) => v,
            None => {
                if !raw_value.trim().is_empty() {
                    coerced_values += 1;
                }
                0.0
            }
        };
        items.push(LineItem {
            region: text(&record, index.region),
            province: text(&record, index.province),
            island: text(&record, index.island),
            category1: text(&record, index.category1),
            category2: text(&record, index.category2),
            value,
        });
    }

    debug!(
        path = %source.display(),
        rows = items.len(),
        "loaded line items"
    );
    let report = LoadReport {
        total_rows: items.len(),
        coerced_values,
        columns,
    };
    Ok((items, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn read_str(content: &str) -> Result<(Vec<LineItem>, LoadReport)> {
        read_items(content.as_bytes(), Path::new("inline.csv"))
    }

    /// Collects the field names of every event it sees.
    #[derive(Clone, Default)]
    struct EventFields(Arc<Mutex<Vec<String>>>);

    impl Visit for EventFields {
        fn record_debug(&mut self, field: &Field, _value: &dyn std::fmt::Debug) {
            self.0.lock().unwrap().push(field.name().to_string());
        }
    }

    impl<S: Subscriber> Layer<S> for EventFields {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            event.record(&mut self.clone());
        }
    }

    #[test]
    fn test_load_event_does_not_report_coercions() {
        let fields = EventFields::default();
        let subscriber = tracing_subscriber::registry().with(fields.clone());
        let (_, report) = tracing::subscriber::with_default(subscriber, || {
            read_str(
                "region,province,island,category1,category2,value\n\
                 A,P,Jawa,Pendapatan,PAD,abc\n",
            )
            .unwrap()
        });

        assert_eq!(report.coerced_values, 1);
        let names = fields.0.lock().unwrap();
        assert!(names.iter().any(|n| n == "rows"));
        assert!(!names.iter().any(|n| n == "coerced_values"));
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("  Nama Pemda "), "nama_pemda");
        assert_eq!(normalize_column_name("\u{feff}Daerah"), "daerah");
        assert_eq!(normalize_column_name("VALUE"), "value");
    }

    #[test]
    fn test_load_from_file() {
        let file = create_temp_csv(
            "region,province,island,category1,category2,value,extra\n\
             Kota A, Prov X ,Jawa,Pendapatan Daerah,PAD,100,ignored\n\
             Kota A,Prov X,Jawa,Belanja Daerah,Belanja Modal,40.5,\n",
        );
        let (items, report) = load(file.path()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.coerced_values, 0);
        assert_eq!(items[0].province, "Prov X");
        assert_eq!(items[1].value, 40.5);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load(Path::new("/nonexistent/apbd.csv"));
        assert!(matches!(result, Err(ReportError::Io { .. })));
    }

    #[test]
    fn test_schema_error_lists_exactly_missing_fields() {
        let result = read_str("region,island,category2\nA,Jawa,PAD\n");
        match result {
            Err(ReportError::Schema { missing, present }) => {
                assert_eq!(missing, vec!["category1", "province", "value"]);
                assert_eq!(present, vec!["region", "island", "category2"]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_error_on_empty_input() {
        let result = read_str("");
        match result {
            Err(ReportError::Schema { missing, present }) => {
                assert_eq!(missing.len(), 6);
                assert!(present.is_empty());
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_region_synonym_matches_canonical() {
        let canonical = read_str(
            "region,province,island,category1,category2,value\nA,P,Jawa,Pendapatan,PAD,5\n",
        )
        .unwrap()
        .0;
        for header in ["Nama Pemda", "namapemda", "PEMDA", "daerah"] {
            let csv = format!(
                "{},province,island,category1,category2,value\nA,P,Jawa,Pendapatan,PAD,5\n",
                header
            );
            let (items, _) = read_str(&csv).unwrap();
            assert_eq!(items, canonical, "header {header}");
        }
    }

    #[test]
    fn test_indonesian_headers() {
        let (items, report) = read_str(
            "Daerah,Provinsi,Pulau,Level1,Level2,Nilai\nKab. B,Jawa Barat,Jawa,Belanja,Belanja Operasi,12\n",
        )
        .unwrap();
        assert_eq!(report.columns, REQUIRED_COLUMNS.to_vec());
        assert_eq!(items[0].region, "Kab. B");
        assert_eq!(items[0].category2, "Belanja Operasi");
        assert_eq!(items[0].value, 12.0);
    }

    #[test]
    fn test_first_region_column_wins() {
        let (items, _) = read_str(
            "pemda,daerah,province,island,category1,category2,value\nFirst,Second,P,I,C1,C2,1\n",
        )
        .unwrap();
        assert_eq!(items[0].region, "First");
    }

    #[test]
    fn test_unparsable_value_becomes_zero_and_row_kept() {
        let (items, report) = read_str(
            "region,province,island,category1,category2,value\n\
             A,P,I,Pendapatan,PAD,abc\n\
             B,P,I,Pendapatan,PAD,\n\
             C,P,I,Pendapatan,PAD,\"1,000\"\n\
             D,P,I,Pendapatan,PAD,7\n",
        )
        .unwrap();

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].value, 0.0);
        assert_eq!(items[1].value, 0.0);
        assert_eq!(items[2].value, 0.0);
        assert_eq!(items[3].value, 7.0);
        assert_eq!(report.coerced_values, 2);
    }

    #[test]
    fn test_short_rows_default_to_empty() {
        let (items, _) =
            read_str("region,province,island,category1,category2,value\nA,P\n").unwrap();
        assert_eq!(items[0].island, "");
        assert_eq!(items[0].category2, "");
        assert_eq!(items[0].value, 0.0);
    }
}
