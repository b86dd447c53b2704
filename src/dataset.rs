use crate::aggregate::aggregate;
use crate::error::{ReportError, Result};
use crate::loader::{self, LoadReport};
use crate::types::{LineItem, RegionSummary};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Immutable result of one load + aggregate pass over the source file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub items: Vec<LineItem>,
    pub summaries: Vec<RegionSummary>,
    pub report: LoadReport,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let (items, report) = loader::load(path)?;
        Ok(Self::from_items(items, report))
    }

    pub fn from_items(items: Vec<LineItem>, report: LoadReport) -> Self {
        let summaries = aggregate(&items);
        Self {
            items,
            summaries,
            report,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Caller-owned memo of the last loaded dataset.
///
/// The cached dataset is reused while the file's path, modification time and
/// size stay the same; any change triggers a full reload.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(Fingerprint, Dataset)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<&Dataset> {
        let fingerprint = Fingerprint::of(path)?;
        match self.entry.take() {
            Some((cached, dataset)) if cached == fingerprint => {
                debug!(path = %path.display(), "dataset cache hit");
                Ok(&self.entry.insert((cached, dataset)).1)
            }
            _ => {
                let dataset = Dataset::load(path)?;
                info!(
                    path = %path.display(),
                    rows = dataset.items.len(),
                    regions = dataset.summaries.len(),
                    "dataset loaded"
                );
                Ok(&self.entry.insert((fingerprint, dataset)).1)
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "region,province,island,category1,category2,value\n";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_dataset_load() {
        let file = create_temp_csv(&format!(
            "{HEADER}A,P,Jawa,Pendapatan,PAD,10\nA,P,Jawa,Belanja,Belanja Modal,4\n"
        ));
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.items.len(), 2);
        assert_eq!(dataset.summaries.len(), 1);
        assert_eq!(dataset.summaries[0].surplus_deficit, 6.0);
    }

    #[test]
    fn test_cache_reuses_unchanged_file() {
        let file = create_temp_csv(&format!("{HEADER}A,P,Jawa,Pendapatan,PAD,10\n"));
        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(file.path()).unwrap().clone();
        let second = cache.get_or_load(file.path()).unwrap();
        assert_eq!(first.summaries, second.summaries);
    }

    #[test]
    fn test_cache_reloads_when_file_changes() {
        let mut file = create_temp_csv(&format!("{HEADER}A,P,Jawa,Pendapatan,PAD,10\n"));
        let mut cache = DatasetCache::new();
        assert_eq!(cache.get_or_load(file.path()).unwrap().items.len(), 1);

        // Appending changes the size even when the mtime granularity is coarse.
        writeln!(file, "B,P,Jawa,Pendapatan,PAD,20").unwrap();
        file.flush().unwrap();
        let reloaded = cache.get_or_load(file.path()).unwrap();
        assert_eq!(reloaded.items.len(), 2);
        assert_eq!(reloaded.summaries.len(), 2);
    }

    #[test]
    fn test_cache_surfaces_schema_error() {
        let file = create_temp_csv("region,value\nA,1\n");
        let mut cache = DatasetCache::new();
        let result = cache.get_or_load(file.path());
        assert!(matches!(result, Err(ReportError::Schema { .. })));
    }
}
