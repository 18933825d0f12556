use super::{DataSource, DataSourceError, RowFilter, DEFAULT_FETCH_LIMIT};
use crate::scoring::{parse_records, MetricsRecord, MetricsRow, RejectedRow};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads rows from a CSV export of the BI dataset.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses an export, returning valid rows and the records that were rejected.
    pub fn parse<R: Read>(reader: R) -> Result<(Vec<MetricsRow>, Vec<RejectedRow>), csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = csv_reader
            .deserialize::<MetricsRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(parse_records(records))
    }
}

impl DataSource for CsvDataSource {
    fn fetch_rows(&self, filter: Option<&RowFilter>) -> Result<Vec<MetricsRow>, DataSourceError> {
        self.fetch_with_rejections(filter).map(|(rows, _)| rows)
    }

    fn fetch_with_rejections(
        &self,
        filter: Option<&RowFilter>,
    ) -> Result<(Vec<MetricsRow>, Vec<RejectedRow>), DataSourceError> {
        let file = std::fs::File::open(&self.path)?;
        let (rows, rejected) = Self::parse(file)?;

        for rejection in &rejected {
            warn!(
                path = %self.path.display(),
                record = rejection.index,
                reason = %rejection.reason,
                "skipping invalid dataset row"
            );
        }

        let filter = match filter {
            Some(filter) if filter.limit.is_some() || !filter.operators.is_empty() => {
                filter.clone()
            }
            _ => RowFilter::default().with_limit(DEFAULT_FETCH_LIMIT),
        };
        let selected = filter.apply(&rows);

        debug!(
            path = %self.path.display(),
            parsed = rows.len(),
            rejected = rejected.len(),
            selected = selected.len(),
            "loaded dataset export"
        );

        Ok((selected, rejected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EXPORT: &str = "Operator,Vessel,Service,BU,Wait Time (Hours): ATB-BTR,Arrival Accuracy (Final BTR),Berth Time (hours): ATU - ATB,Bunker Saved (USD),Carbon Abatement (Tonnes)\n\
GRN,Aurora,AEX,Asia,1.5,Y,22,31000,0.42\n\
NVX,Borealis,,Europe,12,N,61,-4000,0.1\n\
EVO,Cygnus,AEX,Asia,,Y,20,1000,0.3\n\
CRY,Dorado,TPX,Asia,3,maybe,20,1000,0.3\n";

    #[test]
    fn parses_bi_export_and_reports_invalid_rows() {
        let (rows, rejected) = CsvDataSource::parse(Cursor::new(EXPORT)).expect("csv parses");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].operator, "GRN");
        assert_eq!(rows[0].service.as_deref(), Some("AEX"));
        assert_eq!(rows[0].business_unit.as_deref(), Some("Asia"));
        assert!(rows[0].arrival_accurate);
        assert_eq!(rows[1].service, None);
        assert_eq!(rows[1].fuel_cost_saved, -4000.0);
        assert!(!rows[1].arrival_accurate);

        let indexes: Vec<usize> = rejected.iter().map(|rejection| rejection.index).collect();
        assert_eq!(indexes, vec![2, 3]);
    }

    #[test]
    fn fetch_reports_rejections_from_the_export() {
        let path = std::env::temp_dir().join(format!("praxis-ingest-{}.csv", std::process::id()));
        std::fs::write(&path, EXPORT).expect("write export");

        let source = CsvDataSource::new(&path);
        let fetched = source.fetch_with_rejections(None);
        let rows_only = source.fetch_rows(None);
        std::fs::remove_file(&path).ok();

        let (rows, rejected) = fetched.expect("export loads");
        assert_eq!(rows.len(), 2);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].index, 2);
        assert_eq!(rows_only.expect("export loads").len(), 2);
    }

    #[test]
    fn fetch_propagates_missing_file() {
        let source = CsvDataSource::new("./does-not-exist.csv");
        match source.fetch_rows(None) {
            Err(DataSourceError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
