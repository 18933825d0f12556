//! Row suppliers for the scoring engine and scored-row export.

mod csv_source;
mod export;

pub use csv_source::CsvDataSource;
pub use export::{write_scored_csv, ExportError};

use crate::scoring::{MetricsRow, RejectedRow};

/// Default row cap for unfiltered fetches.
pub const DEFAULT_FETCH_LIMIT: usize = 300;

/// Narrows a fetch to specific operators and/or a maximum number of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub operators: Vec<String>,
    pub limit: Option<usize>,
}

impl RowFilter {
    pub fn operators<I, S>(operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operators: operators.into_iter().map(Into::into).collect(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &MetricsRow) -> bool {
        self.operators.is_empty()
            || self
                .operators
                .iter()
                .any(|operator| operator.eq_ignore_ascii_case(&row.operator))
    }

    pub fn apply(&self, rows: &[MetricsRow]) -> Vec<MetricsRow> {
        let limit = self.limit.unwrap_or(usize::MAX);
        rows.iter()
            .filter(|row| self.matches(row))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Failure to obtain rows; callers propagate it rather than retrying.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset export: {0}")]
    Csv(#[from] csv::Error),
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies metrics rows, optionally filtered.
pub trait DataSource {
    fn fetch_rows(&self, filter: Option<&RowFilter>) -> Result<Vec<MetricsRow>, DataSourceError>;

    /// Like [`DataSource::fetch_rows`], also returning records rejected at ingest.
    /// Sources that cannot hold invalid records report none.
    fn fetch_with_rejections(
        &self,
        filter: Option<&RowFilter>,
    ) -> Result<(Vec<MetricsRow>, Vec<RejectedRow>), DataSourceError> {
        Ok((self.fetch_rows(filter)?, Vec::new()))
    }
}

/// Rows held in memory; used for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDataSource {
    rows: Vec<MetricsRow>,
}

impl StaticDataSource {
    pub fn new(rows: Vec<MetricsRow>) -> Self {
        Self { rows }
    }
}

impl DataSource for StaticDataSource {
    fn fetch_rows(&self, filter: Option<&RowFilter>) -> Result<Vec<MetricsRow>, DataSourceError> {
        Ok(match filter {
            Some(filter) => filter.apply(&self.rows),
            None => self.rows.clone(),
        })
    }
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn fetch_rows(&self, filter: Option<&RowFilter>) -> Result<Vec<MetricsRow>, DataSourceError> {
        (**self).fetch_rows(filter)
    }

    fn fetch_with_rejections(
        &self,
        filter: Option<&RowFilter>,
    ) -> Result<(Vec<MetricsRow>, Vec<RejectedRow>), DataSourceError> {
        (**self).fetch_with_rejections(filter)
    }
}
