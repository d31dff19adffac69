//! Seasonal demand dataset.
//!
//! Loads the spreadsheet export with one row per (service, month):
//!   Servico, Mes, Media, Desvio_padrao
//! The dataset is read once at startup and never mutated.

use std::collections::HashMap;
use std::io::Read;

use statrs::statistics::Statistics;

use crate::error::{DashboardError, DashboardResult};

const REQUIRED_COLUMNS: [&str; 4] = ["Servico", "Mes", "Media", "Desvio_padrao"];

/// Historical mean and variability of one service's demand in one month.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeasonalRecord {
    #[serde(rename = "Servico")]
    pub service: String,
    #[serde(rename = "Mes")]
    pub month: u32,
    #[serde(rename = "Media")]
    pub mean_demand: f64,
    #[serde(rename = "Desvio_padrao")]
    pub std_dev: f64,
}

/// Yearly picture of one service, shown under its month table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalSummary {
    pub service: String,
    pub months: usize,
    pub annual_mean: f64,
    /// Standard deviation of the monthly means (0 with fewer than two months).
    pub mean_spread: f64,
    pub peak_month: u32,
    pub peak_demand: f64,
    pub low_month: u32,
    pub low_demand: f64,
    pub avg_std_dev: f64,
}

/// Read-only store of seasonal records keyed by (service, month).
#[derive(Debug, Clone, Default)]
pub struct SeasonalData {
    records: Vec<SeasonalRecord>,
    index: HashMap<(String, u32), usize>,
}

impl SeasonalData {
    /// Loads the dataset from any CSV reader.
    ///
    /// # Errors
    /// * `Csv` if the header row cannot be read.
    /// * `InvalidDataset` for missing columns, unparsable rows, months outside
    ///   1-12 or negative/non-finite statistics.
    pub fn load<R: Read>(reader: R) -> DashboardResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(DashboardError::InvalidDataset {
                    line: 1,
                    reason: format!("missing column '{}'", column),
                });
            }
        }

        let mut data = SeasonalData::default();
        for (row, result) in csv_reader.deserialize::<SeasonalRecord>().enumerate() {
            let line = row as u64 + 2;
            let record = result.map_err(|e| DashboardError::InvalidDataset {
                line,
                reason: e.to_string(),
            })?;
            validate_record(&record, line)?;
            data.insert(record);
        }

        tracing::debug!(
            records = data.records.len(),
            services = data.services().len(),
            "seasonal dataset loaded"
        );
        Ok(data)
    }

    /// Loads the dataset from a CSV file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> DashboardResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::load(file)
    }

    /// Builds a store from already parsed records. Duplicates keep the first row.
    #[cfg(test)]
    pub fn from_records(records: impl IntoIterator<Item = SeasonalRecord>) -> Self {
        let mut data = SeasonalData::default();
        for record in records {
            data.insert(record);
        }
        data
    }

    fn insert(&mut self, record: SeasonalRecord) {
        let key = (record.service.clone(), record.month);
        if self.index.contains_key(&key) {
            tracing::warn!(
                service = %record.service,
                month = record.month,
                "duplicate seasonal record ignored"
            );
            return;
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds the record for a service in a month.
    ///
    /// # Errors
    /// * `DataNotFound` when the dataset has no such row.
    pub fn lookup(&self, service: &str, month: u32) -> DashboardResult<&SeasonalRecord> {
        self.index
            .get(&(service.to_string(), month))
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| DashboardError::DataNotFound {
                service: service.to_string(),
                month,
            })
    }

    /// Distinct service names in first-seen order.
    pub fn services(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.service.as_str()) {
                seen.push(&record.service);
            }
        }
        seen
    }

    /// Maps a user query to a service name.
    ///
    /// An exact name wins; otherwise the query must be a case-insensitive
    /// substring of exactly one service.
    pub fn resolve_service(&self, query: &str) -> DashboardResult<&str> {
        let services = self.services();
        if let Some(exact) = services.iter().find(|s| **s == query) {
            return Ok(*exact);
        }

        let needle = query.trim().to_lowercase();
        let matches: Vec<&str> = services
            .into_iter()
            .filter(|s| !needle.is_empty() && s.to_lowercase().contains(&needle))
            .collect();

        match matches.as_slice() {
            [single] => Ok(*single),
            [] => Err(DashboardError::UnknownService(query.to_string())),
            many => Err(DashboardError::AmbiguousService {
                query: query.to_string(),
                candidates: many.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    /// Records of one service sorted by month.
    pub fn series(&self, service: &str) -> Vec<&SeasonalRecord> {
        let mut series: Vec<&SeasonalRecord> = self
            .records
            .iter()
            .filter(|r| r.service == service)
            .collect();
        series.sort_by_key(|r| r.month);
        series
    }

    /// Yearly statistics for one service, `None` when it has no records.
    pub fn summary(&self, service: &str) -> Option<SeasonalSummary> {
        let series = self.series(service);
        let first = series.first()?;

        let means: Vec<f64> = series.iter().map(|r| r.mean_demand).collect();
        let std_devs: Vec<f64> = series.iter().map(|r| r.std_dev).collect();

        let peak = series
            .iter()
            .copied()
            .fold(*first, |best, r| if r.mean_demand > best.mean_demand { r } else { best });
        let low = series
            .iter()
            .copied()
            .fold(*first, |best, r| if r.mean_demand < best.mean_demand { r } else { best });

        let mean_spread = if means.len() > 1 { means.iter().std_dev() } else { 0.0 };

        Some(SeasonalSummary {
            service: service.to_string(),
            months: series.len(),
            annual_mean: means.iter().mean(),
            mean_spread,
            peak_month: peak.month,
            peak_demand: peak.mean_demand,
            low_month: low.month,
            low_demand: low.mean_demand,
            avg_std_dev: std_devs.iter().mean(),
        })
    }
}

fn validate_record(record: &SeasonalRecord, line: u64) -> DashboardResult<()> {
    let invalid = |reason: String| DashboardError::InvalidDataset { line, reason };

    if record.service.is_empty() {
        return Err(invalid("empty service name".to_string()));
    }
    if !(1..=12).contains(&record.month) {
        return Err(invalid(format!("month {} outside 1-12", record.month)));
    }
    if !record.mean_demand.is_finite() || record.mean_demand < 0.0 {
        return Err(invalid(format!("mean demand {} must be >= 0", record.mean_demand)));
    }
    if !record.std_dev.is_finite() || record.std_dev < 0.0 {
        return Err(invalid(format!("standard deviation {} must be >= 0", record.std_dev)));
    }
    Ok(())
}
