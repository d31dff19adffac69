//! Persisted log of saved pricing calculations.
//!
//! The whole log lives in one pretty-printed JSON file that is rewritten on
//! every mutation. Entry ids are assigned from a counter stored alongside the
//! entries, so deleting or clearing never renumbers or reuses them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};
use crate::pricing::{PricingInputs, PricingResult};
use crate::utils;

/// One saved calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub timestamp: DateTime<Local>,
    /// Mean demand of the seasonal record the calculation used.
    pub demand: f64,
    pub inputs: PricingInputs,
    pub result: PricingResult,
    #[serde(default)]
    pub favorite: bool,
}

/// Which entries `HistoryLog::list` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    FavoritesOnly,
}

/// On-disk layout of the history file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryFile {
    next_id: u64,
    entries: Vec<HistoryEntry>,
}

/// Flat row written by `HistoryLog::export_csv`.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: u64,
    timestamp: String,
    service: &'a str,
    month: u32,
    favorite: bool,
    demand: f64,
    original_price: f64,
    service_cost: f64,
    commission_pct: f64,
    desired_profit_increase_pct: f64,
    promotional_price: f64,
    revenue_without_promo: f64,
    commission_without_promo: f64,
    cost_without_promo: f64,
    profit_without_promo: f64,
    required_profit_target: f64,
    required_quantity: i64,
    revenue_with_promo: f64,
    commission_with_promo: f64,
    cost_with_promo: f64,
    profit_with_promo: f64,
}

impl<'a> From<&'a HistoryEntry> for ExportRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        let (inputs, result) = (&entry.inputs, &entry.result);
        ExportRow {
            id: entry.id,
            timestamp: entry.timestamp.to_rfc3339(),
            service: &inputs.service,
            month: inputs.month,
            favorite: entry.favorite,
            demand: entry.demand,
            original_price: inputs.original_price,
            service_cost: inputs.service_cost,
            commission_pct: inputs.commission_pct,
            desired_profit_increase_pct: inputs.desired_profit_increase_pct,
            promotional_price: inputs.promotional_price,
            revenue_without_promo: result.revenue_without_promo,
            commission_without_promo: result.commission_without_promo,
            cost_without_promo: result.cost_without_promo,
            profit_without_promo: result.profit_without_promo,
            required_profit_target: result.required_profit_target,
            required_quantity: result.required_quantity,
            revenue_with_promo: result.revenue_with_promo,
            commission_with_promo: result.commission_with_promo,
            cost_with_promo: result.cost_with_promo,
            profit_with_promo: result.profit_with_promo,
        }
    }
}

/// Ordered, file-backed collection of `HistoryEntry`.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    state: HistoryFile,
}

impl HistoryLog {
    /// Opens the log stored at `path`.
    ///
    /// A missing file is an empty history, not an error.
    ///
    /// # Errors
    /// * `Io` if the file exists but cannot be read.
    /// * `StorageCorrupt` if its content is not a valid history.
    pub fn open<P: AsRef<Path>>(path: P) -> DashboardResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut state = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<HistoryFile>(&content)
                .map_err(|e| corrupt(&path, e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "history store missing, starting empty");
                HistoryFile::default()
            }
            Err(e) => return Err(e.into()),
        };

        let mut seen = HashSet::with_capacity(state.entries.len());
        if let Some(dup) = state.entries.iter().find(|e| !seen.insert(e.id)) {
            return Err(corrupt(&path, format!("entry id {} appears more than once", dup.id)));
        }

        // never hand out an id that is already on disk
        let mut min_next = 0;
        for entry in &state.entries {
            let next = entry
                .id
                .checked_add(1)
                .ok_or_else(|| corrupt(&path, format!("entry id {} leaves no id to assign", entry.id)))?;
            min_next = min_next.max(next);
        }
        state.next_id = state.next_id.max(min_next);

        tracing::debug!(
            path = %path.display(),
            entries = state.entries.len(),
            next_id = state.next_id,
            "history loaded"
        );
        Ok(HistoryLog { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.state.entries.iter().find(|e| e.id == id)
    }

    /// Saves a calculation at the end of the log and persists it.
    ///
    /// # Returns
    /// * `DashboardResult<&HistoryEntry>` - The stored entry with its new id.
    ///
    /// # Errors
    /// * `InvalidInput` if an amount is not finite, since JSON cannot store it.
    /// * `StorageCorrupt` if the id counter is exhausted.
    pub fn append(
        &mut self,
        timestamp: DateTime<Local>,
        demand: f64,
        inputs: PricingInputs,
        result: PricingResult,
    ) -> DashboardResult<&HistoryEntry> {
        if !demand.is_finite() || !result.is_finite() {
            return Err(DashboardError::InvalidInput(
                "calculation has non-finite amounts and cannot be saved".into(),
            ));
        }
        let id = self.state.next_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| corrupt(&self.path, "id counter is exhausted".into()))?;
        self.state.next_id = next_id;
        self.state.entries.push(HistoryEntry {
            id,
            timestamp,
            demand,
            inputs,
            result,
            favorite: false,
        });
        self.save()?;

        tracing::info!(id, "calculation saved to history");
        let idx = self.state.entries.len() - 1;
        Ok(&self.state.entries[idx])
    }

    /// Flips the favorite flag of an entry and persists the log.
    ///
    /// # Returns
    /// * `DashboardResult<bool>` - The new flag value.
    pub fn toggle_favorite(&mut self, id: u64) -> DashboardResult<bool> {
        let entry = self
            .state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DashboardError::NotFound(id))?;
        entry.favorite = !entry.favorite;
        let favorite = entry.favorite;
        self.save()?;

        tracing::info!(id, favorite, "history favorite toggled");
        Ok(favorite)
    }

    /// Removes one entry; later entries move up in storage order but keep their ids.
    pub fn delete(&mut self, id: u64) -> DashboardResult<HistoryEntry> {
        let idx = self
            .position(id)
            .ok_or(DashboardError::NotFound(id))?;
        let removed = self.state.entries.remove(idx);
        self.save()?;

        tracing::info!(id, "history entry deleted");
        Ok(removed)
    }

    /// Removes every entry. The id counter is kept.
    pub fn clear(&mut self) -> DashboardResult<()> {
        let removed = self.state.entries.len();
        self.state.entries.clear();
        self.save()?;

        tracing::info!(removed, "history cleared");
        Ok(())
    }

    /// Entries newest first.
    pub fn list(&self, filter: HistoryFilter) -> Vec<&HistoryEntry> {
        self.state
            .entries
            .iter()
            .rev()
            .filter(|e| filter == HistoryFilter::All || e.favorite)
            .collect()
    }

    /// Writes every entry, oldest first, as a CSV table.
    pub fn export_csv<W: std::io::Write>(&self, writer: W) -> DashboardResult<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for entry in &self.state.entries {
            csv_writer.serialize(ExportRow::from(entry))?;
        }
        csv_writer.flush()?;
        Ok(self.state.entries.len())
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.state.entries.iter().position(|e| e.id == id)
    }

    /// Rewrites the whole file. Not atomic: a crash mid-write can truncate it.
    fn save(&self) -> DashboardResult<()> {
        utils::ensure_parent_dir_exist(&self.path)?;
        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn corrupt(path: &Path, reason: String) -> DashboardError {
    DashboardError::StorageCorrupt {
        path: path.display().to_string(),
        reason,
    }
}
