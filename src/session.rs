use chrono::{DateTime, Local};

use crate::error::DashboardResult;
use crate::history::{HistoryEntry, HistoryLog};
use crate::pricing::{self, DemandOutlook, PricingInputs, PricingResult};
use crate::seasonal::{SeasonalData, SeasonalRecord};

/// A finished calculation, ready to be shown or saved.
#[derive(Debug, Clone)]
pub struct Quote {
    pub inputs: PricingInputs,
    pub record: SeasonalRecord,
    pub result: PricingResult,
    pub outlook: DemandOutlook,
}

/// State of one dashboard invocation: the dataset and the history log.
///
/// Command handlers receive it explicitly; nothing is kept in globals.
#[derive(Debug)]
pub struct Session {
    pub seasonal: SeasonalData,
    pub history: HistoryLog,
}

impl Session {
    pub fn new(seasonal: SeasonalData, history: HistoryLog) -> Self {
        Session { seasonal, history }
    }

    /// Looks up the seasonal record for the inputs and runs the calculator.
    ///
    /// # Errors
    /// * `DataNotFound` when there is no record for the service and month;
    ///   the calculator is not run in that case.
    /// * Any error of `pricing::calculate`.
    pub fn quote(&self, inputs: PricingInputs) -> DashboardResult<Quote> {
        let record = self.seasonal.lookup(&inputs.service, inputs.month)?;
        let result = pricing::calculate(record, &inputs)?;
        let outlook = pricing::demand_outlook(record, result.required_quantity);
        Ok(Quote {
            record: record.clone(),
            inputs,
            result,
            outlook,
        })
    }

    /// Appends a quote to the history log.
    pub fn save_quote(&mut self, quote: &Quote, at: DateTime<Local>) -> DashboardResult<&HistoryEntry> {
        self.history.append(
            at,
            quote.record.mean_demand,
            quote.inputs.clone(),
            quote.result.clone(),
        )
    }
}
