//! Promotional pricing calculator.
//!
//! Compares the month's expected profit at the regular price with the number
//! of services that must be sold at a promotional price to beat it by a
//! desired margin.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{DashboardError, DashboardResult};
use crate::seasonal::SeasonalRecord;

/// User inputs of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    pub service: String,
    pub month: u32,
    pub original_price: f64,
    pub service_cost: f64,
    /// Therapist commission, percent of revenue (0-100).
    pub commission_pct: f64,
    pub desired_profit_increase_pct: f64,
    pub promotional_price: f64,
}

impl PricingInputs {
    /// Checks numeric ranges: every amount finite and non-negative,
    /// commission at most 100 and month within 1-12.
    pub fn validate(&self) -> DashboardResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(DashboardError::InvalidInput(format!(
                "month {} outside 1-12",
                self.month
            )));
        }

        let amounts = [
            ("original price", self.original_price),
            ("service cost", self.service_cost),
            ("commission", self.commission_pct),
            ("desired profit increase", self.desired_profit_increase_pct),
            ("promotional price", self.promotional_price),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(DashboardError::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.commission_pct > 100.0 {
            return Err(DashboardError::InvalidInput(format!(
                "commission must be at most 100%, got {}",
                self.commission_pct
            )));
        }
        Ok(())
    }
}

/// Outcome of one calculation: the regular-price scenario, the profit target
/// and the promotional scenario that reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub revenue_without_promo: f64,
    pub commission_without_promo: f64,
    pub cost_without_promo: f64,
    pub profit_without_promo: f64,
    pub required_profit_target: f64,
    pub required_quantity: i64,
    pub revenue_with_promo: f64,
    pub commission_with_promo: f64,
    pub cost_with_promo: f64,
    pub profit_with_promo: f64,
}

impl PricingResult {
    /// Whether every amount is a finite number. JSON cannot carry the others.
    pub fn is_finite(&self) -> bool {
        [
            self.revenue_without_promo,
            self.commission_without_promo,
            self.cost_without_promo,
            self.profit_without_promo,
            self.required_profit_target,
            self.revenue_with_promo,
            self.commission_with_promo,
            self.cost_with_promo,
            self.profit_with_promo,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Profit change of the promotion in percent.
    ///
    /// `None` when the regular scenario makes no profit, so there is nothing
    /// to compare against.
    pub fn profit_delta_pct(&self) -> Option<f64> {
        if self.profit_without_promo > 0.0 {
            Some((self.profit_with_promo / self.profit_without_promo - 1.0) * 100.0)
        } else {
            None
        }
    }
}

/// How demanding the required quantity is compared with historical demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandOutlook {
    /// Extra sales needed over the mean, in percent.
    pub uplift_pct: Option<f64>,
    /// Distance from the mean in standard deviations.
    pub z_score: Option<f64>,
    /// Chance that demand reaches the required quantity, assuming a normal
    /// distribution of monthly demand.
    pub probability: f64,
}

/// Profit left by one service sold at the promotional price.
pub fn profit_per_promo_unit(inputs: &PricingInputs) -> f64 {
    let rate = inputs.commission_pct / 100.0;
    inputs.promotional_price - inputs.promotional_price * rate - inputs.service_cost
}

/// Runs the break-even calculation for one seasonal record.
///
/// The operation order is part of the contract: results are stored in the
/// history and compared across runs, so they must be reproducible to the bit.
///
/// # Arguments
/// * `record` - Seasonal record matched by the inputs' service and month.
/// * `inputs` - Prices, cost and percentages entered by the user.
///
/// # Returns
/// * `DashboardResult<PricingResult>`
///
/// # Errors
/// * `InvalidInput` if the inputs are out of range.
/// * `InfeasiblePricing` if a promotional sale makes no profit, the required
///   quantity does not fit an integer or an amount overflows to infinity.
pub fn calculate(record: &SeasonalRecord, inputs: &PricingInputs) -> DashboardResult<PricingResult> {
    inputs.validate()?;

    let demand = record.mean_demand;
    let rate = inputs.commission_pct / 100.0;

    let revenue_without_promo = inputs.original_price * demand;
    let commission_without_promo = rate * revenue_without_promo;
    let cost_without_promo = inputs.service_cost * demand;
    let profit_without_promo = revenue_without_promo - commission_without_promo - cost_without_promo;

    let required_profit_target =
        profit_without_promo * (1.0 + inputs.desired_profit_increase_pct / 100.0);

    let per_unit = profit_per_promo_unit(inputs);
    if per_unit <= 0.0 || per_unit.is_nan() {
        return Err(DashboardError::InfeasiblePricing {
            profit_per_unit: per_unit,
            reason: "a promotional sale makes no profit; raise the price or lower the commission/cost",
        });
    }

    // floor + 1 rather than ceil: an exact division asks for one extra unit
    let units = (required_profit_target / per_unit).floor();
    if !units.is_finite() || units.abs() >= i64::MAX as f64 {
        return Err(DashboardError::InfeasiblePricing {
            profit_per_unit: per_unit,
            reason: "the required quantity does not fit an integer",
        });
    }
    let required_quantity = units as i64 + 1;
    let quantity = required_quantity as f64;

    let revenue_with_promo = inputs.promotional_price * quantity;
    let commission_with_promo = revenue_with_promo * rate;
    let cost_with_promo = inputs.service_cost * quantity;
    let profit_with_promo = revenue_with_promo - commission_with_promo - cost_with_promo;

    let result = PricingResult {
        revenue_without_promo,
        commission_without_promo,
        cost_without_promo,
        profit_without_promo,
        required_profit_target,
        required_quantity,
        revenue_with_promo,
        commission_with_promo,
        cost_with_promo,
        profit_with_promo,
    };
    if !result.is_finite() {
        return Err(DashboardError::InfeasiblePricing {
            profit_per_unit: per_unit,
            reason: "the amounts overflow a floating-point number",
        });
    }

    tracing::debug!(
        service = %inputs.service,
        month = inputs.month,
        required_quantity,
        profit_without_promo,
        profit_with_promo,
        "pricing calculated"
    );
    Ok(result)
}

/// Rates the required quantity against the month's demand distribution.
pub fn demand_outlook(record: &SeasonalRecord, required_quantity: i64) -> DemandOutlook {
    let quantity = required_quantity as f64;

    let uplift_pct = if record.mean_demand > 0.0 {
        Some((quantity / record.mean_demand - 1.0) * 100.0)
    } else {
        None
    };

    match Normal::new(record.mean_demand, record.std_dev) {
        Ok(normal) if record.std_dev > 0.0 => DemandOutlook {
            uplift_pct,
            z_score: Some((quantity - record.mean_demand) / record.std_dev),
            probability: normal.sf(quantity),
        },
        _ => DemandOutlook {
            uplift_pct,
            z_score: None,
            probability: if record.mean_demand >= quantity { 1.0 } else { 0.0 },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mean_demand: f64, std_dev: f64) -> SeasonalRecord {
        SeasonalRecord {
            service: "Massagem Relaxante (50 min)".into(),
            month: 1,
            mean_demand,
            std_dev,
        }
    }

    fn inputs(
        original_price: f64,
        service_cost: f64,
        commission_pct: f64,
        desired_profit_increase_pct: f64,
        promotional_price: f64,
    ) -> PricingInputs {
        PricingInputs {
            service: "Massagem Relaxante (50 min)".into(),
            month: 1,
            original_price,
            service_cost,
            commission_pct,
            desired_profit_increase_pct,
            promotional_price,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn worked_example_from_the_pricing_form_defaults() {
        let result = calculate(&record(100.0, 12.0), &inputs(100.0, 20.0, 40.0, 20.0, 80.0)).unwrap();

        assert_close(result.revenue_without_promo, 10_000.0);
        assert_close(result.commission_without_promo, 4_000.0);
        assert_close(result.cost_without_promo, 2_000.0);
        assert_close(result.profit_without_promo, 4_000.0);
        assert_close(result.required_profit_target, 4_800.0);
        assert_eq!(result.required_quantity, 172);

        assert_close(result.revenue_with_promo, 13_760.0);
        assert_close(result.commission_with_promo, 5_504.0);
        assert_close(result.cost_with_promo, 3_440.0);
        assert_close(result.profit_with_promo, 4_816.0);

        assert_close(result.profit_delta_pct().unwrap(), 20.4);
    }

    #[test]
    fn baseline_profit_is_revenue_minus_commission_minus_cost() {
        for &(demand, price, cost, commission) in &[
            (100.0, 100.0, 20.0, 40.0),
            (37.5, 149.9, 31.7, 35.5),
            (12.25, 80.0, 0.0, 0.0),
            (250.0, 65.0, 64.0, 1.0),
        ] {
            let result = calculate(&record(demand, 5.0), &inputs(price, cost, commission, 10.0, price)).unwrap();
            assert_eq!(
                result.profit_without_promo,
                result.revenue_without_promo - result.commission_without_promo - result.cost_without_promo
            );
        }
    }

    #[test]
    fn required_quantity_is_the_smallest_covering_count() {
        for &(demand, price, cost, commission, increase, promo) in &[
            (100.0, 100.0, 20.0, 40.0, 20.0, 80.0),
            (87.3, 120.0, 25.5, 35.0, 15.0, 95.0),
            (42.0, 200.0, 60.0, 30.0, 50.0, 150.0),
            (63.7, 90.0, 10.0, 45.0, 5.5, 70.0),
        ] {
            let i = inputs(price, cost, commission, increase, promo);
            let result = calculate(&record(demand, 5.0), &i).unwrap();
            let per_unit = profit_per_promo_unit(&i);
            let q = result.required_quantity as f64;

            assert!(q * per_unit >= result.required_profit_target);
            assert!((q - 1.0) * per_unit <= result.required_profit_target);
        }
    }

    #[test]
    fn exact_division_asks_for_one_extra_unit() {
        // profit 1000 at regular price, 50 per promotional service
        let result = calculate(&record(10.0, 1.0), &inputs(100.0, 0.0, 0.0, 0.0, 50.0)).unwrap();
        assert_close(result.required_profit_target, 1_000.0);
        assert_eq!(result.required_quantity, 21);
    }

    #[test]
    fn non_positive_unit_profit_is_infeasible() {
        // 50 - 20 - 30 = 0
        let err = calculate(&record(100.0, 5.0), &inputs(100.0, 30.0, 40.0, 20.0, 50.0)).unwrap_err();
        assert!(matches!(err, DashboardError::InfeasiblePricing { .. }));

        let err = calculate(&record(100.0, 5.0), &inputs(100.0, 20.0, 100.0, 20.0, 80.0)).unwrap_err();
        assert!(matches!(err, DashboardError::InfeasiblePricing { .. }));
    }

    #[test]
    fn quantity_beyond_an_integer_is_infeasible() {
        // target 1e12 at 1e-10 per promotional service
        let err = calculate(&record(100.0, 5.0), &inputs(1e10, 0.0, 0.0, 0.0, 1e-10)).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InfeasiblePricing { reason, .. } if reason.contains("integer")
        ));
    }

    #[test]
    fn overflowing_promotional_amounts_are_infeasible() {
        // a billion services at 1e300 overflows the promotional revenue
        let err = calculate(&record(100.0, 5.0), &inputs(1e306, 0.0, 99.9, 900.0, 1e300)).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InfeasiblePricing { reason, .. } if reason.contains("overflow")
        ));
    }

    #[test]
    fn zero_baseline_profit_has_no_delta() {
        let result = calculate(&record(0.0, 0.0), &inputs(100.0, 20.0, 40.0, 20.0, 80.0)).unwrap();
        assert_eq!(result.profit_without_promo, 0.0);
        assert_eq!(result.required_quantity, 1);
        assert_eq!(result.profit_delta_pct(), None);
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        let rec = record(100.0, 5.0);
        for bad in [
            inputs(-1.0, 20.0, 40.0, 20.0, 80.0),
            inputs(100.0, -0.5, 40.0, 20.0, 80.0),
            inputs(100.0, 20.0, 100.5, 20.0, 80.0),
            inputs(100.0, 20.0, 40.0, -20.0, 80.0),
            inputs(100.0, 20.0, 40.0, 20.0, f64::NAN),
        ] {
            assert!(matches!(calculate(&rec, &bad), Err(DashboardError::InvalidInput(_))));
        }

        let mut bad_month = inputs(100.0, 20.0, 40.0, 20.0, 80.0);
        bad_month.month = 13;
        assert!(matches!(calculate(&rec, &bad_month), Err(DashboardError::InvalidInput(_))));
    }

    #[test]
    fn outlook_uses_the_normal_tail() {
        let outlook = demand_outlook(&record(100.0, 10.0), 100);
        assert_close(outlook.uplift_pct.unwrap(), 0.0);
        assert_close(outlook.z_score.unwrap(), 0.0);
        assert!((outlook.probability - 0.5).abs() < 1e-9);

        let outlook = demand_outlook(&record(100.0, 10.0), 172);
        assert_close(outlook.uplift_pct.unwrap(), 72.0);
        assert_close(outlook.z_score.unwrap(), 7.2);
        assert!(outlook.probability < 1e-6);
    }

    #[test]
    fn outlook_without_variability_is_all_or_nothing() {
        let outlook = demand_outlook(&record(100.0, 0.0), 90);
        assert_eq!(outlook.z_score, None);
        assert_eq!(outlook.probability, 1.0);

        let outlook = demand_outlook(&record(0.0, 0.0), 1);
        assert_eq!(outlook.uplift_pct, None);
        assert_eq!(outlook.probability, 0.0);
    }
}
