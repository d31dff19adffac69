//! Plain-text rendering of the dashboard pages.

use crate::history::HistoryEntry;
use crate::seasonal::{SeasonalRecord, SeasonalSummary};
use crate::session::Quote;
use crate::utils::{self, format_money};

fn month_label(month: u32) -> String {
    utils::month_name(month)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", month))
}

/// Month table of one service followed by its yearly summary.
pub fn render_seasonal(series: &[&SeasonalRecord], summary: &SeasonalSummary) -> String {
    let mut lines = vec![
        format!("📊 {}", summary.service),
        format!("  {:<12} {:>14} {:>14}", "Month", "Mean demand", "Std dev"),
    ];
    for record in series {
        lines.push(format!(
            "  {:<12} {:>14.2} {:>14.2}",
            month_label(record.month),
            record.mean_demand,
            record.std_dev
        ));
    }
    lines.push(format!(
        "  {} months | annual mean {:.2} (±{:.2} across months) | avg std dev {:.2}",
        summary.months, summary.annual_mean, summary.mean_spread, summary.avg_std_dev
    ));
    lines.push(format!(
        "  peak {} ({:.2}) | low {} ({:.2})",
        month_label(summary.peak_month),
        summary.peak_demand,
        month_label(summary.low_month),
        summary.low_demand
    ));
    lines.join("\n")
}

/// Full calculator report: regular scenario, target and promotional scenario.
pub fn render_quote(quote: &Quote) -> String {
    let (inputs, result, outlook) = (&quote.inputs, &quote.result, &quote.outlook);

    let mut lines = vec![
        format!("💆 {} - {}", inputs.service, month_label(inputs.month)),
        format!(
            "  Expected demand: {:.0} services (±{:.2})",
            quote.record.mean_demand, quote.record.std_dev
        ),
        String::new(),
        "📈 Without promotion".to_string(),
        format!("  Revenue:      {}", format_money(result.revenue_without_promo)),
        format!("  Commission:   {}", format_money(result.commission_without_promo)),
        format!("  Service cost: {}", format_money(result.cost_without_promo)),
        format!("  Spa profit:   {}", format_money(result.profit_without_promo)),
        String::new(),
        "🎯 Profit target".to_string(),
        format!(
            "  Required profit: {} (+{:.1}%)",
            format_money(result.required_profit_target),
            inputs.desired_profit_increase_pct
        ),
        format!(
            "  You need to sell {} services at {}",
            result.required_quantity,
            format_money(inputs.promotional_price)
        ),
        String::new(),
        "💰 With promotion".to_string(),
        format!("  Revenue:      {}", format_money(result.revenue_with_promo)),
        format!("  Commission:   {}", format_money(result.commission_with_promo)),
        format!("  Service cost: {}", format_money(result.cost_with_promo)),
        format!(
            "  Spa profit:   {} ({})",
            format_money(result.profit_with_promo),
            delta_label(result.profit_delta_pct())
        ),
        String::new(),
        "🔎 Demand outlook".to_string(),
    ];

    match outlook.uplift_pct {
        Some(uplift) => lines.push(format!("  {:+.1}% over the expected demand", uplift)),
        None => lines.push("  no historical demand to compare against".to_string()),
    }
    if let Some(z) = outlook.z_score {
        lines.push(format!("  {:.2} standard deviations from the mean", z));
    }
    lines.push(format!(
        "  Chance of reaching {} services: {:.1}%",
        result.required_quantity,
        outlook.probability * 100.0
    ));

    lines.join("\n")
}

fn delta_label(delta: Option<f64>) -> String {
    match delta {
        Some(pct) => format!("{:+.1}%", pct),
        None => "n/a".to_string(),
    }
}

/// One-line title of a history entry, as used in listings.
pub fn history_header(entry: &HistoryEntry) -> String {
    format!(
        "{}[{}] {} - {} ({})",
        if entry.favorite { "⭐ " } else { "" },
        entry.id,
        utils::format_timestamp(&entry.timestamp),
        entry.inputs.service,
        month_label(entry.inputs.month)
    )
}

/// History entry with its configuration and both scenarios.
pub fn render_history_entry(entry: &HistoryEntry) -> String {
    let (inputs, result) = (&entry.inputs, &entry.result);
    [
        history_header(entry),
        format!(
            "  ⚙️ price {} | cost {} | promo {} | commission {:.1}% | extra profit {:.1}%",
            format_money(inputs.original_price),
            format_money(inputs.service_cost),
            format_money(inputs.promotional_price),
            inputs.commission_pct,
            inputs.desired_profit_increase_pct
        ),
        format!(
            "  📊 without promo: {:.0} services | revenue {} | commission {} | cost {} | profit {}",
            entry.demand,
            format_money(result.revenue_without_promo),
            format_money(result.commission_without_promo),
            format_money(result.cost_without_promo),
            format_money(result.profit_without_promo)
        ),
        format!(
            "  💰 with promo: {} services | revenue {} | commission {} | cost {} | profit {}",
            result.required_quantity,
            format_money(result.revenue_with_promo),
            format_money(result.commission_with_promo),
            format_money(result.cost_with_promo),
            format_money(result.profit_with_promo)
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{self, PricingInputs};
    use chrono::TimeZone;

    fn quote() -> Quote {
        let record = SeasonalRecord {
            service: "Massagem Relaxante (50 min)".into(),
            month: 1,
            mean_demand: 100.0,
            std_dev: 12.0,
        };
        let inputs = PricingInputs {
            service: record.service.clone(),
            month: 1,
            original_price: 100.0,
            service_cost: 20.0,
            commission_pct: 40.0,
            desired_profit_increase_pct: 20.0,
            promotional_price: 80.0,
        };
        let result = pricing::calculate(&record, &inputs).unwrap();
        let outlook = pricing::demand_outlook(&record, result.required_quantity);
        Quote { inputs, record, result, outlook }
    }

    #[test]
    fn quote_report_shows_both_scenarios() {
        let text = render_quote(&quote());
        assert!(text.contains("Massagem Relaxante (50 min) - Janeiro"));
        assert!(text.contains("Spa profit:   R$ 4,000.00"));
        assert!(text.contains("Required profit: R$ 4,800.00 (+20.0%)"));
        assert!(text.contains("You need to sell 172 services at R$ 80.00"));
        assert!(text.contains("Spa profit:   R$ 4,816.00 (+20.4%)"));
        assert!(text.contains("+72.0% over the expected demand"));
    }

    #[test]
    fn delta_without_baseline_profit_is_not_applicable() {
        assert_eq!(delta_label(None), "n/a");
        assert_eq!(delta_label(Some(-3.24)), "-3.2%");
    }

    #[test]
    fn favorite_entries_are_starred() {
        let q = quote();
        let mut entry = HistoryEntry {
            id: 7,
            timestamp: chrono::Local.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
            demand: q.record.mean_demand,
            inputs: q.inputs,
            result: q.result,
            favorite: false,
        };
        assert_eq!(
            history_header(&entry),
            "[7] 02/05/2024 09:30 - Massagem Relaxante (50 min) (Janeiro)"
        );

        entry.favorite = true;
        assert!(history_header(&entry).starts_with("⭐ [7]"));
        assert!(render_history_entry(&entry).contains("with promo: 172 services"));
    }

    #[test]
    fn seasonal_table_lists_every_month() {
        let records = [
            SeasonalRecord { service: "Massagem".into(), month: 1, mean_demand: 100.0, std_dev: 12.5 },
            SeasonalRecord { service: "Massagem".into(), month: 2, mean_demand: 95.5, std_dev: 10.2 },
        ];
        let series: Vec<&SeasonalRecord> = records.iter().collect();
        let summary = SeasonalSummary {
            service: "Massagem".into(),
            months: 2,
            annual_mean: 97.75,
            mean_spread: 3.18,
            peak_month: 1,
            peak_demand: 100.0,
            low_month: 2,
            low_demand: 95.5,
            avg_std_dev: 11.35,
        };
        let text = render_seasonal(&series, &summary);
        assert!(text.contains("Janeiro"));
        assert!(text.contains("Fevereiro"));
        assert!(text.contains("peak Janeiro (100.00) | low Fevereiro (95.50)"));
    }
}
