use chrono::Datelike;

/// Month names as displayed by the dashboard, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// Returns the display name of a month number (1-12).
///
/// # Arguments
/// * `month` - Month number, January = 1.
///
/// # Returns
/// * `Option<&'static str>` - The month name, or `None` when out of range.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}

/// Parses a month given either as a number (`3`) or a name (`março`, `Marco`).
///
/// Used as a clap value parser, hence the `String` error.
///
/// # Arguments
/// * `s` - User-supplied month.
///
/// # Returns
/// * `Result<u32, String>` - Month number in `1..=12`.
pub fn parse_month(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return if (1..=12).contains(&n) {
            Ok(n)
        } else {
            Err(format!("month must be between 1 and 12, got {}", n))
        };
    }

    let wanted = fold_name(s);
    MONTH_NAMES
        .iter()
        .position(|name| fold_name(name) == wanted)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| format!("unknown month: {}", s))
}

fn fold_name(s: &str) -> String {
    s.to_lowercase().replace('ç', "c")
}

/// Current month in local time, the default month of a calculation.
pub fn current_month() -> u32 {
    chrono::Local::now().month()
}

/// Formats an amount of money with thousands separators: `R$ 10,000.00`.
///
/// # Arguments
/// * `value` - Amount in reais.
///
/// # Returns
/// * `String` - Formatted amount, sign after the currency symbol (`R$ -12.50`).
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = !formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("R$ {}{}.{}", sign, grouped, frac_part)
}

/// Formats a timestamp as `dd/mm/YYYY HH:MM` for history listings.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Local>) -> String {
    ts.format("%d/%m/%Y %H:%M").to_string()
}

/// Creates the parent directory of `path` if it does not exist yet.
///
/// # Arguments
/// * `path` - File path about to be written.
///
/// # Returns
/// * `std::io::Result<()>`
pub fn ensure_parent_dir_exist<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_round_trip_through_parser() {
        assert_eq!(month_name(1), Some("Janeiro"));
        assert_eq!(month_name(12), Some("Dezembro"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);

        assert_eq!(parse_month("3"), Ok(3));
        assert_eq!(parse_month("março"), Ok(3));
        assert_eq!(parse_month("MARCO"), Ok(3));
        assert_eq!(parse_month(" dezembro "), Ok(12));
    }

    #[test]
    fn parse_month_rejects_out_of_range_and_unknown_names() {
        assert!(parse_month("0").is_err());
        assert!(parse_month("13").is_err());
        assert!(parse_month("Smarch").is_err());
    }

    #[test]
    fn money_is_grouped_by_thousands() {
        assert_eq!(format_money(0.0), "R$ 0.00");
        assert_eq!(format_money(80.0), "R$ 80.00");
        assert_eq!(format_money(4800.0), "R$ 4,800.00");
        assert_eq!(format_money(1234567.891), "R$ 1,234,567.89");
        assert_eq!(format_money(-12.5), "R$ -12.50");
        assert_eq!(format_money(-0.001), "R$ 0.00");
    }

    #[test]
    fn parent_dir_is_created_on_demand() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let target = dir.path().join("nested").join("history.json");
        ensure_parent_dir_exist(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());

        // bare file names have an empty parent
        ensure_parent_dir_exist("history.json").unwrap();
    }
}
