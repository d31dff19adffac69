use anyhow::Context;

use crate::cli::{CalculateArgs, Command, HistoryCommand};
use crate::history::HistoryFilter;
use crate::pricing::PricingInputs;
use crate::report;
use crate::session::Session;
use crate::utils;

/// Runs one command against the session and prints its report to stdout.
///
/// # Arguments
/// * `command` - Parsed subcommand.
/// * `session` - Loaded dataset and history log.
///
/// # Returns
/// * `anyhow::Result<()>` - Domain errors are passed through for display.
pub fn run(command: Command, session: &mut Session) -> anyhow::Result<()> {
    match command {
        Command::Services => {
            if session.seasonal.is_empty() {
                println!("⚠️ The seasonal dataset is empty");
            }
            for service in session.seasonal.services() {
                println!("{}", service);
            }
        }
        Command::Seasonal { service } => seasonal(session, service.as_deref())?,
        Command::Calculate(args) => calculate(session, args)?,
        Command::History(cmd) => history(session, cmd)?,
    }
    Ok(())
}

fn seasonal(session: &Session, query: Option<&str>) -> anyhow::Result<()> {
    let services = match query {
        Some(q) => vec![session.seasonal.resolve_service(q)?],
        None => session.seasonal.services(),
    };

    let pages: Vec<String> = services
        .into_iter()
        .filter_map(|service| {
            let summary = session.seasonal.summary(service)?;
            Some(report::render_seasonal(&session.seasonal.series(service), &summary))
        })
        .collect();
    println!("{}", pages.join("\n\n"));
    Ok(())
}

fn calculate(session: &mut Session, args: CalculateArgs) -> anyhow::Result<()> {
    let service = session.seasonal.resolve_service(&args.service)?.to_string();
    let inputs = PricingInputs {
        service,
        month: args.month.unwrap_or_else(utils::current_month),
        original_price: args.original_price,
        service_cost: args.service_cost,
        commission_pct: args.commission_pct,
        desired_profit_increase_pct: args.profit_increase_pct,
        promotional_price: args.promotional_price,
    };

    let quote = session.quote(inputs)?;
    println!("{}", report::render_quote(&quote));

    if args.save {
        let entry = session
            .save_quote(&quote, chrono::Local::now())
            .context("failed to save calculation")?;
        println!("\n✅ Calculation saved to history as #{}", entry.id);
    }
    Ok(())
}

fn history(session: &mut Session, command: HistoryCommand) -> anyhow::Result<()> {
    match command {
        HistoryCommand::List { favorites } => {
            let filter = if favorites { HistoryFilter::FavoritesOnly } else { HistoryFilter::All };
            let entries = session.history.list(filter);
            if entries.is_empty() {
                println!(
                    "📭 {}",
                    if favorites && !session.history.is_empty() {
                        "No favorite calculations."
                    } else {
                        "No saved calculations yet. Use `calculate --save` to add one."
                    }
                );
            }
            let blocks: Vec<String> = entries.into_iter().map(report::render_history_entry).collect();
            if !blocks.is_empty() {
                println!("{}", blocks.join("\n\n"));
            }
        }
        HistoryCommand::Favorite(id) => {
            let favorite = session.history.toggle_favorite(id)?;
            println!(
                "{} #{} {}",
                if favorite { "⭐" } else { "✅" },
                id,
                if favorite { "added to favorites" } else { "removed from favorites" }
            );
            if let Some(entry) = session.history.get(id) {
                println!("{}", report::history_header(entry));
            }
        }
        HistoryCommand::Delete(id) => {
            let removed = session.history.delete(id)?;
            println!("🗑️ Deleted {}", report::history_header(&removed));
        }
        HistoryCommand::Clear => {
            let count = session.history.len();
            session.history.clear()?;
            println!("🗑️ Cleared {} calculation(s) from {}", count, session.history.path().display());
        }
        HistoryCommand::Export(output) => {
            utils::ensure_parent_dir_exist(&output)?;
            let file = std::fs::File::create(&output)
                .with_context(|| format!("failed to create {}", output.display()))?;
            let rows = session.history.export_csv(file)?;
            println!("✅ Exported {} calculation(s) to {}", rows, output.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::history::HistoryLog;
    use crate::seasonal::SeasonalData;

    const SAMPLE_CSV: &str = "\
Servico,Mes,Media,Desvio_padrao
Massagem Relaxante (50 min),1,100,12
Drenagem Linfática corporal (50 min),1,60,8
";

    fn session(dir: &tempfile::TempDir) -> Session {
        let seasonal = SeasonalData::load(SAMPLE_CSV.as_bytes()).unwrap();
        let history = HistoryLog::open(dir.path().join("history.json")).unwrap();
        Session::new(seasonal, history)
    }

    fn calc(service: &str, month: u32, save: bool) -> Command {
        Command::Calculate(CalculateArgs {
            service: service.into(),
            month: Some(month),
            original_price: 100.0,
            service_cost: 20.0,
            commission_pct: 40.0,
            profit_increase_pct: 20.0,
            promotional_price: 80.0,
            save,
        })
    }

    #[test]
    fn calculate_with_save_then_manage_history() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut session = session(&dir);

        run(calc("massagem", 1, true), &mut session).unwrap();
        run(calc("drenagem", 1, true), &mut session).unwrap();
        run(calc("drenagem", 1, false), &mut session).unwrap();
        assert_eq!(session.history.len(), 2);

        run(Command::History(HistoryCommand::Favorite(0)), &mut session).unwrap();
        assert!(session.history.get(0).unwrap().favorite);

        run(Command::History(HistoryCommand::Delete(1)), &mut session).unwrap();
        assert_eq!(session.history.len(), 1);

        let out = dir.path().join("export").join("history.csv");
        run(Command::History(HistoryCommand::Export(out.clone())), &mut session).unwrap();
        let exported = std::fs::read_to_string(&out).unwrap();
        assert_eq!(exported.lines().count(), 2);

        run(Command::History(HistoryCommand::Clear), &mut session).unwrap();
        assert!(session.history.is_empty());
    }

    #[test]
    fn calculate_for_missing_month_is_data_not_found() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut session = session(&dir);

        let err = run(calc("massagem", 8, true), &mut session).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::DataNotFound { month: 8, .. })
        ));
        assert!(session.history.is_empty());
    }

    #[test]
    fn unknown_history_id_is_reported() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut session = session(&dir);

        let err = run(Command::History(HistoryCommand::Delete(3)), &mut session).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::NotFound(3))
        ));
    }
}
