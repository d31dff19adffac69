use crate::utils;

/// What the user asked the dashboard to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Services,
    Seasonal {
        service: Option<String>,
    },
    Calculate(CalculateArgs),
    History(HistoryCommand),
}

/// Form fields of the pricing calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculateArgs {
    pub service: String,
    /// `None` means the current month.
    pub month: Option<u32>,
    pub original_price: f64,
    pub service_cost: f64,
    pub commission_pct: f64,
    pub profit_increase_pct: f64,
    pub promotional_price: f64,
    pub save: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryCommand {
    List { favorites: bool },
    Favorite(u64),
    Delete(u64),
    Clear,
    Export(std::path::PathBuf),
}

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub data: std::path::PathBuf,
    pub history: std::path::PathBuf,
    pub verbose: u8,
    pub command: Command,
}

impl Args {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parses an explicit argument list.
    ///
    /// # Errors
    /// * If required arguments are missing or invalid.
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = build_command().try_get_matches_from(itr)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        let command = match matches.subcommand() {
            Some(("services", _)) => Command::Services,
            Some(("seasonal", sub)) => Command::Seasonal {
                service: sub.get_one::<String>("service").cloned(),
            },
            Some(("calculate", sub)) => Command::Calculate(CalculateArgs {
                service: required(sub, "service"),
                month: sub.get_one::<u32>("month").copied(),
                original_price: required(sub, "original-price"),
                service_cost: required(sub, "service-cost"),
                commission_pct: required(sub, "commission"),
                profit_increase_pct: required(sub, "profit-increase"),
                promotional_price: required(sub, "promo-price"),
                save: sub.get_flag("save"),
            }),
            Some(("history", sub)) => Command::History(match sub.subcommand() {
                Some(("favorite", m)) => HistoryCommand::Favorite(required(m, "id")),
                Some(("delete", m)) => HistoryCommand::Delete(required(m, "id")),
                Some(("clear", _)) => HistoryCommand::Clear,
                Some(("export", m)) => HistoryCommand::Export(required(m, "output")),
                Some(("list", m)) => HistoryCommand::List {
                    favorites: m.get_flag("favorites"),
                },
                _ => HistoryCommand::List { favorites: false },
            }),
            _ => unreachable!("subcommand_required is set"),
        };

        Args {
            data: required(matches, "data"),
            history: required(matches, "history"),
            verbose: matches.get_count("verbose"),
            command,
        }
    }
}

fn required<T: Clone + Send + Sync + 'static>(matches: &clap::ArgMatches, id: &str) -> T {
    matches
        .get_one::<T>(id)
        .cloned()
        .unwrap_or_else(|| panic!("argument '{}' is required or defaulted", id))
}

fn build_command() -> clap::Command {
    let id_arg = || {
        clap::Arg::new("id")
            .help("History entry id (shown in brackets by `history list`)")
            .required(true)
            .value_parser(clap::value_parser!(u64))
    };

    clap::Command::new("spa-dashboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Seasonal demand and promotional pricing dashboard for a spa")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            clap::Arg::new("data")
                .short('d')
                .long("data")
                .help("Seasonal demand CSV (Servico, Mes, Media, Desvio_padrao)")
                .env("SPA_DATA_PATH")
                .default_value("dados_sazonais.csv")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .global(true),
        )
        .arg(
            clap::Arg::new("history")
                .long("history")
                .help("JSON file holding saved calculations")
                .env("SPA_HISTORY_PATH")
                .default_value("historico_precificacao.json")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .global(true),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more (-v info, -vv debug); RUST_LOG overrides")
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand(clap::Command::new("services").about("List the services in the dataset"))
        .subcommand(
            clap::Command::new("seasonal")
                .about("Show monthly mean demand and standard deviation")
                .arg(
                    clap::Arg::new("service")
                        .short('s')
                        .long("service")
                        .help("Only this service (name or unique fragment)")
                        .num_args(1),
                ),
        )
        .subcommand(
            clap::Command::new("calculate")
                .about("Find how many promotional services beat the regular profit")
                .arg(
                    clap::Arg::new("service")
                        .short('s')
                        .long("service")
                        .help("Service name or unique fragment")
                        .required(true)
                        .num_args(1),
                )
                .arg(
                    clap::Arg::new("month")
                        .short('m')
                        .long("month")
                        .help("Month number or name (default: current month)")
                        .value_parser(clap::builder::ValueParser::new(utils::parse_month)),
                )
                .arg(money_arg("original-price", "Regular price (R$)", "100"))
                .arg(money_arg("service-cost", "Spa cost per service (R$)", "20"))
                .arg(
                    clap::Arg::new("commission")
                        .long("commission")
                        .help("Therapist commission (%)")
                        .default_value("40")
                        .value_parser(clap::builder::ValueParser::new(parse_percentage)),
                )
                .arg(money_arg("profit-increase", "Desired extra profit (%)", "20"))
                .arg(money_arg("promo-price", "Promotional price (R$)", "80"))
                .arg(
                    clap::Arg::new("save")
                        .long("save")
                        .help("Store the calculation in the history")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            clap::Command::new("history")
                .about("Browse and edit saved calculations (default: list)")
                .subcommand(
                    clap::Command::new("list").about("List newest first").arg(
                        clap::Arg::new("favorites")
                            .short('f')
                            .long("favorites")
                            .help("Only favorites")
                            .action(clap::ArgAction::SetTrue),
                    ),
                )
                .subcommand(
                    clap::Command::new("favorite")
                        .about("Toggle the favorite mark of an entry")
                        .arg(id_arg()),
                )
                .subcommand(
                    clap::Command::new("delete")
                        .about("Delete one entry")
                        .arg(id_arg()),
                )
                .subcommand(clap::Command::new("clear").about("Delete every entry"))
                .subcommand(
                    clap::Command::new("export")
                        .about("Write the history as CSV")
                        .arg(
                            clap::Arg::new("output")
                                .help("Destination CSV file")
                                .required(true)
                                .value_parser(clap::value_parser!(std::path::PathBuf)),
                        ),
                ),
        )
}

fn money_arg(id: &'static str, help: &'static str, default: &'static str) -> clap::Arg {
    clap::Arg::new(id)
        .long(id)
        .help(help)
        .default_value(default)
        .value_parser(clap::builder::ValueParser::new(parse_non_negative))
}

/// Validates a non-negative, finite amount.
///
/// # Arguments
/// * `s` - String representation of the amount.
///
/// # Returns
/// * `Result<f64, String>` - Validated amount.
fn parse_non_negative(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(v) => Err(format!("Must be a non-negative number, got {}", v)),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

/// Validates a percentage between 0 and 100.
fn parse_percentage(s: &str) -> Result<f64, String> {
    let v = parse_non_negative(s)?;
    if v > 100.0 {
        return Err(format!("Must be at most 100, got {}", v));
    }
    Ok(v)
}
