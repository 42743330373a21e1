use std::{io, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use engine::{
    Currency, MoneyCents, ParticipantId, ParticipantShare, Shares, SplitMethod, compute_allocation,
};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, Result},
    output::{self, OutputFormat},
    settings::Settings,
    trip_file::TripFile,
};

#[derive(Parser, Debug)]
#[command(name = "tripsplit")]
#[command(about = "Split trip expenses between participants")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the configured output format.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a single amount and print what everybody owes.
    Split(SplitArgs),
    /// Work with a JSON trip file.
    Trip(TripArgs),
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Expense total, e.g. `100.00`.
    #[arg(long, allow_negative_numbers = true)]
    total: MoneyCents,
    /// equal, percentage, shares or custom.
    #[arg(long, default_value = "equal")]
    method: SplitMethod,
    /// Participant id, in the order remainders are handed out.
    #[arg(long = "participant", short = 'p', required = true)]
    participants: Vec<String>,
    /// Per-participant value as `id=value`: a percentage, a weight or an amount.
    #[arg(long = "share", short = 's')]
    shares: Vec<String>,
    /// Currency used to print amounts (defaults to the configured one).
    #[arg(long)]
    currency: Option<Currency>,
}

#[derive(Args, Debug)]
pub struct TripArgs {
    #[command(subcommand)]
    command: TripCommand,
}

#[derive(Subcommand, Debug)]
enum TripCommand {
    /// Totals, per-person share, balances and settlements.
    Summary { file: PathBuf },
    /// One CSV row per allocation line.
    Export { file: PathBuf },
}

pub fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let format = cli.output.unwrap_or(settings.output);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Split(args) => {
            let participants: Vec<ParticipantId> =
                args.participants.into_iter().map(ParticipantId::from).collect();
            let shares = parse_shares(args.method, &args.shares)?;
            let allocation = compute_allocation(args.total, args.method, &participants, &shares)
                .inspect_err(|err| tracing::warn!("split rejected: {err}"))?;
            let currency = args.currency.unwrap_or(settings.currency);
            output::allocation(&mut stdout, format, currency, &allocation)
        }
        Command::Trip(TripArgs { command }) => match command {
            TripCommand::Summary { file } => {
                let trip = TripFile::load(&file)?.into_trip(settings.currency)?;
                output::summary(&mut stdout, format, &trip)
            }
            TripCommand::Export { file } => {
                let trip = TripFile::load(&file)?.into_trip(settings.currency)?;
                output::export(&mut stdout, &trip)
            }
        },
    }
}

/// Parses `id=value` pairs into the field `method` reads.
fn parse_shares(
    method: SplitMethod,
    raw: &[String],
) -> Result<Shares> {
    if method == SplitMethod::Equal && !raw.is_empty() {
        tracing::warn!("--share values are ignored by the equal split");
        return Ok(Shares::new());
    }

    let mut shares = Shares::with_capacity(raw.len());
    for entry in raw {
        let (id, value) = entry
            .split_once('=')
            .ok_or_else(|| AppError::Argument(format!("expected id=value, got '{entry}'")))?;
        let id = ParticipantId::from(id);
        let share = match method {
            SplitMethod::Percentage => {
                ParticipantShare::percent(parse_decimal(value.trim().trim_end_matches('%'))?)
            }
            SplitMethod::Shares => ParticipantShare::weight(parse_decimal(value)?),
            SplitMethod::Custom => ParticipantShare::custom(value.parse()?),
            SplitMethod::Equal => ParticipantShare::default(),
        };
        if shares.insert(id.clone(), share).is_some() {
            return Err(AppError::Argument(format!("'{id}' has more than one --share")));
        }
    }
    Ok(shares)
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    let normalized = value.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|err| AppError::Argument(format!("invalid number '{}': {err}", value.trim())))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_split_arguments() {
        let cli = Cli::try_parse_from([
            "tripsplit", "split", "--total", "90", "--method", "shares", "-p", "a", "-p", "b",
            "-s", "a=1", "-s", "b=2",
        ])
        .unwrap();
        let Command::Split(args) = cli.command else {
            panic!("expected split");
        };
        assert_eq!(args.total, MoneyCents::new(9000));
        assert_eq!(args.method, SplitMethod::Shares);
        assert_eq!(args.participants, raw(&["a", "b"]));
    }

    #[test]
    fn rejects_an_unparseable_total() {
        assert!(
            Cli::try_parse_from(["tripsplit", "split", "--total", "1.234", "-p", "a"]).is_err()
        );
    }

    #[test]
    fn negative_total_reaches_the_calculator() {
        let cli = Cli::try_parse_from(["tripsplit", "split", "--total", "-5", "-p", "a"]).unwrap();
        let Command::Split(args) = cli.command else {
            panic!("expected split");
        };
        assert_eq!(args.total, MoneyCents::new(-500));

        let participants = vec![ParticipantId::from("a")];
        assert!(matches!(
            compute_allocation(args.total, args.method, &participants, &Shares::new()),
            Err(engine::EngineError::InvalidTotal(_))
        ));
    }

    #[test]
    fn parses_values_per_method() {
        let shares = parse_shares(SplitMethod::Percentage, &raw(&["a=50%", "b = 49,5"])).unwrap();
        assert_eq!(shares[&ParticipantId::from("a")], ParticipantShare::percent(Decimal::from(50)));
        assert_eq!(shares[&ParticipantId::from("b")], ParticipantShare::percent(Decimal::new(495, 1)));

        let shares = parse_shares(SplitMethod::Custom, &raw(&["a=12.50"])).unwrap();
        assert_eq!(
            shares[&ParticipantId::from("a")],
            ParticipantShare::custom(MoneyCents::new(1250))
        );

        assert!(parse_shares(SplitMethod::Equal, &raw(&["a=1"])).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_shares() {
        assert!(matches!(
            parse_shares(SplitMethod::Shares, &raw(&["a"])),
            Err(AppError::Argument(_))
        ));
        assert!(matches!(
            parse_shares(SplitMethod::Shares, &raw(&["a=lots"])),
            Err(AppError::Argument(_))
        ));
        assert!(matches!(
            parse_shares(SplitMethod::Shares, &raw(&["a=1", "a=2"])),
            Err(AppError::Argument(_))
        ));
        assert!(matches!(
            parse_shares(SplitMethod::Custom, &raw(&["a=1.001"])),
            Err(AppError::Engine(_))
        ));
    }
}
