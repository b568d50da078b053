use crate::analyze::{run_analyze, run_screen, AnalyzeArgs, ScreenArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rental_underwriting::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rental Underwriting",
    about = "Underwrite rental properties and screen them against buying boxes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute investment metrics for one property and screen it
    Analyze(AnalyzeArgs),
    /// Screen every property in a CSV export against a set of buying boxes
    Screen(ScreenArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
        Command::Screen(args) => run_screen(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["rental-underwriting-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn screen_requires_properties_and_criteria() {
        let parsed = Cli::try_parse_from([
            "rental-underwriting-api",
            "screen",
            "--properties",
            "listings.csv",
            "--criteria",
            "boxes.json",
            "--min-match-score",
            "75",
        ])
        .expect("parses");

        match parsed.command {
            Some(Command::Screen(args)) => {
                assert_eq!(args.properties.to_str(), Some("listings.csv"));
                assert_eq!(args.min_match_score, Some(75.0));
            }
            other => panic!("expected screen command, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["rental-underwriting-api", "screen"]).is_err());
    }

    #[test]
    fn min_match_score_must_sit_on_the_percent_scale() {
        for score in ["140", "NaN", "-1"] {
            let parsed = Cli::try_parse_from([
                "rental-underwriting-api",
                "analyze",
                "--property",
                "duplex.json",
                "--min-match-score",
                score,
            ]);
            assert!(parsed.is_err(), "{score} should be rejected");
        }

        let parsed = Cli::try_parse_from([
            "rental-underwriting-api",
            "analyze",
            "--property",
            "duplex.json",
            "--min-match-score",
            "100",
        ])
        .expect("parses");
        match parsed.command {
            Some(Command::Analyze(args)) => assert_eq!(args.min_match_score, Some(100.0)),
            other => panic!("expected analyze command, got {other:?}"),
        }
    }
}
