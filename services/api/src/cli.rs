use crate::commands::{
    run_evaluate, run_match, run_validate, EvaluateArgs, MatchArgs, ValidateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use course_eligibility::config::AppConfig;
use course_eligibility::error::AppError;
use course_eligibility::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Course Eligibility",
    about = "Check admission eligibility for university courses from the command line or over HTTP",
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
    /// Evaluate one candidate against one course requirement tree
    Evaluate(EvaluateArgs),
    /// Check a course requirement tree for structural defects
    Validate(ValidateArgs),
    /// Match one candidate against a catalog of courses
    Match(MatchArgs),
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

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Evaluate(args) => run_evaluate(&config, args),
        Command::Validate(args) => run_validate(args),
        Command::Match(args) => run_match(&config, args),
    }
}
