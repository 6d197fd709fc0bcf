use crate::console::{run_interpret, run_models, run_predict, InterpretArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use saber_predictor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Saber 11 Predictor",
    about = "Predict Saber 11 performance levels from student context, or serve the predictor over HTTP",
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
    /// Predict the performance level for one area from answered form fields
    Predict(PredictArgs),
    /// Show the interpretation text for an area and level
    Interpret(InterpretArgs),
    /// List the inference model behind each knowledge area
    Models,
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
        Command::Predict(args) => run_predict(args),
        Command::Interpret(args) => run_interpret(args),
        Command::Models => run_models(),
    }
}
