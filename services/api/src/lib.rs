mod cli;
mod console;
mod infra;
mod routes;
mod server;

use saber_predictor::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
