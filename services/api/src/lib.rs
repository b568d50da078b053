mod analyze;
mod cli;
mod infra;
mod routes;
mod server;

use rental_underwriting::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
