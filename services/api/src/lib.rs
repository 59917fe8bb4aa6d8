mod cli;
mod demo;
mod import;
mod infra;
mod routes;
mod server;

use bto_housing::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
