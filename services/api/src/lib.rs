mod cli;
mod infra;
mod render;
mod routes;
mod server;

use vehicle_inspection::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
