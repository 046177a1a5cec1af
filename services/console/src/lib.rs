mod cli;
mod demo;
mod render;
mod watch;

use halalguard::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
