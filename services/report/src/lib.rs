mod cli;
mod commands;

use marketplace_hourly::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
