//! Answer generation and batch judging

pub mod executor;
pub mod rate_limiter;

pub use executor::{expand_records, Executor, ExecutorConfig, GenerationSettings};
pub use rate_limiter::RateLimiter;

/// Error type for run setup
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("No temperatures parsed from '{0}'")]
    NoTemperatures(String),

    #[error("Invalid temperature '{value}': {reason}")]
    InvalidTemperature { value: String, reason: String },
}

/// Parse a comma-separated temperature list such as `"0,0.7"`
pub fn parse_temperatures(s: &str) -> Result<Vec<f32>, RunError> {
    let temps = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f32>().map_err(|e| RunError::InvalidTemperature {
                value: part.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if temps.is_empty() {
        return Err(RunError::NoTemperatures(s.to_string()));
    }
    Ok(temps)
}

/// Run id from the current UTC time, e.g. `20250101_120000`
pub fn new_run_id() -> String {
    chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string()
}
