use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tracker URL and API key are set
/// - Poll interval is not 0
/// - Subject, sentinel and job-name token are not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Tracker validation
    if config.tracker.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tracker.url cannot be empty".to_string(),
        ));
    }
    if config.tracker.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tracker.api_key cannot be empty".to_string(),
        ));
    }

    // Poller validation
    if config.poller.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "poller.interval_secs cannot be 0".to_string(),
        ));
    }
    if config.poller.subject.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "poller.subject cannot be empty".to_string(),
        ));
    }

    if config.request.sentinel.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "request.sentinel cannot be empty".to_string(),
        ));
    }

    if config.job.job_name_token.is_empty() {
        return Err(ConfigError::ValidationError(
            "job.job_name_token cannot be empty".to_string(),
        ));
    }

    Ok(())
}
