//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.storage.dir.trim().is_empty() {
        errors.push("storage.dir must not be empty".to_string());
    }
    if config.storage.snapshot_file.trim().is_empty() {
        errors.push("storage.snapshot_file must not be empty".to_string());
    }
    if config
        .storage
        .snapshot_file
        .contains(['/', '\\'])
    {
        errors.push("storage.snapshot_file must be a bare file name".to_string());
    }

    if config.logging.level.trim().is_empty() {
        errors.push("logging.level must not be empty".to_string());
    }
    if !matches!(config.logging.format.as_str(), "text" | "json") {
        errors.push("logging.format must be \"text\" or \"json\"".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
