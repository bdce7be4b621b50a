//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.chat.model.trim().is_empty() {
        errors.push("chat.model must not be empty".to_string());
    }
    if config.chat.max_tokens == 0 {
        errors.push("chat.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&config.chat.temperature) {
        errors.push("chat.temperature must be in [0.0, 2.0]".to_string());
    }
    if config.chat.sessions_dir.trim().is_empty() {
        errors.push("chat.sessions_dir must not be empty".to_string());
    }

    if let Some(base) = &config.provider.api_base {
        if base.trim().is_empty() {
            errors.push("provider.api_base must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
