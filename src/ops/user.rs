//! The `user` command: show or change the default user.

use crate::config::{validate_user_name, Config, Settings};
use crate::errors::AppResult;
use crate::store;
use tracing::info;

/// The user this invocation acts on.
///
/// # Errors
///
/// Returns `AppError::Config` when no user is set anywhere.
pub fn show_user(config: &Config) -> AppResult<&str> {
    config.require_user()
}

/// Persists `name` as the default user in the settings file.
///
/// # Errors
///
/// Returns `AppError::Config` for an invalid name and `AppError::Io` if the
/// settings file cannot be written.
pub fn set_default_user(config: &Config, name: &str) -> AppResult<()> {
    validate_user_name(name)?;
    store::ensure_dir(&config.work_dir)?;

    let path = config.settings_path();
    let mut settings = Settings::load(&path)?;
    settings.user = Some(name.to_string());
    settings.save(&path)?;

    info!(user = name, "Default user changed");
    Ok(())
}
