use crate::error::AppError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locate `<crate>/config`, whether the process runs from the workspace root
/// or from inside the crate directory.
pub fn configuration_directory(base_path: &Path, crate_dir: &str) -> PathBuf {
    if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    }
}

/// Load `base.yaml` from the crate's config directory, then apply `APP_`
/// environment overrides (`APP_SERVER__PORT=9000`).
pub fn load_layered<T: DeserializeOwned>(crate_dir: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let directory = configuration_directory(&base_path, crate_dir);

    let settings = Config::builder()
        .add_source(File::from(directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
