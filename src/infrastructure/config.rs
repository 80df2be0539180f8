use crate::application::retention::DEFAULT_RETENTION_LIMIT;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "config/server";
const ENV_PREFIX: &str = "EQUIPMENT";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub retention: RetentionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Filesystem,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetentionSettings {
    pub limit: usize,
}

/// Load server settings: built-in defaults, then the optional config file
/// (`config/server.*` unless a path is given), then `EQUIPMENT_*` variables
/// such as `EQUIPMENT_SERVER__BIND`.
pub fn load_app_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let file = match path {
        Some(path) => config::File::with_name(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8000")?
        .set_default("server.max_upload_bytes", 10_i64 * 1024 * 1024)?
        .set_default("storage.backend", "filesystem")?
        .set_default("storage.data_dir", "data")?
        .set_default("retention.limit", DEFAULT_RETENTION_LIMIT as i64)?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    if app_config.retention.limit == 0 {
        anyhow::bail!("retention.limit must be at least 1");
    }
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_overrides_from_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"127.0.0.1:9000\"\n\n[storage]\nbackend = \"memory\"\n\n[retention]\nlimit = 3"
        )
        .unwrap();

        let config = load_app_config(file.path().to_str()).unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.retention.limit, 3);
    }

    #[test]
    fn test_zero_retention_limit_is_rejected() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[retention]\nlimit = 0").unwrap();

        assert!(load_app_config(file.path().to_str()).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(load_app_config(Some("/nonexistent/equipment-insights")).is_err());
    }
}
