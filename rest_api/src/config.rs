// rest_api/src/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REST_API_CONFIG_PATH: &str = "config/rest_api_config.yaml";
pub const DEFAULT_REST_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_REST_API_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "fixtures/readmission_model.json";

/// Configuration for the scoring API server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        RestApiConfig {
            host: DEFAULT_REST_API_HOST.to_string(),
            port: DEFAULT_REST_API_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl RestApiConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Command-line and environment values win over the file.
    pub fn with_overrides(mut self, args: &CliArgs) -> Self {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(model_path) = &args.model_path {
            self.model_path = model_path.clone();
        }
        self
    }
}

// Mirrors the `rest_api:` key in the YAML file.
#[derive(Debug, Deserialize)]
struct RestApiConfigWrapper {
    rest_api: RestApiConfig,
}

/// Command-line arguments for the `readmission-api` binary.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "readmission-api")]
#[command(about = "Scores hospital encounters for 30-day readmission risk")]
#[command(version)]
pub struct CliArgs {
    /// YAML config file (defaults to config/rest_api_config.yaml when present)
    #[arg(short, long, env = "READMISSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "READMISSION_HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "READMISSION_PORT")]
    pub port: Option<u16>,

    /// Path to the model artifact
    #[arg(short, long, env = "READMISSION_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Load and validate the model artifact, then exit without serving
    #[arg(long)]
    pub check_model: bool,
}

pub fn parse_rest_api_config(content: &str) -> Result<RestApiConfig> {
    let wrapper: RestApiConfigWrapper =
        serde_yaml2::from_str(content).map_err(|e| anyhow!("Failed to parse REST API config YAML: {}", e))?;
    Ok(wrapper.rest_api)
}

/// Loads the REST API configuration.
///
/// An explicitly requested file must exist. When no file is given the default location is
/// tried and, if absent, built-in defaults are used.
pub fn load_rest_api_config(config_file_path: Option<&Path>) -> Result<RestApiConfig> {
    load_rest_api_config_or_default(config_file_path, Path::new(DEFAULT_REST_API_CONFIG_PATH))
}

fn load_rest_api_config_or_default(config_file_path: Option<&Path>, default_path: &Path) -> Result<RestApiConfig> {
    let path_to_use = match config_file_path {
        Some(path) => path.to_path_buf(),
        None => {
            if !default_path.exists() {
                warn!(
                    "Config file not found at {}. Using default REST API config.",
                    default_path.display()
                );
                return Ok(RestApiConfig::default());
            }
            default_path.to_path_buf()
        }
    };

    info!("Loading REST API config from {}", path_to_use.display());
    let content = fs::read_to_string(&path_to_use)
        .with_context(|| format!("Failed to read REST API config file: {}", path_to_use.display()))?;
    debug!("REST API config content: {}", content);
    parse_rest_api_config(&content).with_context(|| format!("Invalid config file {}", path_to_use.display()))
}

/// File (or defaults) first, then command-line/environment overrides.
pub fn resolve_config(args: &CliArgs) -> Result<RestApiConfig> {
    let config = load_rest_api_config(args.config.as_deref())?.with_overrides(args);
    info!("Resolved REST API config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn should_parse_wrapped_yaml() {
        let config = parse_rest_api_config(
            "rest_api:\n  host: \"0.0.0.0\"\n  port: 9090\n  model_path: \"/srv/models/gb.json\"\n",
        )
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.model_path, PathBuf::from("/srv/models/gb.json"));
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn should_fill_missing_keys_with_defaults() {
        let config = parse_rest_api_config("rest_api:\n  port: 8123\n").unwrap();
        assert_eq!(config.port, 8123);
        assert_eq!(config.host, DEFAULT_REST_API_HOST);
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn should_fail_on_explicit_missing_file() {
        let missing = Path::new("/nonexistent/rest_api_config.yaml");
        assert!(load_rest_api_config(Some(missing)).is_err());
    }

    #[test]
    fn should_fall_back_to_defaults_when_default_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("rest_api_config.yaml");
        let config = load_rest_api_config_or_default(None, &absent).unwrap();
        assert_eq!(config, RestApiConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn should_read_default_file_when_present() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rest_api:\n  port: 8042").unwrap();
        let config = load_rest_api_config_or_default(None, file.path()).unwrap();
        assert_eq!(config.port, 8042);
        assert_eq!(config.host, DEFAULT_REST_API_HOST);
    }

    #[test]
    fn should_load_file_and_apply_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rest_api:\n  host: \"10.0.0.5\"\n  port: 8001").unwrap();

        let args = CliArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(9001),
            model_path: Some(PathBuf::from("models/gb.json")),
            ..CliArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 9001);
        assert_eq!(config.model_path, PathBuf::from("models/gb.json"));
    }

    #[test]
    fn should_parse_cli_flags() {
        let args = CliArgs::try_parse_from([
            "readmission-api",
            "--port",
            "8080",
            "--model-path",
            "/tmp/model.json",
            "--check-model",
        ])
        .unwrap();
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.model_path, Some(PathBuf::from("/tmp/model.json")));
        assert!(args.check_model);
    }
}
