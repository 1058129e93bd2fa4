//! Application initialization and lifecycle management
//!
//! Provides the initialization sequence, inference provider selection and
//! fatal error handling for the Binsight CLI.

use anyhow::{anyhow, Context, Result};
use binsight_adapters::{GeminiAdapter, RelayAdapter};
use binsight_core::{
    get_default_config_path, init_logger, load_config_from_path, ApiKeyManager, ClassifierConfig,
    ClassifierMode, Config, InferencePort, LogLevel, LoggerConfig, LoggerGuard, SecretApiKey,
};
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Application context holding initialized components
pub struct AppContext {
    pub config: Arc<Config>,
    /// File the configuration was loaded from
    pub config_path: PathBuf,
    /// Keeps the non-blocking log writer alive
    #[allow(dead_code)]
    logger_guard: Option<LoggerGuard>,
}

impl AppContext {
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Application initialization options
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Whether to initialize the logger
    pub init_logger: bool,
    /// Mirror log output to stdout
    pub log_to_stdout: bool,
    /// Log level override; the configured level is used otherwise
    pub log_level: Option<LogLevel>,
    /// Configuration file override
    pub config_path: Option<PathBuf>,
}

impl InitOptions {
    /// Options for a normal command run
    pub fn command(verbose: bool, config_path: Option<PathBuf>) -> Self {
        Self {
            init_logger: true,
            log_to_stdout: verbose,
            log_level: verbose.then_some(LogLevel::Debug),
            config_path,
        }
    }
}

/// Initializes the Binsight application
///
/// 1. Load configuration (default `~/.binsight/config.toml`)
/// 2. Initialize logging (if requested)
/// 3. Set up panic hook for fatal error handling
pub fn initialize(options: InitOptions) -> Result<AppContext> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(get_default_config_path);
    let config = load_config_from_path(&config_path).context("Failed to load configuration")?;
    let config = Arc::new(config);

    let logger_guard = if options.init_logger {
        let level = options.log_level.unwrap_or_else(|| config.log_level());
        let logger_config = LoggerConfig::new(config.logging.log_dir.clone())
            .with_level(level)
            .with_stdout(options.log_to_stdout);

        Some(init_logger(logger_config).context("Failed to initialize logger")?)
    } else {
        None
    };

    setup_panic_hook(Arc::clone(&config));

    info!(
        config = %config_path.display(),
        mode = %config.classifier.mode,
        "Binsight started"
    );

    Ok(AppContext {
        config,
        config_path,
        logger_guard,
    })
}

/// Builds the inference provider selected by `[classifier] mode`
///
/// # Errors
/// In direct mode, fails with setup guidance when no API key is configured
pub fn build_inference_port(config: &ClassifierConfig) -> Result<Arc<dyn InferencePort>> {
    build_inference_port_with_key(config, ApiKeyManager::load_api_key().ok())
}

/// Same as [`build_inference_port`] with the key supplied by the caller
pub fn build_inference_port_with_key(
    config: &ClassifierConfig,
    api_key: Option<SecretApiKey>,
) -> Result<Arc<dyn InferencePort>> {
    let timeout = Duration::from_secs(config.timeout_seconds);

    match config.mode {
        ClassifierMode::Direct => {
            let api_key =
                api_key.ok_or_else(|| anyhow!(ApiKeyManager::missing_key_guidance()))?;
            let adapter = GeminiAdapter::new(api_key, config.model.clone(), timeout)
                .context("Failed to create Gemini client")?;
            Ok(Arc::new(adapter))
        }
        ClassifierMode::Relay => {
            let adapter = RelayAdapter::new(config.relay_url.clone(), timeout)
                .context("Failed to create relay client")?;
            Ok(Arc::new(adapter))
        }
    }
}

/// Sets up a panic hook that logs the panic and points at the log file
fn setup_panic_hook(config: Arc<Config>) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        error!("FATAL ERROR at {}: {}", location, message);

        eprintln!();
        eprintln!("Binsight encountered a fatal error and must exit.");
        eprintln!("Location: {}", location);
        eprintln!("Error: {}", message);
        eprintln!();
        eprintln!(
            "Please check the log files in: {}",
            config.logging.log_dir.display()
        );
        eprintln!();

        default_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_options_command() {
        let options = InitOptions::command(false, None);
        assert!(options.init_logger);
        assert!(!options.log_to_stdout);
        assert!(options.log_level.is_none());

        let verbose = InitOptions::command(true, Some(PathBuf::from("/tmp/c.toml")));
        assert!(verbose.log_to_stdout);
        assert_eq!(verbose.log_level, Some(LogLevel::Debug));
        assert_eq!(verbose.config_path, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_direct_mode_without_key_gives_guidance() {
        let config = ClassifierConfig::default();
        let err = build_inference_port_with_key(&config, None).err().unwrap();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_direct_mode_with_key() {
        let config = ClassifierConfig::default();
        let key = SecretApiKey::new("test-key".to_string());
        let port = build_inference_port_with_key(&config, key).unwrap();
        assert_eq!(port.name(), "gemini");
    }

    #[test]
    fn test_relay_mode_needs_no_key() {
        let config = ClassifierConfig {
            mode: ClassifierMode::Relay,
            ..ClassifierConfig::default()
        };
        let port = build_inference_port_with_key(&config, None).unwrap();
        assert_eq!(port.name(), "relay");
    }
}
