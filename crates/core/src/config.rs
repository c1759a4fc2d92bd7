use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_TOOLCHAIN_TIMEOUT_SECS: u64 = 600;
const DEFAULT_RAM_MB: u32 = 2048;
const MAX_TOOLCHAIN_TIMEOUT_SECS: u64 = 7200;
const MIN_RAM_MB: u32 = 256;
const MAX_RAM_MB: u32 = 65_536;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Process-wide build server settings, read from `APPBUILD_*` variables.
#[derive(Debug, Clone)]
pub struct BuildServerConfig {
    pub log_level: String,
    pub toolchain_timeout_secs: u64,
    pub default_ram_mb: u32,
    pub storage_dir: PathBuf,
    pub components_path: Option<PathBuf>,
    pub toolchain_command: Option<String>,
}

impl Default for BuildServerConfig {
    fn default() -> Self {
        let log_level = env::var("APPBUILD_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let toolchain_timeout_secs = env::var("APPBUILD_TOOLCHAIN_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TOOLCHAIN_TIMEOUT_SECS);

        let default_ram_mb = env::var("APPBUILD_DEFAULT_RAM_MB")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RAM_MB);

        let storage_dir = env::var("APPBUILD_STORAGE_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("appbuild").join("storage")))
            .unwrap_or_else(|| env::temp_dir().join("appbuild-storage"));

        let components_path = env::var("APPBUILD_COMPONENTS").ok().map(PathBuf::from);

        let toolchain_command = env::var("APPBUILD_TOOLCHAIN_CMD")
            .ok()
            .filter(|cmd| !cmd.trim().is_empty());

        Self {
            log_level,
            toolchain_timeout_secs,
            default_ram_mb,
            storage_dir,
            components_path,
            toolchain_command,
        }
    }
}

impl BuildServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.toolchain_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Toolchain timeout must be at least 1 second".to_string(),
            ));
        }
        if self.toolchain_timeout_secs > MAX_TOOLCHAIN_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(format!(
                "Toolchain timeout cannot exceed {} seconds",
                MAX_TOOLCHAIN_TIMEOUT_SECS
            )));
        }

        if let Some(ref cmd) = self.toolchain_command {
            if cmd.contains(['"', '\'']) {
                return Err(ConfigError::ValidationFailed(
                    "Toolchain command is split on whitespace; quoted arguments are not supported"
                        .to_string(),
                ));
            }
        }

        if self.default_ram_mb < MIN_RAM_MB {
            return Err(ConfigError::ValidationFailed(format!(
                "Default RAM budget must be at least {} MB",
                MIN_RAM_MB
            )));
        }
        if self.default_ram_mb > MAX_RAM_MB {
            return Err(ConfigError::ValidationFailed(format!(
                "Default RAM budget cannot exceed {} MB",
                MAX_RAM_MB
            )));
        }

        Ok(())
    }

    pub fn toolchain_timeout(&self) -> Duration {
        Duration::from_secs(self.toolchain_timeout_secs)
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert(
            "toolchain_timeout_secs".to_string(),
            self.toolchain_timeout_secs.to_string(),
        );
        map.insert("default_ram_mb".to_string(), self.default_ram_mb.to_string());
        map.insert(
            "storage_dir".to_string(),
            self.storage_dir.display().to_string(),
        );
        if let Some(ref path) = self.components_path {
            map.insert("components_path".to_string(), path.display().to_string());
        }
        if let Some(ref cmd) = self.toolchain_command {
            map.insert("toolchain_command".to_string(), cmd.clone());
        }

        map
    }
}

impl fmt::Display for BuildServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build Server Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Toolchain Timeout: {}s", self.toolchain_timeout_secs)?;
        writeln!(f, "  Default RAM: {} MB", self.default_ram_mb)?;
        writeln!(f, "  Storage Dir: {}", self.storage_dir.display())?;
        match self.components_path {
            Some(ref path) => writeln!(f, "  Components: {}", path.display())?,
            None => writeln!(f, "  Components: <built-in>")?,
        }
        match self.toolchain_command {
            Some(ref cmd) => writeln!(f, "  Toolchain: {}", cmd)?,
            None => writeln!(f, "  Toolchain: <dry run>")?,
        }
        Ok(())
    }
}
