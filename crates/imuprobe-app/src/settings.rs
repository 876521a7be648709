use anyhow::{Context, Result};
use imuprobe_core::TransportConfig;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "imuprobe";
const FILE_NAME: &str = "transport.json";

/// `$XDG_CONFIG_HOME/imuprobe/transport.json` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
}

/// Loads the bus settings. An explicit path must exist; the default location
/// is optional and falls back to built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<TransportConfig> {
    match explicit {
        Some(path) => read_file(path),
        None => match default_path() {
            Some(path) if path.exists() => read_file(&path),
            _ => Ok(TransportConfig::default()),
        },
    }
}

pub fn read_file(path: &Path) -> Result<TransportConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    log::debug!("loaded transport config from {}", path.display());
    Ok(config)
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device: Option<String>,
    pub speed_hz: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut TransportConfig) {
        if let Some(device) = &self.device {
            config.device_path = device.clone();
        }
        if let Some(speed) = self.speed_hz {
            config.clock_speed_hz = speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> std::io::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_explicit_file() {
        let file = temp_config(r#"{"device_path": "/dev/spidev1.1", "inter_byte_delay_us": 2}"#).unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.device_path, "/dev/spidev1.1");
        assert_eq!(config.inter_byte_delay_us, 2);
        assert_eq!(config.clock_speed_hz, 500_000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transport.json");
        let err = load(Some(path.as_path())).unwrap_err();
        assert!(format!("{err:#}").contains("reading"));
    }

    #[test]
    fn test_bad_json_mentions_path() {
        let file = temp_config("{ not json").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("parsing"));
        assert!(message.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = TransportConfig::default();
        Overrides {
            device: Some("/dev/spidev2.0".into()),
            speed_hz: Some(1_000_000),
        }
        .apply(&mut config);
        assert_eq!(config.device_path, "/dev/spidev2.0");
        assert_eq!(config.clock_speed_hz, 1_000_000);
    }
}
