use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub billing: BillingConfig,
    pub aws: AwsConfig,
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Directory holding one snapshot file per calendar day
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Restrict sampling to a single region; all regions when unset
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Sender address, must be verified with SES
    pub sender: String,
    pub recipient: String,
    /// Region the SES client talks to
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            billing: BillingConfig {
                data_dir: PathBuf::from("billing"),
            },
            aws: AwsConfig { region: None },
            email: None,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .costwatch.toml in current dir, then ~/.config/costwatch/config.toml
            let local = PathBuf::from(".costwatch.toml");
            if local.exists() {
                local
            } else if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("costwatch").join("config.toml")
            } else {
                local
            }
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
        Ok(config)
    }
}

/// Write a default configuration file
pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    let contents = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    std::fs::write(output, contents)
        .with_context(|| format!("Failed to write config: {}", output.display()))?;
    println!("Wrote default config to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.billing.data_dir, PathBuf::from("billing"));
        assert!(config.aws.region.is_none());
        assert!(config.email.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        init_config(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.billing.data_dir, PathBuf::from("billing"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nope.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.billing.data_dir, PathBuf::from("billing"));
    }

    #[test]
    fn test_load_with_email_section() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[billing]
data_dir = "/var/lib/costwatch"

[aws]
region = "us-east-1"

[email]
sender = "billing@example.com"
recipient = "team@example.com"
region = "us-east-1"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("us-east-1"));
        let email = config.email.expect("email section");
        assert_eq!(email.sender, "billing@example.com");
    }
}
