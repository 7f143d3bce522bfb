//! Configuration management for Docket.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/docket/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source portal URLs and page selectors
    pub portal: PortalConfig,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// CAPTCHA retry policy
    pub captcha: CaptchaConfig,
    /// Result readiness polling policy
    pub readiness: ReadinessConfig,
    /// Artifact output settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `DOCKET_HEADLESS`: Override browser headless mode (true/false)
    /// - `DOCKET_DOWNLOAD_DIR`: Override the artifact output directory
    /// - `DOCKET_CAPTCHA_ATTEMPTS`: Override the CAPTCHA attempt budget
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DOCKET_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("DOCKET_DOWNLOAD_DIR") {
            if !val.trim().is_empty() {
                tracing::debug!("Override output.download_dir from env: {}", val);
                self.output.download_dir = PathBuf::from(val);
            }
        }

        if let Some(val) = lookup("DOCKET_CAPTCHA_ATTEMPTS") {
            if let Ok(attempts) = val.parse() {
                self.captcha.max_attempts = attempts;
                tracing::debug!("Override captcha.max_attempts from env: {}", attempts);
            }
        }
    }

    /// Check the values a run cannot proceed without.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.captcha.max_attempts == 0 {
            return Err(invalid("captcha.max_attempts", "must be at least 1"));
        }

        if self.readiness.max_polls == 0 {
            return Err(invalid("readiness.max_polls", "must be at least 1"));
        }

        if self.readiness.selectors.iter().all(|s| s.trim().is_empty()) {
            return Err(invalid(
                "readiness.selectors",
                "at least one result container selector is required",
            ));
        }

        for (field, value) in [
            ("portal.base_url", &self.portal.base_url),
            ("portal.cause_list_url", &self.portal.cause_list_url),
        ] {
            url::Url::parse(value).map_err(|e| invalid(field, &format!("not a URL: {e}")))?;
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/docket/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "docket", "docket").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Source portal URLs and the selectors used to drive its forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Case status search page
    pub base_url: String,
    /// Cause list page
    pub cause_list_url: String,
    /// Container holding the case history once results load
    pub result_container: String,
    /// Full CNR input
    pub cnr_input: String,
    /// Case type dropdown
    pub case_type_select: String,
    /// Case number input
    pub case_number_input: String,
    /// Registration year input
    pub case_year_input: String,
    /// CAPTCHA answer input
    pub captcha_input: String,
    /// Search / submit button
    pub captcha_submit: String,
    /// Regions that carry visible error messages after a submission
    pub error_regions: String,
    /// Script that asks the page for a fresh CAPTCHA image
    pub captcha_refresh_script: String,
    /// Cause list state dropdown
    pub state_select: String,
    /// Cause list district dropdown
    pub district_select: String,
    /// Cause list court complex dropdown
    pub court_complex_select: String,
    /// Cause list date input
    pub cause_list_date_input: String,
    /// Cause list submit button
    pub cause_list_submit: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://services.ecourts.gov.in/ecourtindia_v6/".to_string(),
            cause_list_url: "https://services.ecourts.gov.in/ecourtindia_v6/?p=cause_list/index"
                .to_string(),
            result_container: "#history_cnr".to_string(),
            cnr_input: "#cino".to_string(),
            case_type_select: "#case_type".to_string(),
            case_number_input: "#case_no".to_string(),
            case_year_input: "#rgyear".to_string(),
            captcha_input: "#fcaptcha_code".to_string(),
            captcha_submit: "#searchbtn".to_string(),
            error_regions: ".alert-danger, .alert-danger-cust, .error".to_string(),
            captcha_refresh_script: "refreshCaptcha();".to_string(),
            state_select: "#state_code".to_string(),
            district_select: "#dist_code".to_string(),
            court_complex_select: "#court_complex_code".to_string(),
            cause_list_date_input: "#search_date".to_string(),
            cause_list_submit: "#submit1".to_string(),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode (the CAPTCHA must stay visible to a human)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Pause after each navigation before touching the page, in milliseconds
    pub page_load_delay_ms: u64,
    /// Pause after choosing a dropdown option that repopulates the next one
    pub dropdown_delay_ms: u64,
}

impl BrowserConfig {
    /// Pause after navigation.
    #[must_use]
    pub fn page_load_delay(&self) -> Duration {
        Duration::from_millis(self.page_load_delay_ms)
    }

    /// Pause after a dependent dropdown selection.
    #[must_use]
    pub fn dropdown_delay(&self) -> Duration {
        Duration::from_millis(self.dropdown_delay_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1366,
            window_height: 900,
            page_load_delay_ms: 3000,
            dropdown_delay_ms: 2000,
        }
    }
}

/// CAPTCHA retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Maximum number of solutions submitted before giving up
    pub max_attempts: u32,
    /// Wait after a submission before inspecting the page, in milliseconds
    pub settle_delay_ms: u64,
    /// Wait after requesting a fresh challenge, in milliseconds
    pub refresh_delay_ms: u64,
    /// Lower-case substrings that mark an error region as a rejection
    pub rejection_keywords: Vec<String>,
}

impl CaptchaConfig {
    /// Wait after submission.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Wait after refresh.
    #[must_use]
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            settle_delay_ms: 5000,
            refresh_delay_ms: 2000,
            rejection_keywords: vec!["captcha".to_string(), "invalid".to_string()],
        }
    }
}

/// Result readiness polling policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Wait before the first poll, in milliseconds
    pub initial_delay_ms: u64,
    /// Wait between polls, in milliseconds
    pub poll_interval_ms: u64,
    /// Number of poll cycles before timing out
    pub max_polls: u32,
    /// Trimmed content must be longer than this to count as ready
    pub min_content_chars: usize,
    /// Result container selectors, most specific first
    pub selectors: Vec<String>,
}

impl ReadinessConfig {
    /// Wait before the first poll.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Wait between polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5000,
            poll_interval_ms: 2000,
            max_polls: 5,
            min_content_chars: 50,
            selectors: vec![
                "#history_cnr".to_string(),
                ".case-details".to_string(),
                ".result-container".to_string(),
                ".table-responsive".to_string(),
            ],
        }
    }
}

/// Artifact output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated documents
    pub download_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
        }
    }
}
