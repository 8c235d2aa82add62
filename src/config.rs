use anyhow::{Context, Result};
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::engine::{EngineOptions, StepLayoutEngine, DEFAULT_LINE_PADDING};
use crate::error::StepError;
use crate::ui::StepStyle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub steps: StepsConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepsConfig {
    /// Step titles, left to right
    pub titles: Vec<String>,
    /// Expected number of steps; checked against `titles` when set
    #[serde(default)]
    pub total_steps: Option<usize>,
    #[serde(default = "default_circle_radius")]
    pub circle_radius: f32,
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    /// Gap between a circle and its lines, in circle radii
    #[serde(default = "default_line_padding")]
    pub line_padding: f32,
}

fn default_titles() -> Vec<String> {
    ["Cart", "Address", "Payment", "Review", "Done"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_circle_radius() -> f32 {
    1.0
}

fn default_line_height() -> f32 {
    1.0
}

fn default_line_padding() -> f32 {
    DEFAULT_LINE_PADDING
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            titles: default_titles(),
            total_steps: None,
            circle_radius: default_circle_radius(),
            line_height: default_line_height(),
            line_padding: default_line_padding(),
        }
    }
}

impl StepsConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            circle_radius: self.circle_radius,
            line_height: self.line_height,
            line_padding: self.line_padding,
        }
    }
}

/// Colours use ratatui syntax: names (`white`), hex (`#ffcc00`) or indices (`42`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_title_color")]
    pub title_color: String,
    /// regular, bold, italic or dim
    #[serde(default = "default_title_font")]
    pub title_font: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_completed_line_color")]
    pub completed_line_color: String,
    #[serde(default = "default_future_line_color")]
    pub future_line_color: String,
    #[serde(default = "default_completed_icon")]
    pub completed_icon: String,
    #[serde(default = "default_current_icon")]
    pub current_icon: String,
    #[serde(default = "default_future_icon")]
    pub future_icon: String,
    #[serde(default = "default_line_glyph")]
    pub line_glyph: String,
}

fn default_title_color() -> String {
    "white".to_string()
}

fn default_title_font() -> String {
    "regular".to_string()
}

fn default_background_color() -> String {
    "reset".to_string()
}

fn default_completed_line_color() -> String {
    "white".to_string()
}

fn default_future_line_color() -> String {
    "darkgray".to_string()
}

fn default_completed_icon() -> String {
    "✔".to_string()
}

fn default_current_icon() -> String {
    "●".to_string()
}

fn default_future_icon() -> String {
    "○".to_string()
}

fn default_line_glyph() -> String {
    "─".to_string()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            title_color: default_title_color(),
            title_font: default_title_font(),
            background_color: default_background_color(),
            completed_line_color: default_completed_line_color(),
            future_line_color: default_future_line_color(),
            completed_icon: default_completed_icon(),
            current_icon: default_current_icon(),
            future_icon: default_future_icon(),
            line_glyph: default_line_glyph(),
        }
    }
}

impl StyleConfig {
    pub fn step_style(&self) -> Result<StepStyle, StepError> {
        for (name, glyph) in [
            ("completed_icon", &self.completed_icon),
            ("current_icon", &self.current_icon),
            ("future_icon", &self.future_icon),
            ("line_glyph", &self.line_glyph),
        ] {
            if glyph.is_empty() {
                return Err(StepError::invalid_config(format!("{name} must not be empty")));
            }
        }

        Ok(StepStyle {
            title: Style::default()
                .fg(parse_color("title_color", &self.title_color)?)
                .add_modifier(parse_font(&self.title_font)?),
            background: parse_color("background_color", &self.background_color)?,
            completed_icon: self.completed_icon.clone(),
            current_icon: self.current_icon.clone(),
            future_icon: self.future_icon.clone(),
            completed_line: parse_color("completed_line_color", &self.completed_line_color)?,
            future_line: parse_color("future_line_color", &self.future_line_color)?,
            line_glyph: self.line_glyph.clone(),
        })
    }
}

fn parse_color(field: &str, value: &str) -> Result<Color, StepError> {
    Color::from_str(value)
        .map_err(|_| StepError::invalid_config(format!("{field}: unknown color '{value}'")))
}

/// Terminal stand-in for the title typeface
fn parse_font(value: &str) -> Result<Modifier, StepError> {
    match value.to_ascii_lowercase().as_str() {
        "regular" | "" => Ok(Modifier::empty()),
        "bold" => Ok(Modifier::BOLD),
        "italic" => Ok(Modifier::ITALIC),
        "dim" => Ok(Modifier::DIM),
        other => Err(StepError::invalid_config(format!(
            "title_font: unknown font '{other}'"
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Whether the demo advances on its own
    #[serde(default = "default_driver_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_driver_enabled() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    2000 // 2 seconds
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            enabled: default_driver_enabled(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl DriverConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,
}

fn default_refresh_rate() -> u64 {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for logs and other runtime files
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".stepbar".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

impl Config {
    /// Project-local config file, relative to the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("stepbar.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the bar works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/stepbar/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("stepbar").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables like STEPBAR__DRIVER__INTERVAL_MS
        builder = builder.add_source(
            config::Environment::with_prefix("STEPBAR")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("steps.titles")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        let config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate().context("Invalid step configuration")?;
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Check everything the engine and widget will need, up front
    pub fn validate(&self) -> Result<(), StepError> {
        if self.steps.titles.is_empty() {
            return Err(StepError::invalid_config("steps.titles must not be empty"));
        }
        if let Some(total) = self.steps.total_steps {
            if total != self.steps.titles.len() {
                return Err(StepError::invalid_config(format!(
                    "steps.total_steps is {total} but {} titles are configured",
                    self.steps.titles.len()
                )));
            }
        }
        self.steps.engine_options().validate()?;
        self.style.step_style()?;
        if self.driver.interval_ms == 0 {
            return Err(StepError::invalid_config("driver.interval_ms must be positive"));
        }
        Ok(())
    }

    /// Engine configured with the step titles
    pub fn engine(&self) -> Result<StepLayoutEngine, StepError> {
        StepLayoutEngine::with_titles(self.steps.engine_options(), self.steps.titles.clone())
    }

    pub fn step_style(&self) -> Result<StepStyle, StepError> {
        self.style.step_style()
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            steps: StepsConfig::default(),
            style: StyleConfig::default(),
            driver: DriverConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.steps.titles.len(), 5);
        assert_eq!(config.driver.interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_total_steps_mismatch_rejected() {
        let mut config = Config::default();
        config.steps.total_steps = Some(3);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("total_steps"));

        config.steps.total_steps = Some(5);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_titles_rejected() {
        let mut config = Config::default();
        config.steps.titles.clear();
        assert!(matches!(
            config.validate().unwrap_err(),
            StepError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_bad_radius_rejected() {
        let mut config = Config::default();
        config.steps.circle_radius = -2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_style_parsing() {
        let style = StyleConfig {
            title_color: "#ff8800".to_string(),
            title_font: "Bold".to_string(),
            future_line_color: "42".to_string(),
            ..StyleConfig::default()
        }
        .step_style()
        .unwrap();

        assert_eq!(style.title.fg, Some(Color::Rgb(0xff, 0x88, 0x00)));
        assert!(style.title.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.future_line, Color::Indexed(42));
        assert_eq!(style.completed_line, Color::White);
    }

    #[test]
    fn test_unknown_color_and_font_rejected() {
        let bad_color = StyleConfig {
            completed_line_color: "not-a-color".to_string(),
            ..StyleConfig::default()
        };
        assert!(bad_color
            .step_style()
            .unwrap_err()
            .to_string()
            .contains("completed_line_color"));

        let bad_font = StyleConfig {
            title_font: "comic".to_string(),
            ..StyleConfig::default()
        };
        assert!(bad_font.step_style().is_err());
    }

    #[test]
    fn test_engine_from_config() {
        let engine = Config::default().engine().unwrap();
        assert_eq!(engine.step_count(), 5);
        assert_eq!(engine.titles()[0], "Cart");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("custom.toml");

        let mut config = Config::default();
        config.steps.titles = vec!["One".to_string(), "Two".to_string()];
        config.driver.interval_ms = 750;
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.steps.titles, vec!["One", "Two"]);
        assert_eq!(loaded.driver.interval_ms, 750);
        assert_eq!(loaded.style.line_glyph, "─");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[steps]\ntotal_steps = 2\n").unwrap();

        assert!(Config::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_logs_path_under_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }
}
