//! Configuration management for topk-tui

use crate::canvas::Color;
use crate::error::{Result, TopkError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timestamp layout value selecting RFC 3339 parsing.
pub const RFC3339_LAYOUT: &str = "rfc3339";

/// Upper bound on ticks per window
pub const MAX_HISTORY_LEN: usize = 100_000;
/// Upper bound on `width * depth * history_len` count slots
pub const MAX_SKETCH_SLOTS: usize = 50_000_000;
/// Upper bound on the decay look-up table length
pub const MAX_DECAY_LUT_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sketch configuration
    pub sketch: SketchConfig,
    /// Refresh rates and view settings
    pub render: RenderConfig,
    /// Input stream configuration
    pub input: InputConfig,
    /// Log output configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Track the top K items
    pub k: usize,
    /// Buckets per hash row
    pub width: usize,
    /// Number of hash rows
    pub depth: usize,
    /// Counter decay probability on collisions
    pub decay: f64,
    /// Size of the decay look-up table
    pub decay_lut_size: usize,
    /// Sliding window length
    #[serde(with = "duration_str")]
    pub window: Duration,
    /// Time bucket precision of the window
    #[serde(with = "duration_str")]
    pub tick: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Plot refresh rate (frames per second)
    pub plot_fps: u32,
    /// Ranked list refresh rate (frames per second)
    pub items_fps: u32,
    /// Item counts refresh rate (frames per second)
    pub item_counts_fps: u32,
    /// Keep the selected item focused across rank refreshes
    pub track_selected: bool,
    /// Logarithmic Y scale
    pub log_scale: bool,
    /// Left pane width as a percentage of the screen, clamped to [20,80]
    pub view_split: u16,
    /// Terminal background the default colors are picked for
    pub theme: Theme,
    /// Palette name of the highlighted series color (overrides the theme)
    pub highlight_color: Option<String>,
    /// Palette name of the dimmed series color (overrides the theme)
    pub dim_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Read JSON records {item,[count],[timestamp]} instead of text lines
    pub json: bool,
    /// Layout for string timestamps: "rfc3339" or a chrono strftime pattern
    pub timestamp_layout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path (the terminal is owned by the dashboard)
    pub file: PathBuf,
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sketch: SketchConfig::default(),
            render: RenderConfig::default(),
            input: InputConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            k: 50,
            width: 3000,
            depth: 3,
            decay: 0.9,
            decay_lut_size: 8192,
            window: Duration::from_secs(10),
            tick: Duration::from_secs(1),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            plot_fps: 20,
            items_fps: 1,
            item_counts_fps: 5,
            track_selected: false,
            log_scale: false,
            view_split: 50,
            theme: Theme::Dark,
            highlight_color: None,
            dim_color: None,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            json: false,
            timestamp_layout: RFC3339_LAYOUT.to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            file: cache_dir.join("topk-tui").join("topk.log"),
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Get default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("topk-tui")
            .join("config.toml")
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Normalize clamped values and reject ones the dashboard cannot run with.
    pub fn validate(&mut self) -> Result<()> {
        self.render.view_split = self.render.view_split.clamp(20, 80);

        let sketch = &self.sketch;
        if sketch.k == 0 {
            return Err(TopkError::Config("k must be at least 1".into()));
        }
        if sketch.width == 0 || sketch.depth == 0 {
            return Err(TopkError::Config(
                "sketch width and depth must be at least 1".into(),
            ));
        }
        if !(sketch.decay > 0.0 && sketch.decay <= 1.0) {
            return Err(TopkError::Config(format!(
                "decay must be in (0, 1], got {}",
                sketch.decay
            )));
        }
        if sketch.tick.is_zero() {
            return Err(TopkError::Config("tick must be positive".into()));
        }
        if sketch.window < sketch.tick {
            return Err(TopkError::Config(format!(
                "window ({}) must be at least one tick ({})",
                format_duration(sketch.window),
                format_duration(sketch.tick)
            )));
        }
        let history_len = self.history_len();
        if history_len > MAX_HISTORY_LEN {
            return Err(TopkError::Config(format!(
                "window / tick is {} ticks, at most {} allowed",
                history_len, MAX_HISTORY_LEN
            )));
        }
        let slots = sketch
            .width
            .checked_mul(sketch.depth)
            .and_then(|cells| cells.checked_mul(history_len));
        if slots.map_or(true, |slots| slots > MAX_SKETCH_SLOTS) {
            return Err(TopkError::Config(format!(
                "sketch of {}x{} buckets over {} ticks exceeds {} count slots",
                sketch.width, sketch.depth, history_len, MAX_SKETCH_SLOTS
            )));
        }
        if sketch.decay_lut_size > MAX_DECAY_LUT_SIZE {
            return Err(TopkError::Config(format!(
                "decay-lut-size must be at most {}, got {}",
                MAX_DECAY_LUT_SIZE, sketch.decay_lut_size
            )));
        }

        let render = &self.render;
        for (name, fps) in [
            ("plot-fps", render.plot_fps),
            ("items-fps", render.items_fps),
            ("item-counts-fps", render.item_counts_fps),
        ] {
            if fps == 0 {
                return Err(TopkError::Config(format!("{} must be at least 1", name)));
            }
        }

        self.palette()?;
        Ok(())
    }

    /// Number of ticks in the sliding window
    pub fn history_len(&self) -> usize {
        let ticks = self.sketch.window.as_nanos() / self.sketch.tick.as_nanos().max(1);
        usize::try_from(ticks).unwrap_or(usize::MAX).max(1)
    }

    pub fn plot_period(&self) -> Duration {
        fps_period(self.render.plot_fps)
    }

    pub fn items_period(&self) -> Duration {
        fps_period(self.render.items_fps)
    }

    /// Count refresh period, `None` when it would duplicate the rank refresh
    pub fn item_counts_period(&self) -> Option<Duration> {
        if self.render.item_counts_fps == self.render.items_fps {
            None
        } else {
            Some(fps_period(self.render.item_counts_fps))
        }
    }

    /// Resolve the (highlight, dim) series colors
    pub fn palette(&self) -> Result<(Color, Color)> {
        let (highlight, dim) = match self.render.theme {
            Theme::Dark => ("cyan", "dimgray"),
            Theme::Light => ("black", "lightgray"),
        };
        let resolve = |name: Option<&str>, fallback: &str| {
            let name = name.unwrap_or(fallback);
            Color::named(name).ok_or_else(|| {
                let known: Vec<_> = Color::names().collect();
                TopkError::Config(format!(
                    "unknown color name: {} (expected a 0-255 index or one of {})",
                    name,
                    known.join(", ")
                ))
            })
        };
        Ok((
            resolve(self.render.highlight_color.as_deref(), highlight)?,
            resolve(self.render.dim_color.as_deref(), dim)?,
        ))
    }
}

fn fps_period(fps: u32) -> Duration {
    Duration::from_secs(1) / fps.max(1)
}

/// Parse durations like `250us`, `500ms`, `1s`, `1.5s`, `10m`, `1h`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| TopkError::Duration(s.to_string()))?;
    let (value, unit) = s.split_at(split);
    let value: f64 = value
        .parse()
        .map_err(|_| TopkError::Duration(s.to_string()))?;
    let scale = UNITS
        .iter()
        .chain(&[(1_000, "\u{b5}s")])
        .find(|(_, name)| *name == unit)
        .map(|&(nanos, _)| nanos)
        .ok_or_else(|| TopkError::Duration(s.to_string()))?;
    let nanos = (value * scale as f64).round();
    if !nanos.is_finite() || nanos < 0.0 || nanos > u64::MAX as f64 {
        return Err(TopkError::Duration(s.to_string()));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// Duration units, largest first, in nanoseconds
const UNITS: [(u64, &str); 6] = [
    (3_600_000_000_000, "h"),
    (60_000_000_000, "m"),
    (1_000_000_000, "s"),
    (1_000_000, "ms"),
    (1_000, "us"),
    (1, "ns"),
];

/// Inverse of [`parse_duration`]: the largest unit that divides `d` exactly.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    let (scale, unit) = UNITS
        .iter()
        .find(|(scale, _)| nanos % u128::from(*scale) == 0)
        .copied()
        .unwrap_or((1, "ns"));
    format!("{}{}", nanos / u128::from(scale), unit)
}

mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(d)?;
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("3 days").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(10)), "10s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn test_sub_millisecond_durations_keep_precision() {
        assert_eq!(format_duration(Duration::from_micros(500)), "500us");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1500us");
        assert_eq!(format_duration(Duration::from_nanos(250)), "250ns");
        assert_eq!(parse_duration("500us").unwrap(), Duration::from_micros(500));
        assert_eq!(parse_duration("500\u{b5}s").unwrap(), Duration::from_micros(500));
        assert_eq!(parse_duration("0.5ms").unwrap(), Duration::from_micros(500));

        let mut config = Config::default();
        config.sketch.tick = Duration::from_micros(500);
        config.sketch.window = Duration::from_millis(20);
        let text = config.to_toml().unwrap();
        assert!(text.contains("tick = \"500us\""));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.sketch.tick, Duration::from_micros(500));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let mut config = Config::default();
        config.sketch.window = Duration::from_secs(3600);
        config.sketch.tick = Duration::from_millis(1);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ticks"));
    }

    #[test]
    fn test_oversized_sketch_rejected() {
        let mut config = Config::default();
        config.sketch.width = usize::MAX / 2;
        config.sketch.depth = 3;
        assert!(matches!(config.validate(), Err(TopkError::Config(_))));

        let mut config = Config::default();
        config.sketch.width = 2_000_000;
        config.sketch.depth = 10;
        assert!(matches!(config.validate(), Err(TopkError::Config(_))));
    }

    #[test]
    fn test_oversized_decay_lut_rejected() {
        let mut config = Config::default();
        config.sketch.decay_lut_size = MAX_DECAY_LUT_SIZE + 1;
        assert!(config.validate().is_err());
        config.sketch.decay_lut_size = MAX_DECAY_LUT_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_view_split_is_clamped() {
        let mut config = Config::default();
        config.render.view_split = 5;
        config.validate().unwrap();
        assert_eq!(config.render.view_split, 20);

        config.render.view_split = 95;
        config.validate().unwrap();
        assert_eq!(config.render.view_split, 80);
    }

    #[test]
    fn test_zero_fps_rejected() {
        let mut config = Config::default();
        config.render.plot_fps = 0;
        assert!(matches!(config.validate(), Err(TopkError::Config(_))));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let mut config = Config::default();
        config.sketch.tick = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_history_len() {
        let config = Config::default();
        assert_eq!(config.history_len(), 10);
    }

    #[test]
    fn test_item_counts_skipped_when_equal() {
        let mut config = Config::default();
        assert!(config.item_counts_period().is_some());
        config.render.item_counts_fps = config.render.items_fps;
        assert!(config.item_counts_period().is_none());
    }

    #[test]
    fn test_palette_by_theme_and_name() {
        let mut config = Config::default();
        assert_eq!(
            config.palette().unwrap(),
            (Color::Indexed(14), Color::Indexed(242))
        );
        config.render.theme = Theme::Light;
        config.render.highlight_color = Some("Tomato".into());
        assert_eq!(
            config.palette().unwrap(),
            (Color::Indexed(203), Color::Indexed(252))
        );
        config.render.dim_color = Some("no-such-color".into());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("no-such-color"));
        assert!(err.contains("dimgray"));
    }

    #[test]
    fn test_toml_round_trip_keeps_durations() {
        let config: Config = toml::from_str(
            r#"
            [sketch]
            window = "1m"
            tick = "500ms"
            "#,
        )
        .unwrap();
        assert_eq!(config.sketch.window, Duration::from_secs(60));
        assert_eq!(config.history_len(), 120);
        assert!(config.to_toml().unwrap().contains("tick = \"500ms\""));
    }
}
