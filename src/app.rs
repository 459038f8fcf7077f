//! Application state for topk-tui
//!
//! Everything the refresh activities and the frame renderer share. Two
//! coarse locks guard it: one for the sketch, one for the UI state. When both
//! are needed the UI lock is taken first.

use crate::canvas::{Canvas, Color};
use crate::config::Config;
use crate::error::Result;
use crate::ingest::TickClock;
use crate::ranked::{self, RankedSetView};
use crate::sketch::{Sketch, SketchOptions};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use ratatui::widgets::ListState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Plot size used until the first frame reports the real one.
pub const DEFAULT_PLOT_AREA: (usize, usize) = (40, 20);

/// State owned by the UI lock
#[derive(Debug)]
pub struct UiState {
    /// Ranked list and its selection cursor
    pub view: RankedSetView,
    /// Scroll offset of the rendered list
    pub list_state: ListState,
    /// Keep the cursor on the selected label across re-ranks
    pub track_selected: bool,
    /// Most recent tick boundary, from the data or the wall clock
    pub latest_tick: Option<DateTime<Utc>>,
    /// Last rasterized plot
    pub canvas: Canvas,
    /// Plot area in cells as of the last frame
    pub plot_area: (usize, usize),
}

impl UiState {
    fn new(track_selected: bool) -> Self {
        Self {
            view: RankedSetView::default(),
            list_state: ListState::default(),
            track_selected,
            latest_tick: None,
            canvas: Canvas::new(DEFAULT_PLOT_AREA.0, DEFAULT_PLOT_AREA.1),
            plot_area: DEFAULT_PLOT_AREA,
        }
    }
}

/// Application state
#[derive(Debug)]
pub struct App {
    /// Configuration
    config: Config,
    /// Ticks per window
    history_len: usize,
    /// Selected series color
    highlight: Color,
    /// Color of every other series
    dim: Color,
    /// Sliding-window sketch
    pub sketch: Mutex<Sketch>,
    /// List, selection, canvas and clock readout
    pub ui: Mutex<UiState>,
    /// Plot on a log scale
    log_scale: AtomicBool,
    /// Record timestamps drive the clock
    data_clock: AtomicBool,
}

impl App {
    /// Create a new application
    pub fn new(config: Config) -> Result<Self> {
        Self::with_seed(config, None)
    }

    /// Create an application whose sketch uses a fixed RNG seed
    pub fn with_seed(config: Config, seed: Option<u64>) -> Result<Self> {
        let (highlight, dim) = config.palette()?;
        let history_len = config.history_len();
        let sketch = Sketch::new(
            config.sketch.k,
            history_len,
            SketchOptions {
                width: config.sketch.width,
                depth: config.sketch.depth,
                decay: config.sketch.decay as f32,
                decay_lut_size: config.sketch.decay_lut_size,
                seed,
            },
        );
        Ok(Self {
            history_len,
            highlight,
            dim,
            sketch: Mutex::new(sketch),
            ui: Mutex::new(UiState::new(config.render.track_selected)),
            log_scale: AtomicBool::new(config.render.log_scale),
            data_clock: AtomicBool::new(config.input.json),
            config,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ticks per window
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// (highlight, dim) series colors
    pub fn palette(&self) -> (Color, Color) {
        (self.highlight, self.dim)
    }

    pub fn log_scale(&self) -> bool {
        self.log_scale.load(Ordering::Relaxed)
    }

    /// Flip between linear and log scale, returning the new setting
    pub fn toggle_log_scale(&self) -> bool {
        !self.log_scale.fetch_xor(true, Ordering::Relaxed)
    }

    /// Flip selection tracking, returning the new setting
    pub fn toggle_tracking(&self) -> bool {
        let mut ui = self.ui.lock();
        ui.track_selected = !ui.track_selected;
        ui.track_selected
    }

    /// Whether record timestamps still drive the clock
    pub fn uses_data_clock(&self) -> bool {
        self.data_clock.load(Ordering::Relaxed)
    }

    /// Hand the clock to the wall clock for the rest of the run
    pub fn fall_back_to_wall_clock(&self) {
        if self.data_clock.swap(false, Ordering::Relaxed) {
            info!("record without a usable timestamp, switching to wall-clock ticks");
        }
    }

    /// Count `count` occurrences of `label`
    pub fn record(&self, label: &str, count: u32) {
        self.sketch.lock().add(label, count);
    }

    /// Advance the sketch to the tick containing `t`
    pub fn advance_clock(&self, clock: &mut TickClock, t: DateTime<Utc>) -> usize {
        let ticks = clock.advance(t);
        if ticks > 0 {
            self.sketch.lock().ticks(ticks);
        }
        if let Some(latest) = clock.latest() {
            self.ui.lock().latest_tick = Some(latest);
        }
        ticks
    }

    /// One wall-clock tick; a no-op while record timestamps drive the clock
    pub fn tick_wall_clock(&self, clock: &mut TickClock, now: DateTime<Utc>) -> usize {
        if self.uses_data_clock() {
            return 0;
        }
        self.advance_clock(clock, now)
    }

    /// Re-rank the list from the sketch
    pub fn refresh_ranked(&self) {
        let items = ranked::refresh_ranked(&self.sketch.lock());
        let mut ui = self.ui.lock();
        let track = ui.track_selected;
        debug!(items = items.len(), track, "ranked list refreshed");
        ui.view.replace(items, track);
    }

    /// Refresh displayed counts without reordering
    pub fn refresh_counts(&self) {
        let mut ui = self.ui.lock();
        let sketch = self.sketch.lock();
        ui.view.refresh_counts(&sketch);
    }
}
