//! Periodic activities over the shared application state
//!
//! Ingestion runs on the blocking pool. The wall-clock tick and the three
//! refresh cycles (rank, counts, plot) are tokio tasks that sleep for their
//! period, then do one unit of work. All of them stop at the next wake-up
//! once the phase turns [`Phase::Terminating`].

use crate::app::App;
use crate::ingest::{IngestStats, Ingester, TickClock};
use crate::series;
use chrono::Utc;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, nothing running
    Idle,
    /// Activities armed
    Running,
    /// Activities exit at their next wake-up
    Terminating,
}

pub struct Scheduler {
    app: Arc<App>,
    phase: watch::Sender<Phase>,
    tasks: Vec<JoinHandle<()>>,
    ingest: Option<JoinHandle<IngestStats>>,
}

impl Scheduler {
    pub fn new(app: Arc<App>) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            app,
            phase,
            tasks: Vec::new(),
            ingest: None,
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Arm every activity. `input` is read to its end on the blocking pool.
    /// Must be called from within a tokio runtime.
    pub fn start<R>(&mut self, input: Option<R>)
    where
        R: BufRead + Send + 'static,
    {
        if self.phase() != Phase::Idle {
            warn!(phase = ?self.phase(), "scheduler already started");
            return;
        }
        self.phase.send_replace(Phase::Running);
        let config = self.app.config().clone();

        if let Some(reader) = input {
            let app = Arc::clone(&self.app);
            self.ingest = Some(tokio::task::spawn_blocking(move || {
                Ingester::new(&app).run(reader)
            }));
        }

        let app = Arc::clone(&self.app);
        let mut clock = TickClock::new(config.sketch.tick);
        let (wall_origin, origin) = (Utc::now(), Instant::now());
        app.tick_wall_clock(&mut clock, wall_origin);
        self.every("sketch-tick", config.sketch.tick, move || {
            let elapsed = chrono::Duration::from_std(origin.elapsed())
                .unwrap_or_else(|_| chrono::Duration::zero());
            app.tick_wall_clock(&mut clock, wall_origin + elapsed);
        });

        let app = Arc::clone(&self.app);
        self.every("rank-refresh", config.items_period(), move || {
            app.refresh_ranked();
        });

        if let Some(period) = config.item_counts_period() {
            let app = Arc::clone(&self.app);
            self.every("count-refresh", period, move || app.refresh_counts());
        }

        let app = Arc::clone(&self.app);
        let mut plot = PlotRefresher::new(config.sketch.k, app.history_len());
        self.every("plot-refresh", config.plot_period(), move || {
            plot.refresh(&app);
        });
    }

    fn every<F>(&mut self, name: &'static str, period: Duration, mut work: F)
    where
        F: FnMut() + Send + 'static,
    {
        let mut phase = self.phase.subscribe();
        self.tasks.push(tokio::spawn(async move {
            debug!(activity = name, ?period, "activity armed");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(period) => {}
                    _ = phase.wait_for(|p| *p == Phase::Terminating) => break,
                }
                work();
            }
            debug!(activity = name, "activity stopped");
        }));
    }

    /// Ask every activity to stop.
    pub fn shutdown(&self) {
        self.phase.send_replace(Phase::Terminating);
    }

    /// Wait for the periodic activities to exit. Ingestion may still be
    /// blocked on a read and is not waited for.
    pub async fn join(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("activity failed: {}", e);
            }
        }
    }

    /// Wait for ingestion to reach the end of its input.
    pub async fn input_finished(&mut self) -> Option<IngestStats> {
        let task = self.ingest.take()?;
        match task.await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("ingestion failed: {}", e);
                None
            }
        }
    }
}

/// Fills the plot canvas from the sketch.
///
/// Keeps K+1 series slots. The selected item's series always ends up in
/// slot `n` (drawn last, highlighted) and the previously highlighted series
/// in slot `n - 1`, drawn dim, so a deselected item fades instead of
/// vanishing.
pub struct PlotRefresher {
    slots: Vec<Vec<f64>>,
    highlight_slot: Option<usize>,
}

impl PlotRefresher {
    pub fn new(k: usize, history_len: usize) -> Self {
        Self {
            slots: vec![vec![0.0; history_len]; k + 1],
            highlight_slot: None,
        }
    }

    pub fn slots(&self) -> &[Vec<f64>] {
        &self.slots
    }

    pub fn refresh(&mut self, app: &App) {
        let (items, selected, mut canvas) = {
            let ui = app.ui.lock();
            let (width, height) = ui.plot_area;
            (
                ui.view.items().to_vec(),
                ui.view.selected(),
                ui.canvas.resized(width, height),
            )
        };
        let n = items.len().min(self.slots.len() - 1);
        if n == 0 {
            return;
        }
        if let Some(previous) = self.highlight_slot {
            if previous != n {
                self.slots.swap(previous, n);
            }
        }

        let history_len = app.history_len();
        let log_scale = app.log_scale();
        for i in 0..n {
            // rotated so the selected item lands in slot n - 1
            let item = &items[(1 + selected + i) % n];
            let counts = series::extract(&app.sketch, item, history_len);
            series::to_plot_values(&counts, log_scale, &mut self.slots[i]);
        }
        self.slots.swap(n - 1, n);
        self.highlight_slot = Some(n);

        let (highlight, dim) = app.palette();
        canvas.show_axis = false;
        canvas.num_data_points = history_len;
        canvas.line_colors = vec![dim; n + 1];
        canvas.line_colors[n] = highlight;
        canvas.fill(&self.slots[..=n]);

        app.ui.lock().canvas = canvas;
    }
}
