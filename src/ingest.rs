//! Input stream parsing and the sketch clock

use crate::app::App;
use crate::config::RFC3339_LAYOUT;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;
use std::time::Duration;
use tracing::{debug, info};

/// Maps instants to tick boundaries and counts the ticks between them.
#[derive(Debug, Clone)]
pub struct TickClock {
    tick_micros: i64,
    last: Option<i64>,
}

impl TickClock {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick_micros: i64::try_from(tick.as_micros()).unwrap_or(i64::MAX).max(1),
            last: None,
        }
    }

    fn index(&self, t: DateTime<Utc>) -> i64 {
        t.timestamp_micros().div_euclid(self.tick_micros)
    }

    fn boundary(&self, index: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(index.saturating_mul(self.tick_micros))
    }

    /// Latest tick boundary observed so far
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.last.and_then(|index| self.boundary(index))
    }

    /// Observe `t` and return how many whole ticks passed since the last
    /// observation. The first observation and instants from an earlier
    /// tick return 0.
    pub fn advance(&mut self, t: DateTime<Utc>) -> usize {
        let index = self.index(t);
        match self.last {
            None => {
                self.last = Some(index);
                0
            }
            Some(last) if index > last => {
                self.last = Some(index);
                usize::try_from(index - last).unwrap_or(usize::MAX)
            }
            Some(_) => 0,
        }
    }
}

/// One parsed input record
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub item: String,
    pub count: u32,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Record {
    item: String,
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    timestamp: Option<Value>,
}

/// Parse one line of text input. Blank lines carry no label.
pub fn parse_text_line(line: &str) -> Option<Event> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return None;
    }
    Some(Event {
        item: line.to_string(),
        count: 1,
        timestamp: None,
    })
}

/// Parse one line of JSON input. `Ok(None)` for blank lines.
pub fn parse_json_line(line: &str, layout: &str) -> serde_json::Result<Option<Event>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let record: Record = serde_json::from_str(line)?;
    Ok(Some(Event {
        item: record.item,
        count: record.count.unwrap_or(1).max(1),
        timestamp: record
            .timestamp
            .as_ref()
            .and_then(|value| parse_timestamp(value, layout)),
    }))
}

/// Interpret a JSON timestamp: integer or float Unix seconds, or a string in
/// `layout` (`rfc3339`, or a chrono format string).
pub fn parse_timestamp(value: &Value, layout: &str) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                DateTime::from_timestamp(secs, 0)
            } else {
                let secs = n.as_f64()?;
                if !secs.is_finite() {
                    return None;
                }
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9) as u32;
                DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
            }
        }
        Value::String(s) => parse_timestamp_str(s, layout),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str, layout: &str) -> Option<DateTime<Utc>> {
    if layout.eq_ignore_ascii_case(RFC3339_LAYOUT) {
        return DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(s, layout) {
        return Some(t.with_timezone(&Utc));
    }
    // layouts without an offset are read as UTC
    NaiveDateTime::parse_from_str(s, layout)
        .ok()
        .map(|t| t.and_utc())
}

/// Totals reported when the stream ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub records: u64,
    pub malformed: u64,
}

/// Reads records from the input stream into the sketch.
pub struct Ingester<'a> {
    app: &'a App,
    json: bool,
    layout: String,
    clock: TickClock,
    stats: IngestStats,
}

impl<'a> Ingester<'a> {
    pub fn new(app: &'a App) -> Self {
        let config = app.config();
        Self {
            app,
            json: config.input.json,
            layout: config.input.timestamp_layout.clone(),
            clock: TickClock::new(config.sketch.tick),
            stats: IngestStats::default(),
        }
    }

    /// Consume `reader` to the end. Read errors end ingestion like EOF.
    pub fn run<R: BufRead>(mut self, mut reader: R) -> IngestStats {
        info!(json = self.json, "reading input");
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("input read failed: {}", e);
                    break;
                }
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);
            self.line(&line);
        }
        debug!(
            records = self.stats.records,
            malformed = self.stats.malformed,
            "input exhausted"
        );
        self.stats
    }

    fn line(&mut self, line: &str) {
        let event = if self.json {
            match parse_json_line(line, &self.layout) {
                Ok(event) => event,
                Err(e) => {
                    self.stats.malformed += 1;
                    debug!("dropping malformed record: {}", e);
                    return;
                }
            }
        } else {
            parse_text_line(line)
        };
        if let Some(event) = event {
            self.event(event);
        }
    }

    fn event(&mut self, event: Event) {
        if self.app.uses_data_clock() {
            match event.timestamp {
                Some(t) => {
                    self.app.advance_clock(&mut self.clock, t);
                }
                None => self.app.fall_back_to_wall_clock(),
            }
        }
        self.app.record(&event.item, event.count);
        self.stats.records += 1;
    }
}
