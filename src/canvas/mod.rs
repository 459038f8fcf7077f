//! Braille line plots on a terminal cell grid
//!
//! A [`Canvas`] rasterizes any number of numeric series into 2×4 braille
//! sub-pixels per cell, optionally with a labeled Y axis and an X axis with
//! start/end labels. Every [`Canvas::fill`] rebuilds the grid from scratch;
//! rendering (`Display` for ANSI text, `Widget` for ratatui) only reads it.

mod cell;
mod color;
mod line;

pub use cell::{Cell, Glyph, BRAILLE, BRAILLE_OFFSET};
pub use color::{Color, RESET};
pub use line::{line, Point};

use cell::{LABEL_END, LABEL_START, ORIGIN, X_AXIS, X_LABEL_MARKER, Y_AXIS};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use std::fmt;

/// Narrowest canvas that renders anything
pub const MIN_WIDTH: usize = 2;
/// Shortest canvas that renders anything
pub const MIN_HEIGHT: usize = 4;

#[derive(Debug, Clone)]
pub struct Canvas {
    /// Color of the i-th series; series without an entry use `Color::Default`
    pub line_colors: Vec<Color>,
    pub label_color: Color,
    pub axis_color: Color,
    pub show_axis: bool,
    /// X axis labels; only the first and last are drawn
    pub horizontal_labels: Vec<String>,
    /// Expected samples per series. When non-zero the series are stretched
    /// across the plot width and longer series keep their newest samples.
    pub num_data_points: usize,

    width: usize,
    height: usize,
    /// Row-major cell grid, `None` for blank cells
    cells: Vec<Option<Cell>>,
    /// Columns taken by the Y axis labels and axis glyph
    gutter: usize,
    /// Rightmost column a series reached during the last fill
    max_x: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            line_colors: Vec::new(),
            label_color: Color::Default,
            axis_color: Color::Default,
            show_axis: true,
            horizontal_labels: Vec::new(),
            num_data_points: 0,
            width,
            height,
            cells: vec![None; width * height],
            gutter: 0,
            max_x: 0,
        }
    }

    /// A blank canvas of a new size carrying over every setting.
    pub fn resized(&self, width: usize, height: usize) -> Self {
        Self {
            line_colors: self.line_colors.clone(),
            label_color: self.label_color,
            axis_color: self.axis_color,
            show_axis: self.show_axis,
            horizontal_labels: self.horizontal_labels.clone(),
            num_data_points: self.num_data_points,
            ..Self::new(width, height)
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the last fill drew nothing
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells[row * self.width + col].as_ref()
    }

    /// Rasterize `data` into the grid, replacing whatever was drawn before.
    pub fn fill<S: AsRef<[f64]>>(&mut self, data: &[S]) {
        self.cells.clear();
        self.cells.resize(self.width * self.height, None);
        self.gutter = 0;
        self.max_x = 0;

        if data.is_empty() || self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return;
        }
        let Some((min, max)) = bounds(data) else {
            return;
        };
        // a flat plot still gets a unit range; the line sits on the bottom row
        let range = if max > min { max - min } else { 1.0 };

        let mut graph_height = self.height;
        if self.show_axis {
            graph_height -= 1;
            if !self.horizontal_labels.is_empty() {
                graph_height -= 1;
            }
            self.draw_y_axis(min, range, graph_height);
        }
        if self.gutter >= self.width {
            return;
        }

        let plot_width = (self.width - self.gutter) * 2;
        let sub_height = graph_height * 4;
        let scale = if self.num_data_points > 0 {
            plot_width.div_ceil(self.num_data_points)
        } else {
            1
        };

        for (i, series) in data.iter().enumerate() {
            let mut samples = series.as_ref();
            if self.num_data_points > 0 && samples.len() > self.num_data_points {
                samples = &samples[samples.len() - self.num_data_points..];
            } else if samples.len() > plot_width {
                samples = &samples[samples.len() - plot_width..];
            }
            if samples.is_empty() {
                continue;
            }

            let color = self.line_color(i);
            let gutter = self.gutter;
            let point = |j: usize, value: f64| {
                let level = ((value - min) / range * (sub_height - 1) as f64) as usize;
                let level = level.min(sub_height - 1);
                Point::new(
                    (gutter * 2 + j * scale) as i32,
                    (sub_height - 1 - level) as i32,
                )
            };

            let mut previous = point(0, samples[0]);
            if samples.len() == 1 {
                self.set_line(previous, previous, color);
            }
            for (j, &value) in samples.iter().enumerate().skip(1) {
                let current = point(j, value);
                self.set_line(previous, current, color);
                previous = current;
            }
        }

        if self.show_axis {
            self.draw_x_axis(graph_height);
        }
    }

    /// Fill and render in one go.
    pub fn plot<S: AsRef<[f64]>>(&mut self, data: &[S]) -> String {
        if data.is_empty() {
            return String::new();
        }
        self.fill(data);
        self.to_string()
    }

    fn draw_y_axis(&mut self, min: f64, range: f64, graph_height: usize) {
        let max_label = format!("{:.2}", min + range);
        let min_label = format!("{:.2}", min);
        let label_width = max_label.len().max(min_label.len());
        self.gutter = label_width + 1;

        let step = if graph_height > 1 {
            range / (graph_height - 1) as f64
        } else {
            0.0
        };
        for i in 0..graph_height {
            let row = graph_height - 1 - i;
            let label = format!("{:.2}", min + step * i as f64);
            let col = label_width.saturating_sub(label.len());
            self.set_text(row, col, self.label_color, &label);
            self.set_char(row, label_width, self.axis_color, Y_AXIS);
        }
    }

    fn draw_x_axis(&mut self, graph_height: usize) {
        let axis_row = graph_height;
        let label_row = graph_height + 1;
        let gutter = self.gutter;

        self.set_char(axis_row, gutter.saturating_sub(1), self.axis_color, ORIGIN);
        for col in gutter..self.width {
            self.set_char(axis_row, col, self.axis_color, X_AXIS);
        }

        let labels = &self.horizontal_labels;
        let room = self.width - gutter;
        let (Some(start), Some(end)) = (labels.first().cloned(), labels.last().cloned()) else {
            return;
        };
        if labels.len() > room {
            return;
        }

        self.set_char(axis_row, gutter, self.axis_color, X_LABEL_MARKER);
        self.set_char(label_row, gutter, self.axis_color, LABEL_START);
        self.set_text(label_row, gutter + 1, self.label_color, &start);

        let start_len = start.chars().count();
        let end_len = end.chars().count();
        let extent = self.max_x.saturating_sub(gutter);
        if extent >= start_len + end_len + 4 {
            let col = gutter + extent - end_len;
            self.set_text(label_row, col, self.label_color, &end);
            self.set_char(label_row, gutter + extent, self.axis_color, LABEL_END);
            self.set_char(axis_row, gutter + extent, self.axis_color, X_LABEL_MARKER);
        }
    }

    fn set_char(&mut self, row: usize, col: usize, color: Color, ch: char) {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col] = Some(Cell::text(ch, color));
        }
    }

    fn set_text(&mut self, row: usize, col: usize, color: Color, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.set_char(row, col + i, color, ch);
        }
    }

    fn set_line(&mut self, p0: Point, p1: Point, color: Color) {
        for pt in line(p0, p1) {
            if pt.x < 0 || pt.y < 0 {
                continue;
            }
            let (sub_col, sub_row) = (pt.x as usize, pt.y as usize);
            let (col, row) = (sub_col / 2, sub_row / 4);
            if col >= self.width || row >= self.height {
                continue;
            }
            self.max_x = self.max_x.max(col);
            let index = row * self.width + col;
            self.cells[index] = Some(Cell::with_dot(self.cells[index], sub_col, sub_row, color));
        }
    }

    fn line_color(&self, i: usize) -> Color {
        self.line_colors.get(i).copied().unwrap_or_default()
    }
}

/// Global (min, max) over every sample, `None` if there are no samples.
fn bounds<S: AsRef<[f64]>>(data: &[S]) -> Option<(f64, f64)> {
    data.iter()
        .flat_map(|series| series.as_ref().iter().copied())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Rows joined by newlines, no trailing newline; empty when nothing was drawn.
impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        for row in 0..self.height {
            for col in 0..self.width {
                match self.cell(col, row) {
                    Some(cell) => write!(f, "{}", cell)?,
                    None => f.write_str(" ")?,
                }
            }
            if row + 1 < self.height {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

impl Widget for &Canvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.height.min(area.height as usize);
        let cols = self.width.min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some(cell) = self.cell(col, row) {
                    buf.get_mut(area.x + col as u16, area.y + row as u16)
                        .set_char(cell.symbol())
                        .set_fg(cell.color.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(width: usize, height: usize) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        canvas.show_axis = false;
        canvas
    }

    #[test]
    fn test_degenerate_inputs_render_nothing() {
        let mut canvas = bare(10, 5);
        assert_eq!(canvas.plot::<Vec<f64>>(&[]), "");
        assert_eq!(canvas.plot(&[Vec::<f64>::new()]), "");

        let mut narrow = bare(1, 5);
        assert_eq!(narrow.plot(&[vec![1.0, 2.0]]), "");
        let mut short = bare(10, 3);
        assert_eq!(short.plot(&[vec![1.0, 2.0]]), "");
    }

    #[test]
    fn test_single_series_glyphs() {
        // 0 -> bottom sub-row, 1 -> top sub-row, one sub-column apart
        let mut canvas = bare(4, 4);
        canvas.fill(&[vec![0.0, 1.0]]);
        assert_eq!(canvas.cell(0, 0).map(Cell::symbol), Some('\u{284E}'));
        for row in 1..4 {
            assert_eq!(canvas.cell(0, row).map(Cell::symbol), Some('\u{2847}'));
        }
        assert!(canvas.cell(1, 0).is_none());
    }

    #[test]
    fn test_flat_series_draws_bottom_line() {
        let mut canvas = bare(3, 4);
        canvas.fill(&[vec![5.0, 5.0, 5.0]]);
        // bottom sub-row is dot row 3 in the last cell row: bits 0x40 | 0x80
        assert_eq!(canvas.cell(0, 3).map(Cell::symbol), Some('\u{28C0}'));
        assert_eq!(canvas.cell(1, 3).map(Cell::symbol), Some('\u{2840}'));
        assert!(canvas.cell(0, 0).is_none());
    }

    #[test]
    fn test_string_shape() {
        let mut canvas = bare(4, 4);
        let out = canvas.plot(&[vec![0.0, 1.0]]);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert!(!out.ends_with('\n'));
        assert_eq!(lines[0], "\u{284E}   ");
    }

    #[test]
    fn test_refill_replaces_previous_plot() {
        let mut canvas = bare(4, 4);
        canvas.fill(&[vec![0.0, 1.0]]);
        canvas.fill(&[vec![1.0, 1.0]]);
        assert!(canvas.cell(0, 0).is_none());
        assert!(canvas.cell(0, 3).is_some());
    }

    #[test]
    fn test_long_series_keeps_newest_samples() {
        let mut canvas = bare(2, 4);
        canvas.num_data_points = 2;
        // only [0, 1] survives truncation: a line rising over sub-columns 0..=2
        canvas.fill(&[vec![1.0, 1.0, 1.0, 0.0, 1.0]]);
        assert_eq!(canvas.cell(0, 0).map(Cell::symbol), Some('\u{28B0}'));
        assert_eq!(canvas.cell(1, 0).map(Cell::symbol), Some('\u{2801}'));
        assert_eq!(canvas.cell(0, 3).map(Cell::symbol), Some('\u{2847}'));
    }

    #[test]
    fn test_scale_stretches_to_width() {
        let mut canvas = bare(4, 4);
        canvas.num_data_points = 2;
        // scale = ceil(8 / 2) = 4: second sample lands at sub-column 4
        canvas.fill(&[vec![1.0, 1.0]]);
        assert!(canvas.cell(2, 3).is_some());
        assert!(canvas.cell(3, 3).is_none());
    }

    #[test]
    fn test_missing_line_color_is_default() {
        let mut canvas = bare(4, 4);
        canvas.line_colors = vec![Color::Indexed(1)];
        canvas.fill(&[vec![0.0, 0.0], vec![1.0, 1.0]]);
        assert_eq!(canvas.cell(0, 3).map(|c| c.color), Some(Color::Indexed(1)));
        assert_eq!(canvas.cell(0, 0).map(|c| c.color), Some(Color::Default));
    }

    #[test]
    fn test_widget_matches_cells() {
        let mut canvas = bare(4, 4);
        canvas.line_colors = vec![Color::Indexed(14)];
        canvas.fill(&[vec![0.0, 1.0]]);
        let area = Rect::new(0, 0, 4, 4);
        let mut buf = Buffer::empty(area);
        (&canvas).render(area, &mut buf);
        let cell = buf.get(0, 0);
        assert_eq!(cell.symbol(), "\u{284E}");
        assert_eq!(cell.fg, ratatui::style::Color::Indexed(14));
        assert_eq!(buf.get(3, 0).symbol(), " ");
    }

    #[test]
    fn test_resized_keeps_settings() {
        let mut canvas = Canvas::new(4, 4);
        canvas.num_data_points = 10;
        canvas.show_axis = false;
        canvas.line_colors = vec![Color::Indexed(3)];
        let resized = canvas.resized(20, 8);
        assert_eq!((resized.width(), resized.height()), (20, 8));
        assert_eq!(resized.num_data_points, 10);
        assert!(!resized.show_axis);
        assert_eq!(resized.line_colors, vec![Color::Indexed(3)]);
    }
}
