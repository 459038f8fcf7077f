//! Canvas rendering tests
//!
//! Golden outputs for the braille plot, with and without axes.

use topk_tui::canvas::{Canvas, Color, RESET};

fn bare(width: usize, height: usize) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    canvas.show_axis = false;
    canvas
}

/// Two crossing series share cells; the dots merge and the later series
/// colors the cell.
#[test]
fn test_crossing_series_merge() {
    let mut canvas = bare(4, 4);
    canvas.line_colors = vec![Color::Indexed(9), Color::Indexed(12)];
    canvas.fill(&[vec![0.0, 1.0], vec![1.0, 0.0]]);

    let top = canvas.cell(0, 0).expect("top-left drawn");
    assert_eq!(top.symbol(), '\u{284F}');
    assert_eq!(top.color, Color::Indexed(12));

    let bottom = canvas.cell(0, 3).expect("bottom-left drawn");
    assert_eq!(bottom.symbol(), '\u{28C7}');
    assert!(canvas.cell(1, 0).is_none());

    let rendered = canvas.to_string();
    let first_line = rendered.lines().next().expect("four rows");
    assert_eq!(first_line, format!("\x1b[38;5;12m\u{284F}{}   ", RESET));
}

#[test]
fn test_y_axis_labels_and_x_axis() {
    let mut canvas = Canvas::new(12, 5);
    canvas.fill(&[vec![0.0, 2.0]]);
    let rendered = canvas.to_string();
    let rows: Vec<&str> = rendered.lines().collect();

    assert_eq!(rows.len(), 5);
    assert!(rows[0].starts_with("2.00┤"), "{:?}", rows[0]);
    assert!(rows[1].starts_with("1.33┤"), "{:?}", rows[1]);
    assert!(rows[2].starts_with("0.67┤"), "{:?}", rows[2]);
    assert!(rows[3].starts_with("0.00┤"), "{:?}", rows[3]);
    assert_eq!(rows[4], "    ╰───────");
}

#[test]
fn test_horizontal_labels() {
    let mut canvas = Canvas::new(30, 6);
    canvas.horizontal_labels = vec!["start".into(), "end".into()];
    canvas.fill(&[vec![1.0; 50]]);
    let rendered = canvas.to_string();
    let last = rendered.lines().last().expect("label row");

    assert!(last.starts_with("     └start"), "{:?}", last);
    assert!(last.ends_with("end┘"), "{:?}", last);
    let axis = rendered.lines().nth(4).expect("axis row");
    assert!(axis.starts_with("    ╰┬"), "{:?}", axis);
    assert!(axis.ends_with('┬'), "{:?}", axis);
}

#[test]
fn test_rendering_is_idempotent() {
    let mut canvas = Canvas::new(20, 6);
    canvas.line_colors = vec![Color::Indexed(14)];
    canvas.fill(&[vec![3.0, 1.0, 4.0, 1.0, 5.0]]);
    assert_eq!(canvas.to_string(), canvas.to_string());

    let again = canvas.plot(&[vec![3.0, 1.0, 4.0, 1.0, 5.0]]);
    assert_eq!(again, canvas.to_string());
}

#[test]
fn test_empty_input_renders_nothing() {
    let mut canvas = Canvas::new(20, 6);
    assert_eq!(canvas.plot(&Vec::<Vec<f64>>::new()), "");
    let mut tiny = Canvas::new(1, 1);
    assert_eq!(tiny.plot(&[vec![1.0, 2.0]]), "");
}
