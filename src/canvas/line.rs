//! Integer line rasterization on the sub-pixel grid

/// A sub-pixel coordinate: x grows rightwards, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rasterize the segment between `p0` and `p1`.
///
/// The walk always runs left to right. Each column covers the rows from its
/// own interpolated y up to (excluding) the next column's y, and the right
/// endpoint is always emitted, so consecutive segments sharing an endpoint
/// join without gaps.
pub fn line(p0: Point, p1: Point) -> Vec<Point> {
    let (left, right) = if p0.x <= p1.x { (p0, p1) } else { (p1, p0) };
    let dx = right.x - left.x;
    let dy = (right.y - left.y).abs();
    let step = if right.y < left.y { -1 } else { 1 };

    let mut points = Vec::with_capacity((dx + dy + 1) as usize);
    if dx == 0 {
        let mut y = left.y;
        while y != right.y {
            points.push(Point::new(left.x, y));
            y += step;
        }
        points.push(right);
        return points;
    }

    // y offset reached after `i` columns, truncated toward the left endpoint
    let offset = |i: i32| step * ((dy as i64 * i as i64 / dx as i64) as i32);
    for i in 0..dx {
        let x = left.x + i;
        let from = left.y + offset(i);
        let to = left.y + offset(i + 1);
        points.push(Point::new(x, from));
        let mut y = from + step;
        while y != to && from != to {
            points.push(Point::new(x, y));
            y += step;
        }
    }
    points.push(right);
    points
}
