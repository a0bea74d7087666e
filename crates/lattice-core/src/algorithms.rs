//! Cell-walking primitives used by the spatial queries.
//!
//! All visitors work in unwrapped grid coordinates; callers decide how to
//! treat positions that fall outside the grid.

use crate::math::{Position, Size};

/// Walks cells from `start` toward `end`, one axis step at a time, calling
/// `pred` on each visited cell after `start`. Stops on the first cell for
/// which `pred` returns `true` and returns that result.
pub fn ray_cast_line<F>(start: Position, end: Position, mut pred: F) -> bool
where
    F: FnMut(Position) -> bool,
{
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let step_x = if dx < 0 { -1 } else { 1 };
    let step_y = if dy < 0 { -1 } else { 1 };
    let abs_dx = dx.abs();
    let abs_dy = dy.abs();
    let mut error = abs_dx - abs_dy;
    let mut pos = start;
    while pos != end {
        if error < 0 {
            pos.y += step_y;
            error += 2 * abs_dx;
        } else {
            pos.x += step_x;
            error -= 2 * abs_dy;
        }
        if pred(pos) {
            return true;
        }
    }
    false
}

/// Visits every cell of the inclusive rectangle spanned by `corner0` and
/// `corner1`, row by row.
pub fn visit_rectangle<F>(corner0: Position, corner1: Position, mut visit: F)
where
    F: FnMut(Position),
{
    let (x0, x1) = (corner0.x.min(corner1.x), corner0.x.max(corner1.x));
    let (y0, y1) = (corner0.y.min(corner1.y), corner0.y.max(corner1.y));
    for y in y0..=y1 {
        for x in x0..=x1 {
            visit(Position::new(x, y));
        }
    }
}

/// Like [`visit_rectangle`] but clipped to `0..size`.
pub fn visit_rectangle_clamped<F>(corner0: Position, corner1: Position, size: Size, visit: F)
where
    F: FnMut(Position),
{
    if size.width <= 0 || size.height <= 0 {
        return;
    }
    let x0 = corner0.x.min(corner1.x).max(0);
    let x1 = corner0.x.max(corner1.x).min(size.width - 1);
    let y0 = corner0.y.min(corner1.y).max(0);
    let y1 = corner0.y.max(corner1.y).min(size.height - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }
    visit_rectangle(Position::new(x0, y0), Position::new(x1, y1), visit);
}

/// Visits every cell within Euclidean radius `radius` of `center` exactly
/// once, using the midpoint circle algorithm to size each scan line.
pub fn visit_disc<F>(center: Position, radius: i32, mut visit: F)
where
    F: FnMut(Position),
{
    if radius < 0 {
        return;
    }
    let mut visit_line = |x0: i32, x1: i32, y: i32| {
        for x in x0..=x1 {
            visit(Position::new(center.x + x, center.y + y));
        }
    };

    let mut delta_error_y = 1 - 2 * radius;
    let mut delta_error_x = 1;
    let mut error = 0;
    let mut x = 0;
    let mut y = radius;
    while x <= y {
        visit_line(-y, y, x);
        if x > 0 {
            visit_line(-y, y, -x);
        }
        error += delta_error_x;
        delta_error_x += 2;
        if error > 0 {
            if x != y {
                visit_line(-x, x, y);
                visit_line(-x, x, -y);
            }
            y -= 1;
            error += delta_error_y;
            delta_error_y += 2;
        }
        x += 1;
    }
}

/// Visits every cell within Manhattan distance `radius` of `center`.
pub fn visit_diamond<F>(center: Position, radius: i32, mut visit: F)
where
    F: FnMut(Position),
{
    if radius < 0 {
        return;
    }
    let mut visit_line = |half: i32, y: i32| {
        for x in -half..=half {
            visit(Position::new(center.x + x, center.y + y));
        }
    };
    for y in -radius..0 {
        visit_line(radius + y, y);
    }
    for y in 0..=radius {
        visit_line(radius - y, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn collect<F: FnOnce(&mut dyn FnMut(Position))>(f: F) -> Vec<Position> {
        let mut out = Vec::new();
        f(&mut |p| out.push(p));
        out
    }

    #[test]
    fn test_ray_cast_line_horizontal() {
        let mut visited = Vec::new();
        let hit = ray_cast_line(Position::new(0, 5), Position::new(3, 5), |p| {
            visited.push(p);
            false
        });
        assert!(!hit);
        assert_eq!(
            visited,
            vec![
                Position::new(1, 5),
                Position::new(2, 5),
                Position::new(3, 5)
            ]
        );
    }

    #[test]
    fn test_ray_cast_line_stops_on_predicate() {
        let mut visited = 0;
        let hit = ray_cast_line(Position::new(0, 0), Position::new(0, -10), |p| {
            visited += 1;
            p.y == -4
        });
        assert!(hit);
        assert_eq!(visited, 4);
    }

    #[test]
    fn test_ray_cast_line_diagonal_reaches_end() {
        let mut last = Position::new(0, 0);
        ray_cast_line(Position::new(0, 0), Position::new(3, -2), |p| {
            assert_eq!(p.manhattan_distance(&last), 1);
            last = p;
            false
        });
        assert_eq!(last, Position::new(3, -2));
    }

    #[test]
    fn test_visit_rectangle_clamped() {
        let cells = collect(|v| {
            visit_rectangle_clamped(Position::new(-2, -2), Position::new(1, 0), Size::new(4, 4), v)
        });
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], Position::new(0, 0));
        assert_eq!(cells[1], Position::new(1, 0));
    }

    #[test]
    fn test_visit_disc_radius_one_is_plus_shape() {
        let cells: HashSet<Position> = collect(|v| visit_disc(Position::new(0, 0), 1, v))
            .into_iter()
            .collect();
        let expected: HashSet<Position> = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(|(x, y)| Position::new(x, y))
            .collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_visit_disc_visits_each_cell_once() {
        for radius in 0..8 {
            let cells = collect(|v| visit_disc(Position::new(3, -2), radius, v));
            let unique: HashSet<Position> = cells.iter().copied().collect();
            assert_eq!(unique.len(), cells.len(), "radius {}", radius);
            assert!(unique.contains(&Position::new(3 + radius, -2)));
            assert!(unique.contains(&Position::new(3, -2 - radius)));
        }
    }

    #[test]
    fn test_visit_diamond() {
        let cells = collect(|v| visit_diamond(Position::new(0, 0), 2, v));
        assert_eq!(cells.len(), 13);
        assert!(cells.iter().all(|p| p.manhattan_distance(&Position::new(0, 0)) <= 2));
    }
}
