//! Reference frame drawn under and around the particles.
//!
//! A square floor grid sized to the box length, laid in the XZ plane at the
//! bottom of the box, plus the twelve edges of the box itself. Lines are
//! stored as endpoint pairs of `[x, y, z, 1.0]`, the layout the line shader
//! reads from its storage buffer.

use super::lattice::axis_count;
use crate::config::{ModelScale, Resolution};

/// Floor grid lines per direction never exceed this many cells.
pub const MAX_GRID_DIVISIONS: usize = 256;

/// Floor grid and box outline for one configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceFrame {
    /// Endpoint pairs, `2 * line_count()` entries.
    pub lines: Vec<[f32; 4]>,
    pub divisions: usize,
}

impl ReferenceFrame {
    pub fn new(scale: &ModelScale, resolution: &Resolution) -> Self {
        let divisions = axis_count(scale.length, resolution.dx).min(MAX_GRID_DIVISIONS);
        let mut lines = Vec::new();
        push_floor(&mut lines, scale, divisions);
        push_box(&mut lines, scale);
        Self { lines, divisions }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len() / 2
    }
}

fn push_floor(lines: &mut Vec<[f32; 4]>, scale: &ModelScale, divisions: usize) {
    let size = scale.length as f32;
    let half = size / 2.0;
    let floor = -(scale.width as f32) / 2.0;
    let step = size / divisions as f32;

    // Lines parallel to X
    for i in 0..=divisions {
        let z = -half + i as f32 * step;
        lines.push([-half, floor, z, 1.0]);
        lines.push([half, floor, z, 1.0]);
    }

    // Lines parallel to Z
    for i in 0..=divisions {
        let x = -half + i as f32 * step;
        lines.push([x, floor, -half, 1.0]);
        lines.push([x, floor, half, 1.0]);
    }
}

fn push_box(lines: &mut Vec<[f32; 4]>, scale: &ModelScale) {
    let hx = scale.length as f32 / 2.0;
    let hy = scale.width as f32 / 2.0;
    let hz = scale.height as f32 / 2.0;
    let corner = |i: usize| {
        [
            if i & 1 == 0 { -hx } else { hx },
            if i & 2 == 0 { -hy } else { hy },
            if i & 4 == 0 { -hz } else { hz },
            1.0,
        ]
    };

    // Corners that differ in exactly one bit share an edge.
    for a in 0..8usize {
        for bit in [1, 2, 4] {
            let b = a | bit;
            if b != a {
                lines.push(corner(a));
                lines.push(corner(b));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_counts() {
        let scale = ModelScale {
            length: 1.0,
            width: 1.0,
            height: 1.0,
        };
        let res = Resolution {
            dx: 0.25,
            dy: 0.25,
            dz: 0.25,
        };
        let frame = ReferenceFrame::new(&scale, &res);
        assert_eq!(frame.divisions, 4);
        // 2 * (4 + 1) floor lines + 12 box edges
        assert_eq!(frame.line_count(), 10 + 12);
    }

    #[test]
    fn test_floor_sits_at_box_bottom() {
        let scale = ModelScale {
            length: 2.0,
            width: 0.6,
            height: 1.0,
        };
        let res = Resolution {
            dx: 5.0,
            dy: 5.0,
            dz: 5.0,
        };
        let frame = ReferenceFrame::new(&scale, &res);
        assert_eq!(frame.divisions, 2);
        let floor_lines = 2 * (frame.divisions + 1);
        assert!(frame.lines[..floor_lines * 2]
            .iter()
            .all(|p| (p[1] + 0.3).abs() < 1e-6));
    }

    #[test]
    fn test_divisions_capped_for_tiny_spacing() {
        let scale = ModelScale {
            length: 0.5,
            width: 0.5,
            height: 0.5,
        };
        let res = Resolution {
            dx: 1e-7,
            dy: 1e-7,
            dz: 1e-7,
        };
        let frame = ReferenceFrame::new(&scale, &res);
        assert_eq!(frame.divisions, MAX_GRID_DIVISIONS);
        assert_eq!(frame.line_count(), 2 * (MAX_GRID_DIVISIONS + 1) + 12);
    }
}
