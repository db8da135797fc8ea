//! Point-cloud geometry for both render modes.

use bytemuck::{Pod, Zeroable};

use super::color::{hsl_to_rgb, speed_hue, PREVIEW_COLOR};
use crate::config::{ModelScale, Resolution};
use crate::snapshot::ResultSnapshot;

/// Upper bound on preview points. A spacing far below the box size would
/// otherwise ask for more points than can be allocated.
pub const MAX_PREVIEW_POINTS: usize = 1 << 20;

/// Lattice points per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LatticeDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl LatticeDims {
    pub fn count(&self) -> usize {
        self.nx.saturating_mul(self.ny).saturating_mul(self.nz)
    }
}

/// `max(2, floor(size / spacing))`, so an axis never collapses to one point.
/// A single axis never exceeds [`MAX_PREVIEW_POINTS`].
pub(crate) fn axis_count(size: f64, spacing: f64) -> usize {
    let n = (size / spacing).floor();
    if n.is_finite() && n > 2.0 {
        n.min(MAX_PREVIEW_POINTS as f64) as usize
    } else {
        2
    }
}

/// Lattice size for a box, thinned to at most [`MAX_PREVIEW_POINTS`].
pub fn lattice_dims(scale: &ModelScale, resolution: &Resolution) -> LatticeDims {
    let dims = LatticeDims {
        nx: axis_count(scale.length, resolution.dx),
        ny: axis_count(scale.width, resolution.dy),
        nz: axis_count(scale.height, resolution.dz),
    };
    if dims.count() <= MAX_PREVIEW_POINTS {
        return dims;
    }

    // Same factor on every axis keeps the lattice proportions.
    let total = dims.nx as f64 * dims.ny as f64 * dims.nz as f64;
    let factor = (MAX_PREVIEW_POINTS as f64 / total).cbrt();
    let mut n = [dims.nx, dims.ny, dims.nz];
    for axis in &mut n {
        *axis = ((*axis as f64 * factor).floor() as usize).max(2);
    }

    // Axes held at two can leave the product over the limit; shrink the
    // longest until it fits.
    while n[0].saturating_mul(n[1]).saturating_mul(n[2]) > MAX_PREVIEW_POINTS {
        let longest = (0..3).max_by_key(|&i| n[i]).unwrap_or(0);
        let others: usize = (0..3).filter(|&i| i != longest).map(|i| n[i]).product();
        n[longest] = (MAX_PREVIEW_POINTS / others).max(2);
    }

    log::debug!(
        "Preview lattice {}x{}x{} thinned to {}x{}x{}",
        dims.nx, dims.ny, dims.nz, n[0], n[1], n[2]
    );
    LatticeDims {
        nx: n[0],
        ny: n[1],
        nz: n[2],
    }
}

/// One point as uploaded to the instance buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// CPU-side point geometry, rebuilt wholesale and never edited in place.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    pub points: Vec<PointInstance>,
    /// World-space billboard size.
    pub point_size: f32,
}

impl PointCloud {
    /// Regular preview lattice centered on the origin and spanning the box.
    pub fn lattice(scale: &ModelScale, resolution: &Resolution) -> Self {
        let dims = lattice_dims(scale, resolution);
        let color = PREVIEW_COLOR;
        let coord = |i: usize, n: usize, size: f64| ((i as f64 / (n - 1) as f64 - 0.5) * size) as f32;

        let mut points = Vec::with_capacity(dims.count());
        for i in 0..dims.nx {
            for j in 0..dims.ny {
                for k in 0..dims.nz {
                    points.push(PointInstance {
                        position: [
                            coord(i, dims.nx, scale.length),
                            coord(j, dims.ny, scale.width),
                            coord(k, dims.nz, scale.height),
                        ],
                        color,
                    });
                }
            }
        }

        Self {
            points,
            point_size: point_size(resolution),
        }
    }

    /// One point per particle record, colored by speed.
    pub fn from_snapshot(snapshot: &ResultSnapshot, resolution: &Resolution, max_speed: f64) -> Self {
        let points = snapshot
            .particles
            .iter()
            .map(|p| {
                let [x, y, z] = p.position;
                PointInstance {
                    position: [x as f32, y as f32, z as f32],
                    color: hsl_to_rgb(speed_hue(p.speed(), max_speed), 1.0, 0.5),
                }
            })
            .collect();

        Self {
            points,
            point_size: point_size(resolution),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Center of the axis-aligned bounds, or the origin when empty.
    pub fn center(&self) -> [f32; 3] {
        let Some(first) = self.points.first() else {
            return [0.0; 3];
        };
        let (mut lo, mut hi) = (first.position, first.position);
        for p in &self.points[1..] {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p.position[axis]);
                hi[axis] = hi[axis].max(p.position[axis]);
            }
        }
        [
            (lo[0] + hi[0]) * 0.5,
            (lo[1] + hi[1]) * 0.5,
            (lo[2] + hi[2]) * 0.5,
        ]
    }
}

fn point_size(resolution: &Resolution) -> f32 {
    (resolution.min_spacing() * 0.2) as f32
}
