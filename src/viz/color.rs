//! Color helpers for point rendering.

/// Speed at which the result ramp saturates to red [m/s].
pub const MAX_REFERENCE_SPEED: f64 = 5.0;

/// Hue of the slowest particles (blue).
pub const SLOW_HUE: f64 = 0.7;

/// Single preview color, `#44aaff`.
pub const PREVIEW_COLOR: [f32; 3] = [0x44 as f32 / 255.0, 0xaa as f32 / 255.0, 1.0];

/// Map a speed onto the blue-to-red ramp, in turns (`0.0..=0.7`).
pub fn speed_hue(speed: f64, max_speed: f64) -> f64 {
    let t = if max_speed > 0.0 && speed.is_finite() {
        (speed / max_speed).clamp(0.0, 1.0)
    } else {
        1.0
    };
    (1.0 - t) * SLOW_HUE
}

/// HSL to linear RGB; `h` in turns, `s` and `l` in `0..=1`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f32; 3] {
    let h = h.rem_euclid(1.0) * 6.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if h < 1.0 {
        (c, x, 0.0)
    } else if h < 2.0 {
        (x, c, 0.0)
    } else if h < 3.0 {
        (0.0, c, x)
    } else if h < 4.0 {
        (0.0, x, c)
    } else if h < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [(r + m) as f32, (g + m) as f32, (b + m) as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(speed_hue(0.0, MAX_REFERENCE_SPEED), 0.7);
        assert_eq!(speed_hue(MAX_REFERENCE_SPEED, MAX_REFERENCE_SPEED), 0.0);
        assert_eq!(speed_hue(50.0, MAX_REFERENCE_SPEED), 0.0);
        assert!((speed_hue(2.5, MAX_REFERENCE_SPEED) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]);
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5)[1], 1.0);
        assert_eq!(hsl_to_rgb(0.5, 0.0, 0.5), [0.5, 0.5, 0.5]);
    }
}
