use std::f64::consts::PI;

use anyhow::{Context, ensure};

use crate::event_model::slot::MAX_TOUCH;

pub const DEFAULT_DIAMETER: u32 = 200;

/// Alpha byte baked into every drawn pixel.
pub const ALPHA: u32 = 0xF800_0000;

/// Red, green, blue, white.
pub const DEFAULT_COLORS: [u32; MAX_TOUCH] = [0xFF0000, 0x00FF00, 0x0000FF, 0xFFFFFF];

/// Minimum number of angular samples swept per disc.
const MIN_ANGLE_STEPS: u32 = 720;

/// A square sprite holding one filled disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    diameter: u32,
    color: u32,
    pixels: Vec<u32>,
}

impl Shape {
    /// Rasterizes a disc of `diameter` pixels in `rgb`.
    ///
    /// Each angular sample fills the row span between the two points of the
    /// circle at that height. Pixels outside the disc stay zero.
    pub fn disc(diameter: u32, rgb: u32) -> anyhow::Result<Self> {
        ensure!(diameter > 0, "disc diameter must be positive");
        let size = diameter as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(size * size)
            .with_context(|| format!("allocate {diameter}x{diameter} sprite"))?;
        pixels.resize(size * size, 0);

        let color = (rgb & 0x00FF_FFFF) | ALPHA;
        let center = f64::from(diameter / 2);
        let steps = angle_steps(diameter);
        let step = 360.0 / f64::from(steps);

        for i in 0..steps {
            let deg = f64::from(i) * step;
            let y = (center + center * deg.to_radians().sin()) as i64;
            let x1 = (center + center * deg.to_radians().cos()) as i64;
            let x2 = (center + center * (deg + 180.0).to_radians().cos()) as i64;
            if !(0..size as i64).contains(&y) {
                continue;
            }
            let row = y as usize * size;
            let (from, to) = (x2.max(0), x1.min(size as i64));
            for x in from..to {
                pixels[row + x as usize] = color;
            }
        }

        Ok(Self {
            diameter,
            color,
            pixels,
        })
    }

    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    /// The drawn color, alpha included.
    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn row(&self, y: u32) -> &[u32] {
        let size = self.diameter as usize;
        let start = y as usize * size;
        &self.pixels[start..start + size]
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.row(y)[x as usize]
    }
}

/// Enough samples that consecutive ones never skip a row.
fn angle_steps(diameter: u32) -> u32 {
    let needed = (PI * f64::from(diameter)).ceil() as u32 + 1;
    needed.max(MIN_ANGLE_STEPS)
}

/// One disc per slot, slot `i` drawn in `colors[i]`.
pub fn create_discs(diameter: u32, colors: &[u32; MAX_TOUCH]) -> anyhow::Result<Vec<Shape>> {
    colors
        .iter()
        .enumerate()
        .map(|(slot, &rgb)| {
            Shape::disc(diameter, rgb).with_context(|| format!("create disc for slot {slot}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(x: u32, y: u32, center: f64) -> f64 {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn default_disc_is_filled_and_round() {
        let shape = Shape::disc(DEFAULT_DIAMETER, 0xFF0000).unwrap();
        let center = f64::from(DEFAULT_DIAMETER / 2);
        let radius = center;
        for y in 0..DEFAULT_DIAMETER {
            for x in 0..DEFAULT_DIAMETER {
                let d = distance(x, y, center);
                let p = shape.pixel(x, y);
                if d <= radius - 3.0 {
                    assert_eq!(p, 0xF8FF0000, "hole at ({x}, {y})");
                } else if d >= radius + 2.0 {
                    assert_eq!(p, 0, "spill at ({x}, {y})");
                } else {
                    assert!(p == 0 || p == 0xF8FF0000);
                }
            }
        }
    }

    #[test]
    fn corners_are_transparent() {
        let shape = Shape::disc(64, 0x00FF00).unwrap();
        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert_eq!(shape.pixel(x, y), 0);
        }
        assert_eq!(shape.pixel(32, 32), 0xF800FF00);
    }

    #[test]
    fn alpha_is_forced() {
        let shape = Shape::disc(16, 0x1234_5678).unwrap();
        assert_eq!(shape.color(), 0xF834_5678);
    }

    #[test]
    fn large_discs_have_no_row_gaps() {
        let diameter = 1000;
        let shape = Shape::disc(diameter, 0x0000FF).unwrap();
        let c = diameter / 2;
        for y in 3..diameter - 3 {
            assert_ne!(shape.pixel(c, y), 0, "row {y} is empty");
        }
    }

    #[test]
    fn one_distinct_disc_per_slot() {
        let shapes = create_discs(40, &DEFAULT_COLORS).unwrap();
        assert_eq!(shapes.len(), MAX_TOUCH);
        let colors: Vec<u32> = shapes.iter().map(Shape::color).collect();
        assert_eq!(colors, vec![0xF8FF0000, 0xF800FF00, 0xF80000FF, 0xF8FFFFFF]);
    }

    #[test]
    fn zero_diameter_is_rejected() {
        assert!(Shape::disc(0, 0xFF0000).is_err());
    }
}
