use crate::color::{wheel, Rgb};
use crate::effects::LightingEffect;
use crate::lampstate::LampState;

/// Walks the whole strip around the hue wheel in unison.
pub struct Cycle {
    pixel_count: usize,
    position: u8,
}

impl Cycle {
    pub fn new(pixel_count: usize) -> Cycle {
        Cycle {
            pixel_count,
            position: 0,
        }
    }
}

impl LightingEffect for Cycle {
    fn reset(&mut self) {
        self.position = 0;
    }

    fn step(&mut self, _: &LampState) -> Vec<(usize, Rgb)> {
        let color = wheel(self.position);
        self.position = self.position.wrapping_add(1);
        (0..self.pixel_count).map(|i| (i, color)).collect()
    }
}
