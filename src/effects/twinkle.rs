use rand::Rng;

use crate::color::{rgb_to_wheel, wheel, Rgb, BLACK};
use crate::effects::LightingEffect;
use crate::lampstate::LampState;

const HUE_SPREAD: i8 = 15;

/// Lights up or puts out one random pixel per frame, in hues scattered
/// around the target color. Untouched pixels keep whatever they showed.
pub struct Twinkle<R: Rng> {
    pixel_count: usize,
    rng: R,
}

impl<R: Rng> Twinkle<R> {
    pub fn new(pixel_count: usize, rng: R) -> Twinkle<R> {
        Twinkle { pixel_count, rng }
    }
}

impl<R: Rng> LightingEffect for Twinkle<R> {
    fn reset(&mut self) {}

    fn step(&mut self, state: &LampState) -> Vec<(usize, Rgb)> {
        if self.pixel_count == 0 {
            return vec![];
        }

        let pixel = self.rng.gen_range(0..self.pixel_count);
        let spread = self.rng.gen_range(-HUE_SPREAD..=HUE_SPREAD);
        let hue = rgb_to_wheel(state.target_color()).wrapping_add_signed(spread);

        if self.rng.gen_bool(0.5) {
            vec![(pixel, wheel(hue))]
        } else {
            vec![(pixel, BLACK)]
        }
    }
}
