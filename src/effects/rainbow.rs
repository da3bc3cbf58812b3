use crate::color::{wheel, Rgb};
use crate::effects::LightingEffect;
use crate::lampstate::LampState;

/// Spreads the whole hue wheel over the strip and rotates it by one wheel
/// position per frame.
pub struct Rainbow {
    pixel_count: usize,
    offset: u8,
}

impl Rainbow {
    pub fn new(pixel_count: usize) -> Rainbow {
        Rainbow {
            pixel_count,
            offset: 0,
        }
    }
}

impl LightingEffect for Rainbow {
    fn reset(&mut self) {
        self.offset = 0;
    }

    fn step(&mut self, _: &LampState) -> Vec<(usize, Rgb)> {
        let step = 256 / self.pixel_count.max(1);
        let frame = (0..self.pixel_count)
            .map(|i| {
                let position = (i * step + self.offset as usize) % 256;
                (i, wheel(position as u8))
            })
            .collect();

        self.offset = self.offset.wrapping_add(1);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_wheel_over_strip() {
        let state = LampState::new(2, 2);
        let mut rainbow = Rainbow::new(4);

        let frame = rainbow.step(&state);
        let expected: Vec<_> = [0u8, 64, 128, 192]
            .iter()
            .enumerate()
            .map(|(i, &position)| (i, wheel(position)))
            .collect();
        assert_eq!(frame, expected);
    }

    #[test]
    fn offset_advances_and_wraps() {
        let state = LampState::new(2, 2);
        let mut rainbow = Rainbow::new(1);

        for expected in 0..=255u8 {
            assert_eq!(rainbow.step(&state), vec![(0, wheel(expected))]);
        }
        assert_eq!(rainbow.step(&state), vec![(0, wheel(0))]);
    }

    #[test]
    fn reset_rewinds_offset() {
        let state = LampState::new(2, 2);
        let mut rainbow = Rainbow::new(3);
        let first = rainbow.step(&state);
        rainbow.step(&state);

        rainbow.reset();
        assert_eq!(rainbow.step(&state), first);
    }
}
