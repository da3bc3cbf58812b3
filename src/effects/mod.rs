pub(crate) mod cycle;
pub(crate) mod pulse;
pub(crate) mod rainbow;
pub(crate) mod twinkle;

use crate::color::Rgb;
use crate::lampstate::LampState;

/// A procedural animation that produces one frame per tick while its mode
/// is active.
pub trait LightingEffect {
    /// Drops all motion state. Called whenever the effect's mode is entered.
    fn reset(&mut self);

    /// Returns the pixels that change in this frame.
    fn step(&mut self, state: &LampState) -> Vec<(usize, Rgb)>;
}
