use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::Rgb;
use crate::config::TimingConfig;
use crate::effects::cycle::Cycle;
use crate::effects::pulse::BrightnessPulse;
use crate::effects::rainbow::Rainbow;
use crate::effects::twinkle::Twinkle;
use crate::effects::LightingEffect;
use crate::intervaltimer::IntervalTimer;
use crate::lampstate::{LampState, Mode};
use crate::sink::PixelSink;

struct Timers {
    frame: IntervalTimer,
    brightness: IntervalTimer,
    twinkle: IntervalTimer,
    rainbow: IntervalTimer,
    cycle: IntervalTimer,
}

/// Runs at most one unit of work per timer and poll, and only for the mode
/// that is active. Never blocks.
pub struct Scheduler {
    timers: Timers,
    twinkle: Twinkle<StdRng>,
    rainbow: Rainbow,
    cycle: Cycle,
    pulse: BrightnessPulse,
}

impl Scheduler {
    pub fn new(
        timing: &TimingConfig,
        pixel_count: usize,
        pulse: BrightnessPulse,
        rng: StdRng,
    ) -> Scheduler {
        Scheduler {
            timers: Timers {
                frame: IntervalTimer::new(timing.frame_ms),
                brightness: IntervalTimer::new(timing.brightness_ms),
                twinkle: IntervalTimer::new(timing.twinkle_ms),
                rainbow: IntervalTimer::new(timing.rainbow_ms),
                cycle: IntervalTimer::new(timing.cycle_ms),
            },
            twinkle: Twinkle::new(pixel_count, rng),
            rainbow: Rainbow::new(pixel_count),
            cycle: Cycle::new(pixel_count),
            pulse,
        }
    }

    pub fn with_entropy(timing: &TimingConfig, pixel_count: usize, pulse: BrightnessPulse) -> Self {
        Scheduler::new(timing, pixel_count, pulse, StdRng::from_entropy())
    }

    /// Resets the motion state of the effect behind `mode`.
    pub fn enter_mode(&mut self, mode: Mode) {
        if let Some(effect) = self.effect_mut(mode) {
            effect.reset();
        }
    }

    /// Makes the next brightness tick write to the sink even if nothing
    /// changed, e.g. after the output was blanked.
    pub fn refresh_brightness(&mut self) {
        self.pulse.invalidate();
    }

    pub fn poll(&mut self, now: u64, state: &mut LampState, sink: &mut impl PixelSink) {
        let mode = state.mode();

        if self.timers.frame.elapsed(now) && mode == Mode::Color {
            Scheduler::step_color(state, sink);
        }

        if self.timers.brightness.elapsed(now) {
            self.step_brightness(state, sink);
        }

        let twinkle_due = self.timers.twinkle.elapsed(now);
        let rainbow_due = self.timers.rainbow.elapsed(now);
        let cycle_due = self.timers.cycle.elapsed(now);
        let effect_due = match mode {
            Mode::Color => false,
            Mode::Twinkle => twinkle_due,
            Mode::Rainbow => rainbow_due,
            Mode::CyclePalette => cycle_due,
        };

        if effect_due && !state.standby() {
            if let Some(effect) = self.effect_mut(mode) {
                let pixels = effect.step(state);
                Scheduler::show(sink, &pixels);
            }
        }
    }

    fn step_color(state: &mut LampState, sink: &mut impl PixelSink) {
        if state.standby() {
            return;
        }

        let color = if state.pulsing() {
            Some(state.next_pulse_step())
        } else {
            state.next_fade_step()
        };

        if let Some(color) = color {
            sink.fill(color);
            Scheduler::commit(sink);
        }
    }

    fn step_brightness(&mut self, state: &LampState, sink: &mut impl PixelSink) {
        if state.standby() {
            return;
        }

        if let Some(brightness) = self.pulse.tick(state.pulsing(), state.brightness()) {
            log::trace!(
                "Master brightness {brightness} ({:.3})",
                self.pulse.coefficient()
            );
            sink.set_master_brightness(brightness);
            Scheduler::commit(sink);
        }
    }

    fn effect_mut(&mut self, mode: Mode) -> Option<&mut dyn LightingEffect> {
        match mode {
            Mode::Color => None,
            Mode::Twinkle => Some(&mut self.twinkle),
            Mode::Rainbow => Some(&mut self.rainbow),
            Mode::CyclePalette => Some(&mut self.cycle),
        }
    }

    fn show(sink: &mut impl PixelSink, pixels: &[(usize, Rgb)]) {
        if pixels.is_empty() {
            return;
        }
        sink.render(pixels);
        Scheduler::commit(sink);
    }

    fn commit(sink: &mut impl PixelSink) {
        if let Err(err) = sink.commit() {
            log::warn!("Failed to commit frame: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::{wheel, BLACK};
    use crate::sink::testing::RecordingSink;

    pub(crate) fn timing() -> TimingConfig {
        TimingConfig {
            input_ms: 10,
            frame_ms: 20,
            brightness_ms: 20,
            twinkle_ms: 50,
            rainbow_ms: 30,
            cycle_ms: 40,
        }
    }

    pub(crate) fn scheduler(pixel_count: usize) -> Scheduler {
        Scheduler::new(
            &timing(),
            pixel_count,
            BrightnessPulse::new(0.5, 0.025),
            StdRng::seed_from_u64(9),
        )
    }

    #[test]
    fn color_fade_runs_one_step_per_frame() {
        let mut state = LampState::new(5, 3).with_target(Rgb::new(200, 0, 0));
        let mut sink = RecordingSink::new(2);
        let mut scheduler = scheduler(2);

        // Nothing is due before the first period has passed
        scheduler.poll(5, &mut state, &mut sink);
        assert!(sink.frames.is_empty());

        scheduler.poll(20, &mut state, &mut sink);
        scheduler.poll(25, &mut state, &mut sink);
        assert_eq!(state.transition_index(), 1);

        for now in [40, 60, 80, 100] {
            scheduler.poll(now, &mut state, &mut sink);
        }
        assert!(state.target_met());
        assert_eq!(sink.pixels, vec![Rgb::new(200, 0, 0); 2]);

        // Idle once the target is met
        let frames = sink.frames.len();
        scheduler.poll(120, &mut state, &mut sink);
        scheduler.poll(140, &mut state, &mut sink);
        assert_eq!(sink.frames.len(), frames);
    }

    #[test]
    fn standby_renders_nothing() {
        let mut state = LampState::new(5, 3);
        state.set_standby(true);
        let mut sink = RecordingSink::new(2);
        let mut scheduler = scheduler(2);

        for now in (0..500).step_by(10) {
            scheduler.poll(now, &mut state, &mut sink);
        }
        assert!(sink.frames.is_empty());
        assert_eq!(state.transition_index(), 0);
    }

    #[test]
    fn rainbow_only_runs_in_rainbow_mode() {
        let mut state = LampState::new(2, 2).in_mode(Mode::Rainbow);
        let mut sink = RecordingSink::new(2);
        let mut scheduler = scheduler(2);

        scheduler.poll(30, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![wheel(0), wheel(128)]);
        assert_eq!(state.current_color(), BLACK);
        assert_eq!(state.transition_index(), 0);

        scheduler.poll(60, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![wheel(1), wheel(129)]);
    }

    #[test]
    fn cycle_frames_follow_their_period() {
        let mut state = LampState::new(2, 2).in_mode(Mode::CyclePalette);
        let mut sink = RecordingSink::new(3);
        let mut scheduler = scheduler(3);

        scheduler.poll(30, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![BLACK; 3]);
        scheduler.poll(40, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![wheel(0); 3]);
        scheduler.poll(79, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![wheel(0); 3]);
        scheduler.poll(80, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![wheel(1); 3]);
    }

    #[test]
    fn twinkle_changes_single_pixels() {
        let mut state = LampState::new(2, 2).in_mode(Mode::Twinkle);
        let mut sink = RecordingSink::new(8);
        let mut scheduler = scheduler(8);

        let mut previous = sink.pixels.clone();
        for now in (50..2000).step_by(50) {
            scheduler.poll(now, &mut state, &mut sink);
            let changed = sink
                .pixels
                .iter()
                .zip(&previous)
                .filter(|(a, b)| a != b)
                .count();
            assert!(changed <= 1);
            previous = sink.pixels.clone();
        }
        assert!(sink.pixels.iter().any(|&pixel| pixel != BLACK));
    }

    #[test]
    fn entering_mode_resets_effect() {
        let mut state = LampState::new(2, 2).in_mode(Mode::CyclePalette);
        let mut sink = RecordingSink::new(1);
        let mut scheduler = scheduler(1);

        for now in [40, 80, 120] {
            scheduler.poll(now, &mut state, &mut sink);
        }
        assert_eq!(sink.pixels, vec![wheel(2)]);

        scheduler.enter_mode(Mode::CyclePalette);
        scheduler.poll(160, &mut state, &mut sink);
        assert_eq!(sink.pixels, vec![wheel(0)]);
    }

    #[test]
    fn brightness_is_written_only_on_change() {
        let mut state = LampState::new(2, 2);
        state.set_brightness(100);
        let mut sink = RecordingSink::new(1);
        let mut scheduler = scheduler(1);

        for now in (20..200).step_by(20) {
            scheduler.poll(now, &mut state, &mut sink);
        }
        assert_eq!(sink.brightness_writes, vec![100]);

        state.set_brightness(50);
        scheduler.poll(200, &mut state, &mut sink);
        assert_eq!(sink.brightness_writes, vec![100, 50]);
    }

    #[test]
    fn pulsing_bounces_color_and_brightness() {
        let mut state = LampState::new(2, 3).with_target(Rgb::new(100, 100, 100));
        state.next_fade_step();
        state.next_fade_step();
        state.set_pulsing(true);

        let mut sink = RecordingSink::new(1);
        let mut scheduler = scheduler(1);
        for now in (20..=100).step_by(20) {
            scheduler.poll(now, &mut state, &mut sink);
        }

        let shown: Vec<_> = sink.frames.iter().map(|frame| frame[0]).collect();
        assert!(shown.contains(&Rgb::new(20, 20, 20)));
        assert!(sink.brightness_writes.iter().all(|&b| b < 255));
    }
}
