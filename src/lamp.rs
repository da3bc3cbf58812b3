use crate::color::{Channel, BLACK};
use crate::lampstate::{LampState, Mode};
use crate::protocol::Snapshot;
use crate::scheduler::Scheduler;
use crate::sink::PixelSink;
use crate::store::ColorStore;

/// The single owner of all lamp state. Commands, button events and timer
/// polls all go through here from one thread.
pub struct Lamp<S: PixelSink> {
    state: LampState,
    scheduler: Scheduler,
    sink: S,
    store: Option<Box<dyn ColorStore>>,
}

impl<S: PixelSink> Lamp<S> {
    pub fn new(
        mut state: LampState,
        scheduler: Scheduler,
        sink: S,
        store: Option<Box<dyn ColorStore>>,
    ) -> Lamp<S> {
        if let Some(color) = store.as_ref().and_then(|store| store.load_last_color()) {
            log::info!("Resuming with stored color {color:?}");
            state.set_target_color(color);
        }

        Lamp {
            state,
            scheduler,
            sink,
            store,
        }
    }

    pub fn state(&self) -> &LampState {
        &self.state
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn poll(&mut self, now: u64) {
        self.scheduler.poll(now, &mut self.state, &mut self.sink);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.state.mode(),
            power: !self.state.standby(),
            color: self.state.current_color(),
            brightness: self.state.brightness(),
        }
    }

    pub fn set_standby(&mut self, standby: bool) {
        self.state.set_standby(standby);
        if standby {
            log::info!("Going to standby");
            self.blank();
        } else {
            log::info!("Waking up");
            self.state.recommit();
            self.scheduler.refresh_brightness();
        }
    }

    pub fn advance_mode(&mut self) -> Mode {
        let mode = self.state.advance_mode();
        self.scheduler.enter_mode(mode);
        log::info!("Switched to {}", mode.name());

        if mode == Mode::Color {
            self.state.recommit();
        } else {
            self.blank();
        }
        mode
    }

    pub fn set_channels(&mut self, channels: &[(Channel, u8)]) {
        for &(channel, value) in channels {
            self.state.set_target_channel(channel, value);
        }

        let target = self.state.target_color();
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.save_last_color(target) {
                log::warn!("Failed to store color {target:?}: {err}");
            }
        }
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.state.set_brightness(brightness);
    }

    pub fn set_pulsing(&mut self, pulsing: bool) {
        self.state.set_pulsing(pulsing);
    }

    /// Clears the whole strip right away.
    pub fn blank(&mut self) {
        self.sink.fill(BLACK);
        if let Err(err) = self.sink.commit() {
            log::warn!("Failed to blank output: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::{wheel, Rgb};
    use crate::scheduler::tests::scheduler;
    use crate::sink::testing::RecordingSink;
    use crate::store::tests::MemoryStore;

    pub(crate) fn lamp(fade_steps: usize) -> Lamp<RecordingSink> {
        Lamp::new(
            LampState::new(fade_steps, 4),
            scheduler(2),
            RecordingSink::new(2),
            None,
        )
    }

    fn run(lamp: &mut Lamp<RecordingSink>, from: u64, to: u64) {
        for now in (from..to).step_by(10) {
            lamp.poll(now);
        }
    }

    #[test]
    fn loads_stored_target() {
        let store = MemoryStore {
            saved: vec![Rgb::new(1, 2, 3)],
        };
        let lamp = Lamp::new(
            LampState::new(5, 4),
            scheduler(2),
            RecordingSink::new(2),
            Some(Box::new(store)),
        );
        assert_eq!(lamp.state().target_color(), Rgb::new(1, 2, 3));
        assert_eq!(lamp.state().transition_table()[4], Rgb::new(1, 2, 3));
    }

    #[test]
    fn standby_blanks_and_resumes() {
        let mut lamp = lamp(5);
        lamp.set_channels(&[(Channel::Red, 100)]);
        run(&mut lamp, 0, 200);
        let before = lamp.sink.pixels.clone();
        assert_eq!(before, vec![Rgb::new(100, 255, 255); 2]);

        lamp.set_standby(true);
        assert_eq!(lamp.sink.pixels, vec![BLACK; 2]);
        run(&mut lamp, 200, 400);
        assert_eq!(lamp.sink.pixels, vec![BLACK; 2]);
        assert_eq!(lamp.state().target_color(), Rgb::new(100, 255, 255));

        lamp.set_standby(false);
        assert!(!lamp.state().target_met());
        run(&mut lamp, 400, 600);
        assert_eq!(lamp.sink.pixels, before);
    }

    #[test]
    fn procedural_modes_start_dark() {
        let mut lamp = lamp(5);
        run(&mut lamp, 0, 200);
        assert_ne!(lamp.sink.pixels, vec![BLACK; 2]);

        assert_eq!(lamp.advance_mode(), Mode::Twinkle);
        assert_eq!(lamp.sink.pixels, vec![BLACK; 2]);
    }

    #[test]
    fn returning_to_color_fades_again() {
        let mut lamp = lamp(5);
        run(&mut lamp, 0, 200);
        for _ in 0..3 {
            lamp.advance_mode();
        }
        assert_eq!(lamp.state().mode(), Mode::CyclePalette);

        assert_eq!(lamp.advance_mode(), Mode::Color);
        assert!(!lamp.state().target_met());
        assert_eq!(lamp.state().target_color(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn coming_back_to_a_mode_restarts_its_animation() {
        let mut lamp = lamp(5);
        let first_frame = vec![wheel(0), wheel(128)];
        lamp.advance_mode();
        assert_eq!(lamp.advance_mode(), Mode::Rainbow);

        run(&mut lamp, 0, 200);
        assert_ne!(lamp.sink.pixels, first_frame);

        for _ in 0..Mode::ALL.len() {
            lamp.advance_mode();
        }
        assert_eq!(lamp.state().mode(), Mode::Rainbow);
        assert_eq!(lamp.sink.pixels, vec![BLACK; 2]);

        lamp.poll(230);
        assert_eq!(lamp.sink.pixels, first_frame);
    }

    #[test]
    fn color_changes_are_stored() {
        let mut lamp = Lamp::new(
            LampState::new(5, 4),
            scheduler(2),
            RecordingSink::new(2),
            Some(Box::new(MemoryStore { saved: vec![] })),
        );
        lamp.set_channels(&[(Channel::Red, 10), (Channel::Blue, 0)]);
        let store = lamp.store.as_ref().unwrap();
        assert_eq!(store.load_last_color(), Some(Rgb::new(10, 255, 0)));
    }

    #[test]
    fn snapshot_reports_power_and_rendered_color() {
        let mut lamp = lamp(2);
        run(&mut lamp, 0, 100);
        lamp.set_brightness(9);
        lamp.set_standby(true);

        let snapshot = lamp.snapshot();
        assert!(!snapshot.power);
        assert_eq!(snapshot.mode, Mode::Color);
        assert_eq!(snapshot.color, Rgb::new(255, 255, 255));
        assert_eq!(snapshot.brightness, 9);
    }
}
