use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::intervaltimer::IntervalTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Released before the hold time passed.
    Press,
    HoldStarted,
    HoldReleased,
}

/// Turns sampled button levels into press and hold events.
#[derive(Debug, Clone)]
pub struct PressTracker {
    hold_ms: u64,
    pressed_since: Option<u64>,
    holding: bool,
}

impl PressTracker {
    pub fn new(hold_ms: u64) -> PressTracker {
        PressTracker {
            hold_ms,
            pressed_since: None,
            holding: false,
        }
    }

    pub fn update(&mut self, now: u64, pressed: bool) -> Option<ButtonEvent> {
        match (self.pressed_since, pressed) {
            (None, true) => {
                self.pressed_since = Some(now);
                None
            }
            (Some(since), true) => {
                if !self.holding && now.saturating_sub(since) >= self.hold_ms {
                    self.holding = true;
                    return Some(ButtonEvent::HoldStarted);
                }
                None
            }
            (Some(_), false) => {
                self.pressed_since = None;
                if std::mem::take(&mut self.holding) {
                    Some(ButtonEvent::HoldReleased)
                } else {
                    Some(ButtonEvent::Press)
                }
            }
            (None, false) => None,
        }
    }
}

/// Button wired to a GPIO exported through sysfs.
pub struct GpioButton {
    path: PathBuf,
    active_low: bool,
    timer: IntervalTimer,
    tracker: PressTracker,
}

impl GpioButton {
    pub fn new(path: PathBuf, active_low: bool, sample_ms: u64, hold_ms: u64) -> GpioButton {
        log::info!("Sampling button at {}", path.display());
        GpioButton {
            path,
            active_low,
            timer: IntervalTimer::new(sample_ms),
            tracker: PressTracker::new(hold_ms),
        }
    }

    pub fn poll(&mut self, now: u64) -> Option<ButtonEvent> {
        if !self.timer.elapsed(now) {
            return None;
        }

        match self.read() {
            Ok(pressed) => self.tracker.update(now, pressed),
            Err(err) => {
                log::warn!("Cannot read button at {}: {err}", self.path.display());
                None
            }
        }
    }

    fn read(&self) -> Result<bool> {
        let level = fs::read_to_string(&self.path)?.trim() == "1";
        Ok(level != self.active_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press() {
        let mut tracker = PressTracker::new(600);
        assert_eq!(tracker.update(0, true), None);
        assert_eq!(tracker.update(100, true), None);
        assert_eq!(tracker.update(200, false), Some(ButtonEvent::Press));
        assert_eq!(tracker.update(300, false), None);
    }

    #[test]
    fn hold_and_release() {
        let mut tracker = PressTracker::new(600);
        tracker.update(1000, true);
        assert_eq!(tracker.update(1599, true), None);
        assert_eq!(tracker.update(1600, true), Some(ButtonEvent::HoldStarted));
        assert_eq!(tracker.update(2500, true), None);
        assert_eq!(tracker.update(2600, false), Some(ButtonEvent::HoldReleased));

        // The next press starts from scratch
        tracker.update(3000, true);
        assert_eq!(tracker.update(3100, false), Some(ButtonEvent::Press));
    }

    #[test]
    fn reads_sysfs_levels() {
        let path = std::env::temp_dir().join(format!("lichtkern-{}-gpio", std::process::id()));
        let mut button = GpioButton::new(path.clone(), true, 10, 600);

        fs::write(&path, "0\n").unwrap();
        assert_eq!(button.poll(10), None);
        assert_eq!(button.poll(15), None);

        fs::write(&path, "1\n").unwrap();
        assert_eq!(button.poll(20), Some(ButtonEvent::Press));
        fs::remove_file(path).unwrap();
    }
}
