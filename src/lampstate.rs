use crate::color::{self, Channel, Rgb, BLACK, WHITE};

const PULSE_DIVISOR: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Color,
    Twinkle,
    Rainbow,
    CyclePalette,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Color, Mode::Twinkle, Mode::Rainbow, Mode::CyclePalette];

    /// Name observers see on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Color => "Color",
            Mode::Twinkle => "Twinkle",
            Mode::Rainbow => "Rainbow",
            Mode::CyclePalette => "Cycle",
        }
    }

    pub fn next(self) -> Mode {
        let index = Mode::ALL.iter().position(|&mode| mode == self).unwrap_or(0);
        Mode::ALL[(index + 1) % Mode::ALL.len()]
    }
}

impl From<Mode> for json::JsonValue {
    fn from(mode: Mode) -> Self {
        mode.name().into()
    }
}

/// Interpolation table consumed one entry at a time.
#[derive(Debug, Clone)]
struct Fade {
    table: Vec<Rgb>,
    index: usize,
    target_met: bool,
}

/// Interpolation table walked back and forth for press/hold feedback.
#[derive(Debug, Clone)]
struct Bounce {
    table: Vec<Rgb>,
    index: usize,
    rising: bool,
}

/// Everything the lamp has been told to show and what it currently shows.
#[derive(Debug, Clone)]
pub struct LampState {
    mode: Mode,
    standby: bool,
    pulsing: bool,
    target_color: Rgb,
    current_color: Rgb,
    brightness: u8,
    fade_steps: usize,
    pulse_steps: usize,
    fade: Fade,
    pulse: Bounce,
}

impl LampState {
    pub fn new(fade_steps: usize, pulse_steps: usize) -> LampState {
        let mut state = LampState {
            mode: Mode::Color,
            standby: false,
            pulsing: false,
            target_color: WHITE,
            current_color: BLACK,
            brightness: 255,
            fade_steps,
            pulse_steps,
            fade: Fade {
                table: Vec::new(),
                index: 0,
                target_met: true,
            },
            pulse: Bounce {
                table: Vec::new(),
                index: 0,
                rising: true,
            },
        };
        state.recommit();
        state.rebuild_pulse_table();
        state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn standby(&self) -> bool {
        self.standby
    }

    pub fn pulsing(&self) -> bool {
        self.pulsing
    }

    pub fn target_color(&self) -> Rgb {
        self.target_color
    }

    pub fn current_color(&self) -> Rgb {
        self.current_color
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_target_color(&mut self, target: Rgb) {
        self.target_color = target;
        self.recommit();
    }

    pub fn set_target_channel(&mut self, channel: Channel, value: u8) {
        let mut target = self.target_color;
        channel.set(&mut target, value);
        self.set_target_color(target);
    }

    /// Restarts the fade from whatever is shown now towards the target.
    pub fn recommit(&mut self) {
        self.fade = Fade {
            table: color::interpolate(self.current_color, self.target_color, self.fade_steps),
            index: 0,
            target_met: false,
        };
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub fn set_standby(&mut self, standby: bool) {
        self.standby = standby;
    }

    pub fn advance_mode(&mut self) -> Mode {
        self.mode = self.mode.next();
        self.mode
    }

    /// Starting a pulse ramps down from the color shown now. Ending it fades
    /// back to the target.
    pub fn set_pulsing(&mut self, pulsing: bool) {
        if pulsing == self.pulsing {
            return;
        }

        self.pulsing = pulsing;
        if pulsing {
            self.rebuild_pulse_table();
        } else {
            self.recommit();
        }
    }

    /// Takes the next entry of the fade table and makes it the current
    /// color. Returns `None` once the target has been reached.
    pub fn next_fade_step(&mut self) -> Option<Rgb> {
        if self.fade.target_met {
            return None;
        }

        let Some(&color) = self.fade.table.get(self.fade.index) else {
            self.fade.target_met = true;
            self.fade.index = 0;
            return None;
        };

        self.current_color = color;
        self.fade.index += 1;
        if self.fade.index >= self.fade.table.len() {
            self.fade.target_met = true;
            self.fade.index = 0;
        }
        Some(color)
    }

    /// Next color of the press/hold ramp. The cursor turns around at both
    /// ends of the table.
    pub fn next_pulse_step(&mut self) -> Rgb {
        let table = &self.pulse.table;
        let Some(&color) = table.get(self.pulse.index) else {
            return self.current_color;
        };

        self.current_color = color;
        let last = table.len() - 1;
        if self.pulse.rising {
            if self.pulse.index >= last {
                self.pulse.rising = false;
                self.pulse.index = last.saturating_sub(1);
            } else {
                self.pulse.index += 1;
            }
        } else if self.pulse.index == 0 {
            self.pulse.rising = true;
            self.pulse.index = last.min(1);
        } else {
            self.pulse.index -= 1;
        }

        color
    }

    fn rebuild_pulse_table(&mut self) {
        let floor = color::dim(self.current_color, PULSE_DIVISOR);
        self.pulse = Bounce {
            table: color::interpolate(self.current_color, floor, self.pulse_steps),
            index: 0,
            rising: true,
        };
    }
}

#[cfg(test)]
impl LampState {
    pub(crate) fn with_target(mut self, target: Rgb) -> LampState {
        self.set_target_color(target);
        self
    }

    pub(crate) fn in_mode(mut self, mode: Mode) -> LampState {
        while self.mode != mode {
            self.advance_mode();
        }
        self
    }

    pub(crate) fn target_met(&self) -> bool {
        self.fade.target_met
    }

    pub(crate) fn transition_index(&self) -> usize {
        self.fade.index
    }

    pub(crate) fn transition_table(&self) -> &[Rgb] {
        &self.fade.table
    }

    pub(crate) fn pulse_table(&self) -> &[Rgb] {
        &self.pulse.table
    }
}
