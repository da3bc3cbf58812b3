/// Triangle wave on the master brightness used as press/hold feedback.
///
/// The coefficient moves by `step` per tick between `floor` and 1.0 while the
/// pulse is active, and climbs back to 1.0 once it is released.
#[derive(Debug, Clone)]
pub struct BrightnessPulse {
    floor: f32,
    step: f32,
    coefficient: f32,
    rising: bool,
    last_applied: Option<u8>,
}

impl BrightnessPulse {
    pub fn new(floor: f32, step: f32) -> BrightnessPulse {
        BrightnessPulse {
            floor,
            step,
            coefficient: 1.0,
            rising: false,
            last_applied: None,
        }
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    /// Advances one tick. Returns the hardware brightness to apply, or `None`
    /// when it equals the one applied last.
    pub fn tick(&mut self, active: bool, brightness: u8) -> Option<u8> {
        if active {
            self.oscillate();
        } else {
            self.coefficient = (self.coefficient + self.step).min(1.0);
            self.rising = false;
        }

        let applied = (brightness as f32 * self.coefficient).round() as u8;
        if self.last_applied == Some(applied) {
            return None;
        }

        self.last_applied = Some(applied);
        Some(applied)
    }

    /// Forces the next tick to write the brightness out again.
    pub fn invalidate(&mut self) {
        self.last_applied = None;
    }

    fn oscillate(&mut self) {
        if self.rising {
            self.coefficient += self.step;
            if self.coefficient >= 1.0 {
                self.coefficient = 1.0;
                self.rising = false;
            }
        } else {
            self.coefficient -= self.step;
            if self.coefficient <= self.floor {
                self.coefficient = self.floor;
                self.rising = true;
            }
        }
    }
}
