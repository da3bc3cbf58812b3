use crate::button::ButtonEvent;
use crate::lamp::Lamp;
use crate::protocol::{Command, Notification, Topics};
use crate::sink::PixelSink;

/// Turns inbound (key, payload) pairs into lamp changes and the
/// notification that reports them.
pub struct CommandRouter {
    topics: Topics,
}

impl CommandRouter {
    pub fn new(topics: Topics) -> CommandRouter {
        CommandRouter { topics }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Applies one command. Unknown keys and bad payloads leave the lamp
    /// untouched and produce no notification.
    pub fn route<S: PixelSink>(
        &self,
        lamp: &mut Lamp<S>,
        key: &str,
        payload: &str,
    ) -> Option<Notification> {
        let Some(class) = self.topics.classify(key) else {
            log::debug!("Ignoring message on {key}");
            return None;
        };

        let command = match Command::decode(class, payload) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("Rejected {key} {payload:?}: {err}");
                return None;
            }
        };

        log::debug!("Received {key}: {command:?}");
        Some(CommandRouter::apply(lamp, command))
    }

    /// Full state report, sent every time the broker connection comes up.
    pub fn connected<S: PixelSink>(lamp: &mut Lamp<S>) -> Notification {
        CommandRouter::apply(lamp, Command::DeviceInfo)
    }

    /// Short press advances the mode. Holding pulses the lamp and letting go
    /// toggles power.
    pub fn button<S: PixelSink>(lamp: &mut Lamp<S>, event: ButtonEvent) -> Option<Notification> {
        match event {
            ButtonEvent::Press => Some(CommandRouter::apply(lamp, Command::AdvanceMode)),
            ButtonEvent::HoldStarted => {
                lamp.set_pulsing(true);
                None
            }
            ButtonEvent::HoldReleased => {
                lamp.set_pulsing(false);
                let power_on = lamp.state().standby();
                Some(CommandRouter::apply(lamp, Command::Power(power_on)))
            }
        }
    }

    pub fn apply<S: PixelSink>(lamp: &mut Lamp<S>, command: Command) -> Notification {
        match command {
            Command::DeviceInfo => Notification::DeviceInfo(lamp.snapshot()),
            Command::Power(on) => {
                lamp.set_standby(!on);
                Notification::Power(on)
            }
            Command::AdvanceMode => Notification::Mode(lamp.advance_mode()),
            Command::Color(channels) => {
                lamp.set_channels(&channels);
                Notification::Color(channels)
            }
            Command::Brightness(brightness) => {
                lamp.set_brightness(brightness);
                Notification::Brightness(brightness)
            }
        }
    }
}
