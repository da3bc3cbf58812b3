//! Wire format of the lamp: which topics carry which commands, how payloads
//! are decoded, and what gets published back.

use json::JsonValue;

use crate::color::{Channel, Rgb};
use crate::error::{LampError, Result};
use crate::lampstate::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    DeviceInfo,
    Power,
    Mode,
    Color,
    Brightness,
}

impl CommandClass {
    const ALL: [CommandClass; 5] = [
        CommandClass::DeviceInfo,
        CommandClass::Power,
        CommandClass::Mode,
        CommandClass::Color,
        CommandClass::Brightness,
    ];

    fn suffix(self) -> &'static str {
        match self {
            CommandClass::DeviceInfo => "info/get",
            CommandClass::Power => "power/set",
            CommandClass::Mode => "mode/set",
            CommandClass::Color => "color/set",
            CommandClass::Brightness => "brightness/set",
        }
    }
}

pub struct Topics {
    base: String,
}

impl Topics {
    pub fn new(prefix: &str, device_id: &str) -> Topics {
        Topics {
            base: format!("{prefix}/{device_id}"),
        }
    }

    pub fn availability(&self) -> String {
        format!("{}/available", self.base)
    }

    pub fn subscriptions(&self) -> Vec<String> {
        CommandClass::ALL
            .iter()
            .map(|class| format!("{}/{}", self.base, class.suffix()))
            .collect()
    }

    pub fn classify(&self, key: &str) -> Option<CommandClass> {
        let suffix = key.strip_prefix(&self.base)?.strip_prefix('/')?;
        CommandClass::ALL
            .into_iter()
            .find(|class| class.suffix() == suffix)
    }

    pub fn notification(&self, notification: &Notification) -> String {
        format!("{}/{}", self.base, notification.suffix())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DeviceInfo,
    Power(bool),
    AdvanceMode,
    /// Channels to change. Channels not listed keep their value.
    Color(Vec<(Channel, u8)>),
    Brightness(u8),
}

impl Command {
    pub fn decode(class: CommandClass, payload: &str) -> Result<Command> {
        match class {
            CommandClass::DeviceInfo => Ok(Command::DeviceInfo),
            CommandClass::Mode => Ok(Command::AdvanceMode),
            CommandClass::Power => {
                let json = json::parse(payload)?;
                match json["value"].as_bool() {
                    Some(on) => Ok(Command::Power(on)),
                    None => Err(LampError::malformed(format!(
                        "expected a boolean value, got {}",
                        json["value"]
                    ))),
                }
            }
            CommandClass::Brightness => {
                let json = json::parse(payload)?;
                Ok(Command::Brightness(parse_level("brightness", &json["value"])?))
            }
            CommandClass::Color => {
                let json = json::parse(payload)?;
                let mut channels = Vec::new();
                for channel in Channel::ALL {
                    if json.has_key(channel.name()) {
                        let value = parse_level(channel.name(), &json[channel.name()])?;
                        channels.push((channel, value));
                    }
                }

                if channels.is_empty() {
                    return Err(LampError::malformed(format!("no color channel in {json}")));
                }
                Ok(Command::Color(channels))
            }
        }
    }
}

/// Reads a channel or brightness value, refusing anything that is not a
/// whole number in 0..=255.
pub fn parse_level(field: &'static str, value: &JsonValue) -> Result<u8> {
    let Some(number) = value.as_f64() else {
        return Err(LampError::malformed(format!(
            "{field} is not a number: {value}"
        )));
    };

    if !(0.0..=255.0).contains(&number) {
        return Err(LampError::OutOfRange {
            field,
            value: number,
        });
    }
    if number.fract() != 0.0 {
        return Err(LampError::malformed(format!(
            "{field} is not a whole number: {number}"
        )));
    }

    Ok(number as u8)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: Mode,
    pub power: bool,
    pub color: Rgb,
    pub brightness: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    DeviceInfo(Snapshot),
    Mode(Mode),
    Power(bool),
    Brightness(u8),
    Color(Vec<(Channel, u8)>),
}

impl Notification {
    fn suffix(&self) -> &'static str {
        match self {
            Notification::DeviceInfo(_) => "info",
            Notification::Mode(_) => "mode",
            Notification::Power(_) => "power",
            Notification::Brightness(_) => "brightness",
            Notification::Color(_) => "color",
        }
    }

    pub fn payload(&self) -> JsonValue {
        match self {
            Notification::DeviceInfo(snapshot) => json::object! {
                mode: snapshot.mode,
                power: snapshot.power,
                color: {
                    red: snapshot.color.red,
                    green: snapshot.color.green,
                    blue: snapshot.color.blue,
                },
                brightness: snapshot.brightness,
            },
            Notification::Mode(mode) => json::object! { value: *mode },
            Notification::Power(on) => json::object! { value: *on },
            Notification::Brightness(brightness) => json::object! { value: *brightness },
            Notification::Color(channels) => {
                let mut payload = JsonValue::new_object();
                for &(channel, value) in channels {
                    payload[channel.name()] = value.into();
                }
                payload
            }
        }
    }
}
