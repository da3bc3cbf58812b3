pub type Result<T> = std::result::Result<T, LampError>;

#[derive(Debug, thiserror::Error)]
pub enum LampError {
    #[error("{field} value {value} is outside of 0..=255")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("cannot parse payload: {0}")]
    Payload(#[from] json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("MQTT: {0}")]
    Mqtt(#[from] paho_mqtt::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LampError {
    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        Self::Malformed(msg.into())
    }
}
