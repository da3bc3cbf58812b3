use std::fs;
use std::path::PathBuf;

use crate::color::{Channel, Rgb};
use crate::error::{LampError, Result};
use crate::protocol;

/// Keeps the last commanded color across restarts. Only touched at startup
/// and when the target changes.
pub trait ColorStore {
    fn load_last_color(&self) -> Option<Rgb>;
    fn save_last_color(&mut self, color: Rgb) -> Result<()>;
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> JsonFileStore {
        JsonFileStore { path }
    }
}

impl ColorStore for JsonFileStore {
    fn load_last_color(&self) -> Option<Rgb> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                log::info!("No stored color at {}: {err}", self.path.display());
                return None;
            }
        };

        let parsed: Result<Rgb> = json::parse(&contents)
            .map_err(LampError::from)
            .and_then(|json| {
                let mut color = Rgb::new(0, 0, 0);
                for channel in Channel::ALL {
                    let value = protocol::parse_level(channel.name(), &json[channel.name()])?;
                    channel.set(&mut color, value);
                }
                Ok(color)
            });

        match parsed {
            Ok(color) => Some(color),
            Err(err) => {
                log::warn!("Ignoring stored color in {}: {err}", self.path.display());
                None
            }
        }
    }

    fn save_last_color(&mut self, color: Rgb) -> Result<()> {
        let payload = json::object! {
            red: color.red,
            green: color.green,
            blue: color.blue,
        };
        fs::write(&self.path, json::stringify(payload))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory store that remembers every save.
    pub(crate) struct MemoryStore {
        pub(crate) saved: Vec<Rgb>,
    }

    impl ColorStore for MemoryStore {
        fn load_last_color(&self) -> Option<Rgb> {
            self.saved.last().copied()
        }

        fn save_last_color(&mut self, color: Rgb) -> Result<()> {
            self.saved.push(color);
            Ok(())
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lichtkern-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn remembers_last_color() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(path.clone());
        store.save_last_color(Rgb::new(10, 200, 30)).unwrap();

        let reopened = JsonFileStore::new(path.clone());
        assert_eq!(reopened.load_last_color(), Some(Rgb::new(10, 200, 30)));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_yields_nothing() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load_last_color(), None);
    }

    #[test]
    fn corrupt_or_out_of_range_files_are_ignored() {
        for (name, contents) in [
            ("garbage", "not json"),
            ("range", r#"{"red": 300, "green": 0, "blue": 0}"#),
            ("partial", r#"{"red": 3}"#),
        ] {
            let path = temp_path(name);
            fs::write(&path, contents).unwrap();
            assert_eq!(JsonFileStore::new(path.clone()).load_last_color(), None);
            fs::remove_file(path).unwrap();
        }
    }
}
