pub(crate) mod button;
pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod effects;
pub(crate) mod error;
pub(crate) mod intervaltimer;
pub(crate) mod lamp;
pub(crate) mod lampstate;
pub(crate) mod mqtt;
pub(crate) mod olaoutput;
pub(crate) mod protocol;
pub(crate) mod router;
pub(crate) mod scheduler;
pub(crate) mod sink;
pub(crate) mod store;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use crate::button::GpioButton;
use crate::config::Config;
use crate::effects::pulse::BrightnessPulse;
use crate::error::Result;
use crate::intervaltimer::{Clock, MonotonicClock};
use crate::lamp::Lamp;
use crate::lampstate::LampState;
use crate::mqtt::MqttClient;
use crate::olaoutput::OlaOutput;
use crate::protocol::Topics;
use crate::router::CommandRouter;
use crate::scheduler::Scheduler;
use crate::store::{ColorStore, JsonFileStore};

#[derive(Parser)]
#[command(about = "Network controlled RGB lamp")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Broker URL, e.g. tcp://broker:1883
    #[arg(short, long, value_name = "URL")]
    mqtt_url: Option<String>,

    /// Device id used in all topics
    #[arg(short, long, value_name = "ID")]
    device_id: Option<String>,
}

fn load_config(args: &Cli) -> Result<Config> {
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(url) = &args.mqtt_url {
        config.mqtt.url = url.clone();
    }
    if let Some(device_id) = &args.device_id {
        config.mqtt.device_id = device_id.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Cli) -> Result<()> {
    let config = load_config(args)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    if let Err(err) = ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst)) {
        log::warn!("Cannot install Ctrl-C handler: {err}");
    }

    let output = &config.output;
    let ola = OlaOutput::new(
        output.ola_addr,
        output.universe,
        output.start_channel,
        output.pixel_count,
    )?;

    let store = config
        .state_file
        .clone()
        .map(|path| Box::new(JsonFileStore::new(path)) as Box<dyn ColorStore>);

    let transition = &config.transition;
    let state = LampState::new(transition.fade_steps, transition.pulse_steps);
    let scheduler = Scheduler::with_entropy(
        &config.timing,
        output.pixel_count,
        BrightnessPulse::new(transition.pulse_floor, transition.pulse_step),
    );
    let mut lamp = Lamp::new(state, scheduler, ola, store);

    let router = CommandRouter::new(Topics::new(
        &config.mqtt.topic_prefix,
        &config.mqtt.device_id,
    ));
    let mut client = MqttClient::new(
        &config.mqtt.url,
        router.topics(),
        config.mqtt.reconnect_interval_ms,
    )?;
    client.publish(router.topics(), &CommandRouter::connected(&mut lamp));

    let mut button = config.button.path.clone().map(|path| {
        GpioButton::new(
            path,
            config.button.active_low,
            config.timing.input_ms,
            config.button.hold_ms,
        )
    });

    let clock = MonotonicClock::new();
    while running.load(Ordering::SeqCst) {
        let now = clock.now_ms();

        if client.is_connected() {
            for (topic, payload) in client.drain() {
                if let Some(notification) = router.route(&mut lamp, &topic, &payload) {
                    client.publish(router.topics(), &notification);
                }
            }
        } else if client.reconnect_if_due(now) {
            client.publish(router.topics(), &CommandRouter::connected(&mut lamp));
        }

        if let Some(event) = button.as_mut().and_then(|button| button.poll(now)) {
            log::debug!("Button {event:?}");
            if let Some(notification) = CommandRouter::button(&mut lamp, event) {
                client.publish(router.topics(), &notification);
            }
        }

        lamp.poll(now);
        thread::sleep(Duration::from_millis(1));
    }

    log::info!("Shutting down");
    lamp.sink_mut().blackout()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
