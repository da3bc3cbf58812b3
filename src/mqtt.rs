use std::time::Duration;

use mqtt::{Message, Receiver};
use paho_mqtt as mqtt;

use crate::error::Result;
use crate::intervaltimer::IntervalTimer;
use crate::protocol::{Notification, Topics};

/// Broker connection. Incoming messages queue up in the client's channel
/// and are only handed out through `drain`, so the control loop applies
/// them on its own thread.
pub struct MqttClient {
    client: mqtt::Client,
    receiver: Receiver<Option<Message>>,
    subscriptions: Vec<String>,
    availability: String,
    reconnect_timer: IntervalTimer,
}

impl MqttClient {
    fn make_availability_message(topic: &str, online: bool) -> mqtt::Message {
        let payload = if online { "online" } else { "offline" };
        mqtt::Message::new_retained(topic, payload, 0)
    }

    pub fn new(url: &str, topics: &Topics, reconnect_interval_ms: u64) -> Result<MqttClient> {
        let availability = topics.availability();
        let client = mqtt::Client::new(url)?;

        let conn_opts = mqtt::ConnectOptionsBuilder::new()
            .keep_alive_interval(Duration::from_secs(20))
            .clean_session(true)
            .will_message(MqttClient::make_availability_message(&availability, false))
            .finalize();

        let receiver = client.start_consuming();
        client.connect(conn_opts)?;
        log::info!("Connected to broker at {url}");

        let mqtt_client = MqttClient {
            client,
            receiver,
            subscriptions: topics.subscriptions(),
            availability,
            reconnect_timer: IntervalTimer::new(reconnect_interval_ms),
        };
        mqtt_client.subscribe()?;
        mqtt_client.announce();
        Ok(mqtt_client)
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Tries to get back to the broker, at most once per reconnect interval.
    /// Returns true when the connection is up again.
    pub fn reconnect_if_due(&mut self, now: u64) -> bool {
        if !self.reconnect_timer.elapsed(now) {
            return false;
        }

        log::info!("Reconnecting to broker");
        match self.client.reconnect() {
            Ok(_) => {
                if let Err(err) = self.subscribe() {
                    log::warn!("Resubscribing failed: {err}");
                }
                self.announce();
                true
            }
            Err(err) => {
                log::warn!("Reconnection failed: {err}");
                false
            }
        }
    }

    /// Hands out everything that arrived since the last call as
    /// (topic, payload) pairs.
    pub fn drain(&self) -> Vec<(String, String)> {
        self.receiver
            .try_iter()
            .flatten()
            .map(|msg| (msg.topic().to_string(), msg.payload_str().into_owned()))
            .collect()
    }

    pub fn publish(&self, topics: &Topics, notification: &Notification) {
        let topic = topics.notification(notification);
        let payload = json::stringify(notification.payload());
        log::info!("Publishing {topic}: {payload}");

        let msg = mqtt::Message::new(&topic, payload, 0);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Publishing to {topic} failed: {err}");
        }
    }

    fn subscribe(&self) -> Result<()> {
        let qos = vec![0; self.subscriptions.len()];
        self.client.subscribe_many(&self.subscriptions, &qos)?;
        log::info!("Subscribed to {}", self.subscriptions.join(", "));
        Ok(())
    }

    fn announce(&self) {
        let msg = MqttClient::make_availability_message(&self.availability, true);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Failed to publish availability: {err}");
        }
    }
}

impl Drop for MqttClient {
    fn drop(&mut self) {
        let msg = MqttClient::make_availability_message(&self.availability, false);
        if let Err(err) = self.client.publish(msg) {
            log::warn!("Failed to publish availability: {err}");
        }
        if let Err(err) = self.client.disconnect(None) {
            // We don't really care about errors here, but let's make rustc happy.
            log::error!("{:?}", err);
        }
    }
}
