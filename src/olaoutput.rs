use std::{
    io,
    net::{SocketAddr, UdpSocket},
};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::color::{Rgb, BLACK};
use crate::error::{LampError, Result};
use crate::sink::PixelSink;

pub const UNIVERSE_SIZE: usize = 512;

/// Drives an RGB strip through the OSC plugin of the Open Lighting
/// Architecture daemon, three DMX channels per pixel.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    address: String,
    start_channel: usize,
    pixels: Vec<Rgb>,
    brightness: u8,
    buffer: Vec<u8>,
}

impl OlaOutput {
    pub fn new(
        target_addr: SocketAddr,
        universe: u16,
        start_channel: usize,
        pixel_count: usize,
    ) -> Result<Self> {
        if start_channel + pixel_count * 3 > UNIVERSE_SIZE {
            return Err(LampError::Config(format!(
                "{pixel_count} pixels starting at channel {start_channel} do not fit into one universe"
            )));
        }

        let sock = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))?;
        log::info!("Sending universe {universe} to OLA at {target_addr}");

        Ok(OlaOutput {
            sock,
            target_addr,
            address: format!("/dmx/universe/{universe}"),
            start_channel,
            pixels: vec![BLACK; pixel_count],
            brightness: 255,
            buffer: vec![0; UNIVERSE_SIZE],
        })
    }

    pub fn blackout(&mut self) -> Result<()> {
        self.fill(BLACK);
        self.commit()
    }

    fn bake(&mut self) {
        let brightness = self.brightness as u16;
        let scale = |value: u8| (value as u16 * brightness / 255) as u8;
        for (i, pixel) in self.pixels.iter().enumerate() {
            let channel = self.start_channel + i * 3;
            self.buffer[channel] = scale(pixel.red);
            self.buffer[channel + 1] = scale(pixel.green);
            self.buffer[channel + 2] = scale(pixel.blue);
        }
    }
}

impl PixelSink for OlaOutput {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn render(&mut self, pixels: &[(usize, Rgb)]) {
        for &(index, color) in pixels {
            match self.pixels.get_mut(index) {
                Some(pixel) => *pixel = color,
                None => log::warn!("Dropping pixel {index}, strip has {}", self.pixels.len()),
            }
        }
    }

    fn set_master_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn commit(&mut self) -> Result<()> {
        self.bake();
        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage {
            addr: self.address.clone(),
            args: vec![OscType::Blob(self.buffer.clone())],
        }))
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("{err:?}")))?;
        self.sock.send_to(&msg_buf, self.target_addr)?;
        log::trace!("Sent {} bytes to {}", msg_buf.len(), self.target_addr);
        Ok(())
    }
}
