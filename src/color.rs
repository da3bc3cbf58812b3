pub type Rgb = palette::Srgb<u8>;

pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const WHITE: Rgb = Rgb::new(255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Key used for this channel in command and notification payloads.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }

    pub fn set(self, color: &mut Rgb, value: u8) {
        match self {
            Channel::Red => color.red = value,
            Channel::Green => color.green = value,
            Channel::Blue => color.blue = value,
        }
    }
}

/// Samples the straight line from `from` to `to` at `steps` equally spaced
/// points, both ends included. Channels are interpolated independently with
/// floor division, so the first entry is exactly `from` and the last is
/// exactly `to`.
pub fn interpolate(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    if steps < 2 {
        return vec![to; steps];
    }

    let last = (steps - 1) as i64;
    let lerp = |a: u8, b: u8, i: i64| -> u8 {
        let a = a as i64;
        let delta = b as i64 - a;
        (a + (delta * i).div_euclid(last)) as u8
    };

    (0..steps as i64)
        .map(|i| {
            Rgb::new(
                lerp(from.red, to.red, i),
                lerp(from.green, to.green, i),
                lerp(from.blue, to.blue, i),
            )
        })
        .collect()
}

/// Divides every channel by `divisor`.
pub fn dim(color: Rgb, divisor: u8) -> Rgb {
    let divisor = divisor.max(1);
    Rgb::new(
        color.red / divisor,
        color.green / divisor,
        color.blue / divisor,
    )
}

/// Maps a position on the hue wheel to a fully saturated color.
///
/// Breakpoints sit at 0, 85, 170 and 255 (red, green, blue, red) and every
/// channel changes by 3 per step in between.
pub fn wheel(position: u8) -> Rgb {
    let position = 255 - position;
    if position < 85 {
        return Rgb::new(255 - position * 3, 0, position * 3);
    }
    if position < 170 {
        let position = position - 85;
        return Rgb::new(0, position * 3, 255 - position * 3);
    }
    let position = position - 170;
    Rgb::new(position * 3, 255 - position * 3, 0)
}

/// Squeezes a color into a single wheel position by packing the top bits of
/// each channel (3 red, 3 green, 2 blue).
///
/// This is lossy and only loosely related to the hue of the input. Twinkle
/// depends on its exact output, so keep it as is.
pub fn rgb_to_wheel(color: Rgb) -> u8 {
    (color.red & 0xE0) | ((color.green & 0xE0) >> 3) | (color.blue >> 6)
}
