//! Ambient light sources and the TCS34725 derivations.
//!
//! Colour temperature uses McCamy's approximation over the sensor's XYZ
//! estimate; lux is the Y component.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::AmbientSensor;
use crate::types::{Channels, Reading};

fn xyz(ch: Channels) -> (f32, f32, f32) {
    let (r, g, b) = (ch.r as f32, ch.g as f32, ch.b as f32);
    let x = -0.14282 * r + 1.54924 * g - 0.95641 * b;
    let y = -0.32466 * r + 1.57837 * g - 0.73191 * b;
    let z = -0.68202 * r + 0.77073 * g + 0.56332 * b;
    (x, y, z)
}

pub fn color_temperature(ch: Channels) -> u16 {
    let (x, y, z) = xyz(ch);
    let sum = x + y + z;
    if sum == 0.0 {
        return 0;
    }
    let xc = x / sum;
    let yc = y / sum;
    let n = (xc - 0.3320) / (0.1858 - yc);
    let cct = 449.0 * n.powi(3) + 3525.0 * n.powi(2) + 6823.3 * n + 5520.33;
    // `as` saturates and maps NaN to zero.
    cct as u16
}

pub fn lux(ch: Channels) -> u16 {
    let (_, y, _) = xyz(ch);
    y as u16
}

pub fn reading(channels: Channels) -> Reading {
    Reading {
        channels,
        temperature: color_temperature(channels),
        lux: lux(channels),
    }
}

/// Always reports the same channels.
pub struct FixedSensor {
    channels: Channels,
}

impl FixedSensor {
    pub fn new(channels: Channels) -> Self {
        Self { channels }
    }
}

impl AmbientSensor for FixedSensor {
    fn read_ambient(&mut self) -> io::Result<Reading> {
        Ok(reading(self.channels))
    }
}

/// Reads `r g b c` as whitespace-separated integers from a file on every call,
/// e.g. a value exported by a sensor driver.
pub struct FileSensor {
    path: PathBuf,
}

impl FileSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AmbientSensor for FileSensor {
    fn read_ambient(&mut self) -> io::Result<Reading> {
        let text = fs::read_to_string(&self.path)?;
        Ok(reading(parse_channels(&text)?))
    }
}

fn parse_channels(text: &str) -> io::Result<Channels> {
    let values = text
        .split_whitespace()
        .map(|v| {
            v.parse::<u16>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {}", v, e)))
        })
        .collect::<io::Result<Vec<u16>>>()?;

    match values[..] {
        [r, g, b, c] => Ok(Channels { r, g, b, c }),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected 4 channels, got {}", values.len()),
        )),
    }
}
