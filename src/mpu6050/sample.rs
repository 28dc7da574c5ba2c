// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use super::{AccelRange, GyroRange, FALLBACK_SEN, TEMP_OFFSET, TEMP_SEN};

/// One acquisition worth of raw and converted readings.
///
/// The converted fields are only meaningful once the matching raw field has been filled by a read.
/// Axis order is always X, Y, Z.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Raw accelerometer counts
    pub accel_raw: [i16; 3],
    /// Acceleration in g
    pub accel: [f64; 3],
    /// Raw gyro counts
    pub gyro_raw: [i16; 3],
    /// Angular rate in degrees per second
    pub gyro: [f64; 3],
    /// Raw temperature counts
    pub temp_raw: i16,
    /// Die temperature in Celsius
    pub temp: f32,
}

impl Sample {
    /// A zeroed sample.
    pub const fn new() -> Self {
        Sample {
            accel_raw: [0; 3],
            accel: [0.0; 3],
            gyro_raw: [0; 3],
            gyro: [0.0; 3],
            temp_raw: 0,
            temp: 0.0,
        }
    }

    /// The raw accelerometer axes as bytes, each axis little-endian.
    pub fn accel_raw_bytes(&self) -> [u8; 6] {
        axes_to_le_bytes(&self.accel_raw)
    }

    /// The raw gyro axes as bytes, each axis little-endian.
    pub fn gyro_raw_bytes(&self) -> [u8; 6] {
        axes_to_le_bytes(&self.gyro_raw)
    }
}

fn axes_to_le_bytes(axes: &[i16; 3]) -> [u8; 6] {
    let mut out = [0; 6];
    for (chunk, axis) in out.chunks_exact_mut(2).zip(axes.iter()) {
        chunk.copy_from_slice(&axis.to_le_bytes());
    }
    out
}

/// Decodes a block of three big-endian words as sent by the device (`[XH, XL, YH, YL, ZH, ZL]`).
pub fn decode_be_axes(block: &[u8; 6]) -> [i16; 3] {
    let mut axes = [0; 3];
    for (axis, word) in axes.iter_mut().zip(block.chunks_exact(2)) {
        *axis = i16::from_be_bytes([word[0], word[1]]);
    }
    axes
}

/// Swaps the two bytes of every axis, turning a big-endian block into a little-endian one and back.
pub fn swap_axis_bytes(block: &[u8; 6]) -> [u8; 6] {
    let mut out = [0; 6];
    for (dst, src) in out.chunks_exact_mut(2).zip(block.chunks_exact(2)) {
        dst[0] = src[1];
        dst[1] = src[0];
    }
    out
}

/// Accelerometer sensitivity in LSB/g for an AFS_SEL code.
///
/// Unknown codes fall back to 16384.
pub fn accel_lsb_per_g(code: u8) -> f64 {
    AccelRange::from_repr(code).map_or(FALLBACK_SEN, AccelRange::sensitivity)
}

/// Gyro sensitivity in LSB/dps for an FS_SEL code.
///
/// Unknown codes fall back to 16384.
pub fn gyro_lsb_per_dps(code: u8) -> f64 {
    GyroRange::from_repr(code).map_or(FALLBACK_SEN, GyroRange::sensitivity)
}

/// Die temperature in Celsius for a raw TEMP_OUT reading.
pub fn temp_celsius(raw: i16) -> f32 {
    raw as f32 / TEMP_SEN + TEMP_OFFSET
}

pub(crate) fn scale_axes(raw: &[i16; 3], lsb_per_unit: f64, out: &mut [f64; 3]) {
    for (value, count) in out.iter_mut().zip(raw.iter()) {
        *value = f64::from(*count) / lsb_per_unit;
    }
}
