// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

/// The i2c module holds the driver implementation when using an I2C bus to communicate with the device
pub mod i2c;

/// Bit layouts of the configuration registers the driver writes
pub mod bits;

/// Data-ready entry point policies
pub mod handler;

mod sample;

pub use handler::{AccelGyro, AccelGyroTemp, Acquisition};
pub use sample::{
    accel_lsb_per_g, decode_be_axes, gyro_lsb_per_dps, swap_axis_bytes, temp_celsius, Sample,
};

use embedded_hal::digital::PinState;
use strum::{EnumIter, FromRepr};

/// Value of the WHO_AM_I register. It is also the 7-bit bus address with AD0 low.
pub const WHO_AM_I_VALUE: u8 = 0x68;

/// Per-transaction timeout, in milliseconds, the driver expects the I2C peripheral to be configured with.
///
/// embedded-hal I2C calls carry no timeout, so the HAL is responsible for enforcing it.
pub const BUS_TIMEOUT_MS: u32 = 1_000;

/// Time the device needs to come out of a reset, in milliseconds.
pub const RESET_DELAY_MS: u32 = 100;

/// Lowest sample rate the divider can express, in Hz.
pub const MIN_SAMPLE_RATE: u16 = 4;
/// Highest sample rate with the low pass filter enabled, in Hz.
pub const MAX_SAMPLE_RATE: u16 = 1_000;

// Fallback used for any full scale code outside the tables.
const FALLBACK_SEN: f64 = 16_384.0;

const ACCEL_SEN_0: f64 = 16_384.0;
const ACCEL_SEN_1: f64 = 8_192.0;
const ACCEL_SEN_2: f64 = 4_096.0;
const ACCEL_SEN_3: f64 = 2_048.0;

const GYRO_SEN_0: f64 = 131.0;
const GYRO_SEN_1: f64 = 65.5;
const GYRO_SEN_2: f64 = 32.8;
const GYRO_SEN_3: f64 = 16.4;

const TEMP_SEN: f32 = 340.0;
const TEMP_OFFSET: f32 = 36.53;

/// Resolves the 8-bit (already shifted) bus address for the given AD0 level.
///
/// AD0 low gives `0xD0`, AD0 high gives `0xD2`.
pub const fn resolve_address(ad0: PinState) -> u8 {
    let level = match ad0 {
        PinState::Low => 0,
        PinState::High => 1,
    };
    (WHO_AM_I_VALUE | level) << 1
}

/// Accelerometer full scale options as specified in the data sheet in g's.
///
/// The discriminant is the AFS_SEL code written to ACCEL_CONFIG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AccelRange {
    /// +-2g
    G2 = 0,
    /// +-4g
    G4 = 1,
    /// +-8g
    G8 = 2,
    /// +-16g
    G16 = 3,
}

impl AccelRange {
    /// Sensitivity of this range in LSB/g.
    pub const fn sensitivity(self) -> f64 {
        match self {
            AccelRange::G2 => ACCEL_SEN_0,
            AccelRange::G4 => ACCEL_SEN_1,
            AccelRange::G8 => ACCEL_SEN_2,
            AccelRange::G16 => ACCEL_SEN_3,
        }
    }
}

impl From<AccelRange> for u8 {
    fn from(range: AccelRange) -> Self {
        range as u8
    }
}

/// Gyro full scale options as specified in the data sheet in degrees per second (dps).
///
/// The discriminant is the FS_SEL code written to GYRO_CONFIG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GyroRange {
    /// +-250 dps
    Dps250 = 0,
    /// +-500 dps
    Dps500 = 1,
    /// +-1000 dps
    Dps1000 = 2,
    /// +-2000 dps
    Dps2000 = 3,
}

impl GyroRange {
    /// Sensitivity of this range in LSB/dps.
    pub const fn sensitivity(self) -> f64 {
        match self {
            GyroRange::Dps250 => GYRO_SEN_0,
            GyroRange::Dps500 => GYRO_SEN_1,
            GyroRange::Dps1000 => GYRO_SEN_2,
            GyroRange::Dps2000 => GYRO_SEN_3,
        }
    }
}

impl From<GyroRange> for u8 {
    fn from(range: GyroRange) -> Self {
        range as u8
    }
}

/// Settings the driver applies during [`init`](i2c::Mpu6050::init).
///
/// Full scale settings are kept as raw codes so the driver can also be handed codes
/// outside the [`GyroRange`] and [`AccelRange`] tables; those convert with the 16384 LSB fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub(crate) gyro_fs: u8,
    pub(crate) accel_fs: u8,
    pub(crate) sample_rate: u16,
    pub(crate) ad0: bool,
}

impl Config {
    /// 250 dps, 2g, 100 Hz with AD0 driven high.
    pub const fn new() -> Self {
        Self {
            gyro_fs: GyroRange::Dps250 as u8,
            accel_fs: AccelRange::G2 as u8,
            sample_rate: 100,
            ad0: true,
        }
    }

    /// Sets the gyro full scale range.
    #[must_use]
    pub const fn with_gyro_range(self, range: GyroRange) -> Self {
        self.with_gyro_code(range as u8)
    }

    /// Sets the raw FS_SEL code.
    #[must_use]
    pub const fn with_gyro_code(mut self, code: u8) -> Self {
        self.gyro_fs = code;
        self
    }

    /// Sets the accelerometer full scale range.
    #[must_use]
    pub const fn with_accel_range(self, range: AccelRange) -> Self {
        self.with_accel_code(range as u8)
    }

    /// Sets the raw AFS_SEL code.
    #[must_use]
    pub const fn with_accel_code(mut self, code: u8) -> Self {
        self.accel_fs = code;
        self
    }

    /// Sets the requested sample rate in Hz. It is clamped to 4..=1000 when applied.
    #[must_use]
    pub const fn with_sample_rate(mut self, rate: u16) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Sets the level the AD0 pin is driven to.
    #[must_use]
    pub const fn with_ad0_level(mut self, level: PinState) -> Self {
        self.ad0 = matches!(level, PinState::High);
        self
    }

    /// Level the AD0 pin is driven to.
    pub const fn ad0_level(&self) -> PinState {
        if self.ad0 {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// The possible errors that the driver can return.
///
/// `E` is the error type of the I2C bus. The `ResetFailed` and `ConfigFailed` variants are bus errors
/// that happened during a specific phase of [`init`](i2c::Mpu6050::init); outside of `init` every bus
/// failure is a `BusError`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MpuError<E> {
    /// An error occurred when using the bus
    BusError(E),
    /// WHO_AM_I did not read back 0x68. Holds the value that was read.
    IdentityMismatch(u8),
    /// The bus failed while resetting the device during init
    ResetFailed(E),
    /// The bus failed while configuring the device during init
    ConfigFailed(E),
    /// An invalid input was passed to the function
    InvalidInput,
}

impl<E> MpuError<E> {
    // Re-tags a bus error with the init phase it happened in.
    fn in_phase(self, phase: fn(E) -> Self) -> Self {
        match self {
            MpuError::BusError(e) => phase(e),
            other => other,
        }
    }
}

impl<E> From<E> for MpuError<E> {
    fn from(error: E) -> Self {
        MpuError::BusError(error)
    }
}

/// Registers of the device that the driver touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Registers {
    /// SMPLRT_DIV
    SmplrtDiv,
    /// CONFIG (DLPF_CFG lives here)
    Config,
    /// GYRO_CONFIG
    GyroConfig,
    /// ACCEL_CONFIG
    AccelConfig,
    /// FIFO_EN
    FifoEn,
    /// INT_PIN_CFG
    IntPinCfg,
    /// INT_ENABLE
    IntEnable,
    /// ACCEL_XOUT_H, first byte of the accelerometer block
    AccelXOutH,
    /// ACCEL_XOUT_L
    AccelXOutL,
    /// ACCEL_YOUT_H
    AccelYOutH,
    /// ACCEL_YOUT_L
    AccelYOutL,
    /// ACCEL_ZOUT_H
    AccelZOutH,
    /// ACCEL_ZOUT_L
    AccelZOutL,
    /// TEMP_OUT_H
    TempOutH,
    /// TEMP_OUT_L
    TempOutL,
    /// GYRO_XOUT_H, first byte of the gyro block
    GyroXOutH,
    /// GYRO_XOUT_L
    GyroXOutL,
    /// GYRO_YOUT_H
    GyroYOutH,
    /// GYRO_YOUT_L
    GyroYOutL,
    /// GYRO_ZOUT_H
    GyroZOutH,
    /// GYRO_ZOUT_L
    GyroZOutL,
    /// USER_CTRL
    UserCtrl,
    /// PWR_MGMT_1
    PwrMgmt1,
    /// PWR_MGMT_2
    PwrMgmt2,
    /// WHO_AM_I
    WhoAmI,
}

impl Registers {
    /// Byte address of the register.
    pub const fn addr(self) -> u8 {
        match self {
            Registers::SmplrtDiv => 0x19,
            Registers::Config => 0x1A,
            Registers::GyroConfig => 0x1B,
            Registers::AccelConfig => 0x1C,
            Registers::FifoEn => 0x23,
            Registers::IntPinCfg => 0x37,
            Registers::IntEnable => 0x38,
            Registers::AccelXOutH => 0x3B,
            Registers::AccelXOutL => 0x3C,
            Registers::AccelYOutH => 0x3D,
            Registers::AccelYOutL => 0x3E,
            Registers::AccelZOutH => 0x3F,
            Registers::AccelZOutL => 0x40,
            Registers::TempOutH => 0x41,
            Registers::TempOutL => 0x42,
            Registers::GyroXOutH => 0x43,
            Registers::GyroXOutL => 0x44,
            Registers::GyroYOutH => 0x45,
            Registers::GyroYOutL => 0x46,
            Registers::GyroZOutH => 0x47,
            Registers::GyroZOutL => 0x48,
            Registers::UserCtrl => 0x6A,
            Registers::PwrMgmt1 => 0x6B,
            Registers::PwrMgmt2 => 0x6C,
            Registers::WhoAmI => 0x75,
        }
    }
}
