// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

//! Device agnostic driver for the MPU-6050 IMU (inertial measurement unit).
//! The driver depends on embedded-hal 1.0, so as long as the HAL you use implements those traits, then
//! this driver should be compatible.
//!
//! The register map for this device can be found [here](https://invensense.tdk.com/wp-content/uploads/2015/02/MPU-6000-Register-Map1.pdf).
//!
//! The driver owns the I2C bus, the AD0 address-select pin and (optionally) the INT pin. The AD0 pin is
//! driven during [`init`](mpu6050::i2c::Mpu6050::init) and decides which of the two bus addresses the
//! device answers on. The INT pin is only held so the application can get it back with `release`.
//!
//! A typical application initializes the device once and then calls
//! [`on_data_ready`](mpu6050::i2c::Mpu6050::on_data_ready) from its data-ready interrupt:
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{OutputPin, PinState};
//! use embedded_hal::i2c::I2c;
//! use mpu6050_driver::mpu6050::i2c::Mpu6050;
//! use mpu6050_driver::mpu6050::{AccelRange, Config, GyroRange, Sample};
//!
//! fn run<I2C: I2c, AD0: OutputPin, D: DelayNs>(i2c: I2C, ad0: AD0, delay: &mut D) {
//!     let config = Config::new()
//!         .with_gyro_range(GyroRange::Dps500)
//!         .with_accel_range(AccelRange::G4)
//!         .with_sample_rate(200)
//!         .with_ad0_level(PinState::High);
//!     let mut imu = Mpu6050::new(i2c, ad0, config);
//!     if imu.init(delay).is_err() {
//!         return;
//!     }
//!
//!     let mut sample = Sample::new();
//!     if imu.on_data_ready(&mut sample).is_ok() {
//!         let _ax = sample.accel[0];
//!     }
//! }
//! ```
//!
//! Logging goes through `defmt` when the `defmt` feature is enabled and compiles away otherwise.
//!
//! Currently, there is no support for the FIFO, the auxiliary I2C master, FSYNC, the motion interrupts or the DMP.

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

/// Main module that holds the I2C driver and the data types it produces.
/// Also holds the register map, ranges and constants.
pub mod mpu6050;
