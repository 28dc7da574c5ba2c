// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use embedded_hal::i2c::I2c;

use crate::mpu6050::i2c::Mpu6050;
use crate::mpu6050::{MpuError, Sample};

/// What to do when the device raises its data ready interrupt.
///
/// [`Mpu6050::on_data_ready`] runs [`AccelGyro`]. Pass any other implementation to
/// [`Mpu6050::on_data_ready_with`] to change what a cycle reads, e.g. skip the gyro or add the temperature.
/// Closures with the matching signature implement this trait too.
pub trait Acquisition<I2C: I2c, AD0, INT> {
    /// Run one acquisition cycle into `sample`.
    fn acquire(
        &mut self,
        imu: &mut Mpu6050<I2C, AD0, INT>,
        sample: &mut Sample,
    ) -> Result<(), MpuError<I2C::Error>>;
}

/// Reads and converts the accelerometer then the gyro.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccelGyro;

/// Same as [`AccelGyro`], followed by the temperature sensor.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccelGyroTemp;

impl<I2C: I2c, AD0, INT> Acquisition<I2C, AD0, INT> for AccelGyro {
    fn acquire(
        &mut self,
        imu: &mut Mpu6050<I2C, AD0, INT>,
        sample: &mut Sample,
    ) -> Result<(), MpuError<I2C::Error>> {
        imu.read_accel_raw(sample)?;
        imu.read_gyro_raw(sample)?;
        imu.convert_accel(sample);
        imu.convert_gyro(sample);
        Ok(())
    }
}

impl<I2C: I2c, AD0, INT> Acquisition<I2C, AD0, INT> for AccelGyroTemp {
    fn acquire(
        &mut self,
        imu: &mut Mpu6050<I2C, AD0, INT>,
        sample: &mut Sample,
    ) -> Result<(), MpuError<I2C::Error>> {
        AccelGyro.acquire(imu, sample)?;
        imu.read_temp_raw(sample)?;
        imu.convert_temp(sample);
        Ok(())
    }
}

impl<F, I2C: I2c, AD0, INT> Acquisition<I2C, AD0, INT> for F
where
    F: FnMut(&mut Mpu6050<I2C, AD0, INT>, &mut Sample) -> Result<(), MpuError<I2C::Error>>,
{
    fn acquire(
        &mut self,
        imu: &mut Mpu6050<I2C, AD0, INT>,
        sample: &mut Sample,
    ) -> Result<(), MpuError<I2C::Error>> {
        self(imu, sample)
    }
}
