// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::i2c::I2c;

use crate::mpu6050::bits::{DlpfConfig, FifoEn, IntEnable, IntPinCfg, PwrMgmt1, UserCtrl};
use crate::mpu6050::handler::{AccelGyro, Acquisition};
use crate::mpu6050::sample::scale_axes;
use crate::mpu6050::{
    accel_lsb_per_g, decode_be_axes, gyro_lsb_per_dps, resolve_address, temp_celsius,
};
use crate::mpu6050::{AccelRange, Config, GyroRange, MpuError, Registers, Sample};
use crate::mpu6050::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, RESET_DELAY_MS, WHO_AM_I_VALUE};

/// Clamps a requested sample rate into the range the divider can express.
pub fn clamp_sample_rate(rate: u16) -> u16 {
    rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
}

/// SMPLRT_DIV value for a requested rate in Hz. The rate is clamped first.
///
/// The output rate is 1kHz / (1 + divider) while the low pass filter is enabled.
pub fn sample_rate_divider(rate: u16) -> u8 {
    (1_000 / clamp_sample_rate(rate) - 1) as u8
}

/// DLPF_CFG code for a requested cutoff frequency in Hz.
///
/// Picks the first setting whose bandwidth does not exceed the request, narrowest being code 6.
/// Code 0 (260Hz, filter effectively off) is never returned.
pub fn dlpf_code_for(cutoff: u16) -> u8 {
    if cutoff >= 188 {
        1
    } else if cutoff >= 98 {
        2
    } else if cutoff >= 42 {
        3
    } else if cutoff >= 20 {
        4
    } else if cutoff >= 10 {
        5
    } else {
        6
    }
}

/// The MPU-6050 IMU struct is the base of the driver. Instantiate this struct in your application code then use
/// it to interact with the IMU.
///
/// `AD0` is the output pin wired to the address select input of the device. `INT` is the pin wired to
/// the device's interrupt output. The driver never touches it, it is only kept so it can be released together
/// with the bus.
pub struct Mpu6050<I2C, AD0, INT = ()> {
    bus: I2C,
    ad0: AD0,
    ad0_level: PinState,
    int_pin: Option<INT>,

    gyro_fs: u8,
    accel_fs: u8,
    sample_rate: u16,

    // 8-bit address, 0 until init resolves it
    addr: u8,
}

impl<I2C, AD0> Mpu6050<I2C, AD0> {
    /// Create a new IMU driver. Nothing is sent on the bus until [`init`](Mpu6050::init) is called.
    ///
    /// The I2C bus is given as `bus` and the address select pin as `ad0`.
    pub fn new(bus: I2C, ad0: AD0, config: Config) -> Self {
        Mpu6050::with_int_pin(bus, ad0, None, config)
    }
}

impl<I2C, AD0, INT> Mpu6050<I2C, AD0, INT> {
    /// Create a new IMU driver that also holds the pin connected to the device's INT output.
    pub fn with_int_pin(bus: I2C, ad0: AD0, int_pin: Option<INT>, config: Config) -> Self {
        Mpu6050 {
            bus,
            ad0,
            ad0_level: config.ad0_level(),
            int_pin,
            gyro_fs: config.gyro_fs,
            accel_fs: config.accel_fs,
            sample_rate: config.sample_rate,
            addr: 0,
        }
    }

    /// The resolved 8-bit bus address (`0xD0` or `0xD2`). Returns 0 before [`init`](Mpu6050::init).
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Level the AD0 pin is driven to during init.
    pub fn ad0_level(&self) -> PinState {
        self.ad0_level
    }

    /// The gyro FS_SEL code last applied or configured.
    pub fn gyro_scale(&self) -> u8 {
        self.gyro_fs
    }

    /// The accelerometer AFS_SEL code last applied or configured.
    pub fn accel_scale(&self) -> u8 {
        self.accel_fs
    }

    /// The gyro range, if the stored code is one of the documented ones.
    pub fn gyro_range(&self) -> Option<GyroRange> {
        GyroRange::from_repr(self.gyro_fs)
    }

    /// The accelerometer range, if the stored code is one of the documented ones.
    pub fn accel_range(&self) -> Option<AccelRange> {
        AccelRange::from_repr(self.accel_fs)
    }

    /// The sample rate in Hz. Clamped to 4..=1000 once it has been applied.
    pub fn sampling_rate(&self) -> u16 {
        self.sample_rate
    }

    /// The interrupt pin, if one was given.
    pub fn int_pin(&mut self) -> Option<&mut INT> {
        self.int_pin.as_mut()
    }

    /// Consumes the driver and gives back the bus and the pins.
    pub fn release(self) -> (I2C, AD0, Option<INT>) {
        (self.bus, self.ad0, self.int_pin)
    }

    // embedded-hal wants the 7-bit address
    fn bus_addr(&self) -> u8 {
        self.addr >> 1
    }
}

impl<I2C, AD0, INT> Mpu6050<I2C, AD0, INT>
where
    I2C: I2c,
    AD0: OutputPin,
{
    /// Initialize the IMU.
    ///
    /// Drives AD0, resolves the bus address, checks WHO_AM_I, resets the device, applies the stored
    /// gyro range, accelerometer range and sample rate, then enables the data ready interrupt on an active
    /// low INT pin with the FIFO turned off.
    ///
    /// Fails fast. There is no rollback, so after an error the device state is unknown and `init` should be run again.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MpuError<I2C::Error>> {
        if self.ad0.set_state(self.ad0_level).is_err() {
            warn!("Could not drive AD0, the device may answer on the other address");
        }
        self.addr = resolve_address(self.ad0_level);
        debug!("MPU-6050 bus address {=u8:#x}", self.addr);

        let wai = self.wai()?;
        if wai != WHO_AM_I_VALUE {
            warn!("WHO_AM_I mismatch: {=u8:#x}", wai);
            return Err(MpuError::IdentityMismatch(wai));
        }

        self.reset(delay)
            .map_err(|e| e.in_phase(MpuError::ResetFailed))?;
        debug!("IMU reset!");

        self.apply_config()
            .map_err(|e| e.in_phase(MpuError::ConfigFailed))?;
        self.enable_data_ready_int()
            .map_err(|e| e.in_phase(MpuError::ConfigFailed))?;

        debug!(
            "IMU ready: gyro code {=u8}, accel code {=u8}, {=u16} Hz",
            self.gyro_fs,
            self.accel_fs,
            self.sample_rate
        );
        Ok(())
    }
}

impl<I2C, AD0, INT> Mpu6050<I2C, AD0, INT>
where
    I2C: I2c,
{
    // ----------------- Registers ----------------- //
    /// Writes one register.
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), MpuError<I2C::Error>> {
        let addr = self.bus_addr();
        self.bus.write(addr, &[reg, value])?;
        Ok(())
    }

    /// Reads one register.
    pub fn read_register(&mut self, reg: u8) -> Result<u8, MpuError<I2C::Error>> {
        let mut buf = [0];
        let addr = self.bus_addr();
        self.bus.write_read(addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Writes `values[i]` to `regs[i]`, one register at a time and in order.
    ///
    /// Stops at the first failure. Registers written before it keep their new value.
    pub fn write_registers(&mut self, regs: &[u8], values: &[u8]) -> Result<(), MpuError<I2C::Error>> {
        if regs.len() != values.len() {
            return Err(MpuError::InvalidInput);
        }
        for (&reg, &value) in regs.iter().zip(values) {
            self.write_register(reg, value)?;
        }
        Ok(())
    }

    /// Reads `regs[i]` into `values[i]`, one register at a time and in order.
    ///
    /// Stops at the first failure. Values read before it are left in `values`.
    pub fn read_registers(&mut self, regs: &[u8], values: &mut [u8]) -> Result<(), MpuError<I2C::Error>> {
        if regs.len() != values.len() {
            return Err(MpuError::InvalidInput);
        }
        for (&reg, value) in regs.iter().zip(values.iter_mut()) {
            *value = self.read_register(reg)?;
        }
        Ok(())
    }

    /// Burst reads `buf.len()` consecutive registers starting at `start`.
    pub fn read_block(&mut self, start: u8, buf: &mut [u8]) -> Result<(), MpuError<I2C::Error>> {
        let addr = self.bus_addr();
        self.bus.write_read(addr, &[start], buf)?;
        Ok(())
    }

    /// Who Am I? Reads the wai register and reports the value.
    ///
    /// Useful for testing that the IMU is properly connected. The expected value is 0x68.
    pub fn wai(&mut self) -> Result<u8, MpuError<I2C::Error>> {
        self.read_register(Registers::WhoAmI.addr())
    }

    // ----------------- Reset ----------------- //
    /// Resets the IMU, waits for it to come back then selects the gyro PLL clock and enables every axis.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), MpuError<I2C::Error>> {
        let mut pwr = PwrMgmt1::empty();
        pwr.set_device_reset(true);
        self.write_register(Registers::PwrMgmt1.addr(), pwr.bits())?;

        delay.delay_ms(RESET_DELAY_MS);

        let mut pwr = PwrMgmt1::empty();
        pwr.set_clksel(1);
        self.write_register(Registers::PwrMgmt1.addr(), pwr.bits())?;
        self.write_register(Registers::PwrMgmt2.addr(), 0x00)?;

        Ok(())
    }

    // ----------------- Configuration ----------------- //
    /// Sets the gyro full scale from an FS_SEL code and remembers it for conversions.
    ///
    /// The code is stored before the write, so it is kept even if the bus fails.
    pub fn set_gyro_scale(&mut self, code: u8) -> Result<(), MpuError<I2C::Error>> {
        self.gyro_fs = code;
        self.write_register(Registers::GyroConfig.addr(), code << 3)
    }

    /// Sets the accelerometer full scale from an AFS_SEL code and remembers it for conversions.
    ///
    /// The code is stored before the write, so it is kept even if the bus fails.
    pub fn set_accel_scale(&mut self, code: u8) -> Result<(), MpuError<I2C::Error>> {
        self.accel_fs = code;
        self.write_register(Registers::AccelConfig.addr(), code << 3)
    }

    /// Sets the gyro full scale range.
    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), MpuError<I2C::Error>> {
        self.set_gyro_scale(range.into())
    }

    /// Sets the accelerometer full scale range.
    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), MpuError<I2C::Error>> {
        self.set_accel_scale(range.into())
    }

    /// Configures the digital Low Pass Filter (LPF) shared by the gyro and the accelerometer.
    ///
    /// `cutoff` is the requested bandwidth in Hz, see [`dlpf_code_for`]. Returns the DLPF_CFG code written.
    pub fn set_low_pass_filter(&mut self, cutoff: u16) -> Result<u8, MpuError<I2C::Error>> {
        let mut cfg = DlpfConfig::empty();
        cfg.set_dlpf_cfg(dlpf_code_for(cutoff));
        self.write_register(Registers::Config.addr(), cfg.bits())?;
        Ok(cfg.dlpf_cfg())
    }

    /// Configure the output data rate, in Hz.
    ///
    /// `rate` is clamped to 4..=1000 and stored. Since the divisor is an integer, the exact rate may not be met.
    /// The low pass filter is then set to half the rate.
    pub fn set_sampling_rate(&mut self, rate: u16) -> Result<(), MpuError<I2C::Error>> {
        let rate = clamp_sample_rate(rate);
        self.sample_rate = rate;
        self.write_register(Registers::SmplrtDiv.addr(), sample_rate_divider(rate))?;
        self.set_low_pass_filter(rate / 2)?;
        Ok(())
    }

    fn apply_config(&mut self) -> Result<(), MpuError<I2C::Error>> {
        self.set_gyro_scale(self.gyro_fs)?;
        self.set_accel_scale(self.accel_fs)?;
        self.set_sampling_rate(self.sample_rate)
    }

    fn enable_data_ready_int(&mut self) -> Result<(), MpuError<I2C::Error>> {
        let mut int_enable = IntEnable::empty();
        int_enable.set_data_rdy_en(true);
        let mut int_pin = IntPinCfg::empty();
        int_pin.set_int_level(true);

        let regs = [
            Registers::IntEnable.addr(),
            Registers::UserCtrl.addr(),
            Registers::FifoEn.addr(),
            Registers::IntPinCfg.addr(),
        ];
        let values = [
            int_enable.bits(),
            UserCtrl::empty().bits(),
            FifoEn::empty().bits(),
            int_pin.bits(),
        ];
        self.write_registers(&regs, &values)
    }

    // ----------------- Acquisition ----------------- //
    /// Reads the three accelerometer axes into `sample.accel_raw`.
    pub fn read_accel_raw(&mut self, sample: &mut Sample) -> Result<(), MpuError<I2C::Error>> {
        let mut block = [0; 6];
        self.read_block(Registers::AccelXOutH.addr(), &mut block)?;
        sample.accel_raw = decode_be_axes(&block);
        Ok(())
    }

    /// Reads the three gyro axes into `sample.gyro_raw`.
    pub fn read_gyro_raw(&mut self, sample: &mut Sample) -> Result<(), MpuError<I2C::Error>> {
        let mut block = [0; 6];
        self.read_block(Registers::GyroXOutH.addr(), &mut block)?;
        sample.gyro_raw = decode_be_axes(&block);
        Ok(())
    }

    /// Reads the temperature sensor into `sample.temp_raw`.
    pub fn read_temp_raw(&mut self, sample: &mut Sample) -> Result<(), MpuError<I2C::Error>> {
        let mut word = [0; 2];
        self.read_block(Registers::TempOutH.addr(), &mut word)?;
        sample.temp_raw = i16::from_be_bytes(word);
        Ok(())
    }

    /// Converts `sample.accel_raw` into g using the current accelerometer range.
    pub fn convert_accel(&self, sample: &mut Sample) {
        scale_axes(&sample.accel_raw, accel_lsb_per_g(self.accel_fs), &mut sample.accel);
    }

    /// Converts `sample.gyro_raw` into degrees per second using the current gyro range.
    pub fn convert_gyro(&self, sample: &mut Sample) {
        scale_axes(&sample.gyro_raw, gyro_lsb_per_dps(self.gyro_fs), &mut sample.gyro);
    }

    /// Converts `sample.temp_raw` into Celsius.
    pub fn convert_temp(&self, sample: &mut Sample) {
        sample.temp = temp_celsius(sample.temp_raw);
    }

    // ----------------- Data ready ----------------- //
    /// Call this from the data ready interrupt. Reads and converts the accelerometer and the gyro.
    ///
    /// The driver holds no lock; the caller must not run two cycles at once.
    pub fn on_data_ready(&mut self, sample: &mut Sample) -> Result<(), MpuError<I2C::Error>> {
        self.on_data_ready_with(&mut AccelGyro, sample)
    }

    /// Same as [`on_data_ready`](Mpu6050::on_data_ready) with a different acquisition policy.
    pub fn on_data_ready_with<P>(&mut self, policy: &mut P, sample: &mut Sample) -> Result<(), MpuError<I2C::Error>>
    where
        P: Acquisition<I2C, AD0, INT>,
    {
        let res = policy.acquire(self, sample);
        if res.is_ok() {
            trace!("accel {=i16} {=i16} {=i16}", sample.accel_raw[0], sample.accel_raw[1], sample.accel_raw[2]);
        }
        res
    }
}

#[cfg(feature = "defmt")]
impl<I2C, AD0, INT> defmt::Format for Mpu6050<I2C, AD0, INT> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "MPU-6050 IMU @ {=u8:#x}", self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpu6050::AccelGyroTemp;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinMockState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x69;

    type Imu = Mpu6050<I2cMock, PinMock>;

    #[derive(Default)]
    struct RecordingDelay {
        calls: u32,
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_ns += u64::from(ns);
        }
    }

    fn write(reg: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(ADDR, vec![reg, value])
    }

    fn read(reg: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![reg], vec![value])
    }

    fn failing_write(reg: u8, value: u8) -> I2cTransaction {
        write(reg, value).with_error(ErrorKind::Other)
    }

    fn reset_writes() -> Vec<I2cTransaction> {
        vec![write(0x6B, 0x80), write(0x6B, 0x01), write(0x6C, 0x00)]
    }

    // Driver with its address already resolved, as after init.
    fn ready_imu(i2c: &I2cMock, pin: &PinMock, config: Config) -> Imu {
        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), config);
        imu.addr = resolve_address(PinState::High);
        imu
    }

    #[test]
    fn divider_and_filter_tables() {
        assert_eq!(sample_rate_divider(100), 9);
        assert_eq!(sample_rate_divider(1000), 0);
        assert_eq!(sample_rate_divider(1), 249);
        assert_eq!(sample_rate_divider(4), 249);
        assert_eq!(sample_rate_divider(u16::MAX), 0);
        assert_eq!(sample_rate_divider(300), 2);

        assert_eq!(dlpf_code_for(u16::MAX), 1);
        assert_eq!(dlpf_code_for(188), 1);
        assert_eq!(dlpf_code_for(187), 2);
        assert_eq!(dlpf_code_for(98), 2);
        assert_eq!(dlpf_code_for(97), 3);
        assert_eq!(dlpf_code_for(42), 3);
        assert_eq!(dlpf_code_for(41), 4);
        assert_eq!(dlpf_code_for(20), 4);
        assert_eq!(dlpf_code_for(19), 5);
        assert_eq!(dlpf_code_for(10), 5);
        assert_eq!(dlpf_code_for(9), 6);
        assert_eq!(dlpf_code_for(0), 6);
        assert!((0..=u16::MAX).all(|c| dlpf_code_for(c) != 0));
    }

    #[test]
    fn init_runs_the_full_sequence() {
        let mut expectations = vec![read(0x75, 0x68)];
        expectations.extend(reset_writes());
        expectations.extend([
            write(0x1B, 0x08),
            write(0x1C, 0x10),
            write(0x19, 4),
            write(0x1A, 2),
            write(0x38, 0x01),
            write(0x6A, 0x00),
            write(0x23, 0x00),
            write(0x37, 0x80),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let mut pin = PinMock::new(&[PinTransaction::set(PinMockState::High)]);
        let mut delay = RecordingDelay::default();

        let config = Config::new()
            .with_gyro_range(GyroRange::Dps500)
            .with_accel_range(AccelRange::G8)
            .with_sample_rate(200);
        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), config);
        assert_eq!(imu.address(), 0);

        assert_eq!(imu.init(&mut delay), Ok(()));
        assert_eq!(imu.address(), 0xD2);
        assert_eq!(imu.gyro_range(), Some(GyroRange::Dps500));
        assert_eq!(imu.accel_range(), Some(AccelRange::G8));
        assert_eq!(imu.sampling_rate(), 200);
        assert_eq!(delay.total_ns, 100_000_000);

        i2c.done();
        pin.done();
    }

    #[test]
    fn init_with_ad0_low_uses_the_base_address() {
        let mut expectations = vec![I2cTransaction::write_read(0x68, vec![0x75], vec![0x68])];
        for (reg, value) in [
            (0x6B, 0x80),
            (0x6B, 0x01),
            (0x6C, 0x00),
            (0x1B, 0x00),
            (0x1C, 0x00),
            (0x19, 9),
            (0x1A, 3),
            (0x38, 0x01),
            (0x6A, 0x00),
            (0x23, 0x00),
            (0x37, 0x80),
        ] {
            expectations.push(I2cTransaction::write(0x68, vec![reg, value]));
        }
        let mut i2c = I2cMock::new(&expectations);
        let mut pin = PinMock::new(&[PinTransaction::set(PinMockState::Low)]);

        let config = Config::new().with_ad0_level(PinState::Low);
        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), config);
        assert_eq!(imu.init(&mut RecordingDelay::default()), Ok(()));
        assert_eq!(imu.address(), 0xD0);

        i2c.done();
        pin.done();
    }

    #[test]
    fn init_stops_on_identity_mismatch() {
        let mut i2c = I2cMock::new(&[read(0x75, 0x70)]);
        let mut pin = PinMock::new(&[PinTransaction::set(PinMockState::High)]);
        let mut delay = RecordingDelay::default();

        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), Config::new());
        assert_eq!(imu.init(&mut delay), Err(MpuError::IdentityMismatch(0x70)));
        assert_eq!(delay.calls, 0);

        i2c.done();
        pin.done();
    }

    #[test]
    fn init_reports_reset_failures() {
        let mut i2c = I2cMock::new(&[read(0x75, 0x68), failing_write(0x6B, 0x80)]);
        let mut pin = PinMock::new(&[PinTransaction::set(PinMockState::High)]);
        let mut delay = RecordingDelay::default();

        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), Config::new());
        assert_eq!(imu.init(&mut delay), Err(MpuError::ResetFailed(ErrorKind::Other)));
        assert_eq!(delay.calls, 0);

        i2c.done();
        pin.done();
    }

    #[test]
    fn init_reports_config_failures_and_stops() {
        let mut expectations = vec![read(0x75, 0x68)];
        expectations.extend(reset_writes());
        expectations.extend([write(0x1B, 0x00), write(0x1C, 0x00), failing_write(0x19, 9)]);
        let mut i2c = I2cMock::new(&expectations);
        let mut pin = PinMock::new(&[PinTransaction::set(PinMockState::High)]);

        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), Config::new());
        assert_eq!(
            imu.init(&mut RecordingDelay::default()),
            Err(MpuError::ConfigFailed(ErrorKind::Other))
        );

        i2c.done();
        pin.done();
    }

    #[test]
    fn init_reports_interrupt_setup_failures() {
        let mut expectations = vec![read(0x75, 0x68)];
        expectations.extend(reset_writes());
        expectations.extend([
            write(0x1B, 0x00),
            write(0x1C, 0x00),
            write(0x19, 9),
            write(0x1A, 3),
            write(0x38, 0x01),
            failing_write(0x6A, 0x00),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let mut pin = PinMock::new(&[PinTransaction::set(PinMockState::High)]);

        let mut imu = Mpu6050::new(i2c.clone(), pin.clone(), Config::new());
        assert_eq!(
            imu.init(&mut RecordingDelay::default()),
            Err(MpuError::ConfigFailed(ErrorKind::Other))
        );

        i2c.done();
        pin.done();
    }

    #[test]
    fn reset_outside_init_is_a_bus_error() {
        let mut i2c = I2cMock::new(&[write(0x6B, 0x80), failing_write(0x6B, 0x01)]);
        let mut pin = PinMock::new(&[]);
        let mut delay = RecordingDelay::default();

        let mut imu = ready_imu(&i2c, &pin, Config::new());
        assert_eq!(imu.reset(&mut delay), Err(MpuError::BusError(ErrorKind::Other)));
        assert_eq!(delay.calls, 1);

        i2c.done();
        pin.done();
    }

    #[test]
    fn sampling_rate_is_clamped_and_drives_the_filter() {
        let mut i2c = I2cMock::new(&[
            write(0x19, 249),
            write(0x1A, 6),
            write(0x19, 0),
            write(0x1A, 1),
            write(0x19, 9),
            write(0x1A, 3),
        ]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        imu.set_sampling_rate(1).unwrap();
        assert_eq!(imu.sampling_rate(), 4);
        imu.set_sampling_rate(5000).unwrap();
        assert_eq!(imu.sampling_rate(), 1000);
        imu.set_sampling_rate(100).unwrap();
        assert_eq!(imu.sampling_rate(), 100);

        i2c.done();
        pin.done();
    }

    #[test]
    fn sampling_rate_stops_at_the_divider_failure() {
        let mut i2c = I2cMock::new(&[failing_write(0x19, 4)]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        assert_eq!(imu.set_sampling_rate(200), Err(MpuError::BusError(ErrorKind::Other)));
        assert_eq!(imu.sampling_rate(), 200);

        i2c.done();
        pin.done();
    }

    #[test]
    fn scale_setters_shift_the_code() {
        let mut i2c = I2cMock::new(&[write(0x1B, 0x18), write(0x1C, 0x08), write(0x1B, 0x28)]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        imu.set_gyro_range(GyroRange::Dps2000).unwrap();
        imu.set_accel_range(AccelRange::G4).unwrap();
        assert_eq!(imu.accel_scale(), 1);

        imu.set_gyro_scale(5).unwrap();
        assert_eq!(imu.gyro_scale(), 5);
        assert_eq!(imu.gyro_range(), None);

        let mut sample = Sample::new();
        sample.gyro_raw = [16_384, -8_192, 0];
        imu.convert_gyro(&mut sample);
        assert_eq!(sample.gyro, [1.0, -0.5, 0.0]);

        i2c.done();
        pin.done();
    }

    #[test]
    fn low_pass_filter_returns_the_written_code() {
        let mut i2c = I2cMock::new(&[write(0x1A, 1), write(0x1A, 5)]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        assert_eq!(imu.set_low_pass_filter(500), Ok(1));
        assert_eq!(imu.set_low_pass_filter(12), Ok(5));

        i2c.done();
        pin.done();
    }

    #[test]
    fn batch_write_keeps_writes_before_the_failure() {
        let mut i2c = I2cMock::new(&[
            write(0x38, 0x01),
            write(0x6A, 0x00),
            failing_write(0x23, 0x00),
        ]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        let regs = [0x38, 0x6A, 0x23, 0x37];
        let values = [0x01, 0x00, 0x00, 0x80];
        assert_eq!(
            imu.write_registers(&regs, &values),
            Err(MpuError::BusError(ErrorKind::Other))
        );

        // the fourth register was never attempted
        i2c.done();
        pin.done();
    }

    #[test]
    fn batch_read_fills_values_up_to_the_failure() {
        let mut i2c = I2cMock::new(&[
            read(0x75, 0x68),
            read(0x6B, 0x01),
            I2cTransaction::write_read(ADDR, vec![0x6C], vec![0x00]).with_error(ErrorKind::Other),
        ]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        let mut values = [0xAA; 4];
        assert_eq!(
            imu.read_registers(&[0x75, 0x6B, 0x6C, 0x1A], &mut values),
            Err(MpuError::BusError(ErrorKind::Other))
        );
        assert_eq!(values, [0x68, 0x01, 0xAA, 0xAA]);

        i2c.done();
        pin.done();
    }

    #[test]
    fn batch_helpers_reject_mismatched_lengths() {
        let mut i2c = I2cMock::new(&[]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        assert_eq!(imu.write_registers(&[0x38, 0x6A], &[0x01]), Err(MpuError::InvalidInput));
        let mut values = [0; 1];
        assert_eq!(imu.read_registers(&[0x38, 0x6A], &mut values), Err(MpuError::InvalidInput));

        i2c.done();
        pin.done();
    }

    #[test]
    fn data_ready_reads_and_converts_both_sensors() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0x3B], vec![0x40, 0x00, 0xC0, 0x00, 0x20, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x43], vec![0x00, 0x83, 0xFF, 0x7D, 0x00, 0x00]),
        ]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        let mut sample = Sample::new();
        imu.on_data_ready(&mut sample).unwrap();
        assert_eq!(sample.accel_raw, [16_384, -16_384, 8_192]);
        assert_eq!(sample.accel, [1.0, -1.0, 0.5]);
        assert_eq!(sample.accel_raw_bytes(), [0x00, 0x40, 0x00, 0xC0, 0x00, 0x20]);
        assert_eq!(sample.gyro_raw, [131, -131, 0]);
        assert_eq!(sample.gyro, [1.0, -1.0, 0.0]);
        assert_eq!(sample.temp_raw, 0);

        i2c.done();
        pin.done();
    }

    #[test]
    fn data_ready_stops_when_the_accel_read_fails() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0x3B], vec![0; 6]).with_error(ErrorKind::Other),
        ]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new());

        let mut sample = Sample::new();
        sample.gyro = [9.0; 3];
        assert_eq!(
            imu.on_data_ready(&mut sample),
            Err(MpuError::BusError(ErrorKind::Other))
        );
        assert_eq!(sample.gyro, [9.0; 3]);

        i2c.done();
        pin.done();
    }

    #[test]
    fn data_ready_with_temperature_policy() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0x3B], vec![0x10, 0x00, 0x00, 0x00, 0x00, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x43], vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x41], vec![0xFE, 0xAC]),
        ]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new().with_accel_range(AccelRange::G16));

        let mut sample = Sample::new();
        imu.on_data_ready_with(&mut AccelGyroTemp, &mut sample).unwrap();
        assert_eq!(sample.accel, [2.0, 0.0, 0.0]);
        assert_eq!(sample.temp_raw, -340);
        assert!((sample.temp - 35.53).abs() < 1e-4);

        i2c.done();
        pin.done();
    }

    #[test]
    fn data_ready_with_a_closure_policy() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDR,
            vec![0x43],
            vec![0x00, 0x00, 0x00, 0x41, 0xFF, 0xBF],
        )]);
        let mut pin = PinMock::new(&[]);
        let mut imu = ready_imu(&i2c, &pin, Config::new().with_gyro_range(GyroRange::Dps2000));

        let mut gyro_only = |imu: &mut Imu, sample: &mut Sample| -> Result<(), MpuError<ErrorKind>> {
            imu.read_gyro_raw(sample)?;
            imu.convert_gyro(sample);
            Ok(())
        };
        let mut sample = Sample::new();
        imu.on_data_ready_with(&mut gyro_only, &mut sample).unwrap();
        assert_eq!(sample.gyro_raw, [0, 65, -65]);
        assert!((sample.gyro[1] - 65.0 / 16.4).abs() < 1e-12);
        assert_eq!(sample.accel_raw, [0; 3]);

        i2c.done();
        pin.done();
    }

    #[test]
    fn release_hands_back_the_parts() {
        let mut imu: Mpu6050<_, _, u8> = Mpu6050::with_int_pin(
            I2cMock::new(&[]),
            PinMock::new(&[]),
            Some(7),
            Config::new(),
        );
        assert_eq!(imu.int_pin().copied(), Some(7));

        let (mut bus, mut ad0, int_pin) = imu.release();
        assert_eq!(int_pin, Some(7));
        bus.done();
        ad0.done();
    }
}
