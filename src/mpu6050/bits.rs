// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use bitfield::bitfield;

bitfield! {
    /// bitfields of PWR_MGMT_1 register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct PwrMgmt1(u8);
    impl Debug;
    /// reset all internal registers to their default values, self clearing
    pub device_reset, set_device_reset: 7;
    /// put the device into sleep mode
    pub sleep, set_sleep: 6;
    /// cycle between sleep and single samples at LP_WAKE_CTRL rate
    pub cycle, set_cycle: 5;
    /// disable the temperature sensor
    pub temp_dis, set_temp_dis: 3;
    /// clock source, 1 = PLL with X axis gyro reference
    pub u8, clksel, set_clksel: 2, 0;
}

bitfield! {
    /// bitfields of CONFIG register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct DlpfConfig(u8);
    impl Debug;
    /// FSYNC pin sampling
    pub u8, ext_sync_set, set_ext_sync_set: 5, 3;
    /// digital low pass filter setting, 0 = widest bandwidth
    pub u8, dlpf_cfg, set_dlpf_cfg: 2, 0;
}

bitfield! {
    /// bitfields of INT_ENABLE register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct IntEnable(u8);
    impl Debug;
    /// enable FIFO overflow interrupt
    pub fifo_oflow_en, set_fifo_oflow_en: 4;
    /// enable i2c master interrupt sources
    pub i2c_mst_int_en, set_i2c_mst_int_en: 3;
    /// enable data ready interrupt, raised each time all sensor registers are written
    pub data_rdy_en, set_data_rdy_en: 0;
}

bitfield! {
    /// bitfields of INT_PIN_CFG register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct IntPinCfg(u8);
    impl Debug;
    /// INT pin is active low
    pub int_level, set_int_level: 7;
    /// INT pin is open drain
    pub int_open, set_int_open: 6;
    /// INT pin is held active until cleared
    pub latch_int_en, set_latch_int_en: 5;
    /// true = any read operation clears INT_STATUS register
    /// false = only reading INT_STATUS register clear it
    pub int_rd_clear, set_int_rd_clear: 4;
    /// active low logic level for FSYNC pin
    pub fsync_int_level, set_fsync_int_level: 3;
    /// enable FSYNC pin as an interrupt
    pub fsync_int_en, set_fsync_int_en: 2;
    /// set i2c master interface pins to bypass mode when i2c master is disabled
    pub i2c_bypass_en, set_i2c_bypass_en: 1;
}

bitfield! {
    /// bitfields of USER_CTRL register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct UserCtrl(u8);
    impl Debug;
    /// enable FIFO operations
    pub fifo_en, set_fifo_en: 6;
    /// enable the auxiliary i2c master
    pub i2c_mst_en, set_i2c_mst_en: 5;
    /// reset the FIFO buffer
    pub fifo_reset, set_fifo_reset: 2;
    /// reset the auxiliary i2c master
    pub i2c_mst_reset, set_i2c_mst_reset: 1;
    /// reset the signal paths of all sensors
    pub sig_cond_reset, set_sig_cond_reset: 0;
}

bitfield! {
    /// bitfields of FIFO_EN register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct FifoEn(u8);
    impl Debug;
    /// queue TEMP_OUT
    pub temp_fifo_en, set_temp_fifo_en: 7;
    /// queue GYRO_XOUT
    pub xg_fifo_en, set_xg_fifo_en: 6;
    /// queue GYRO_YOUT
    pub yg_fifo_en, set_yg_fifo_en: 5;
    /// queue GYRO_ZOUT
    pub zg_fifo_en, set_zg_fifo_en: 4;
    /// queue ACCEL_*OUT
    pub accel_fifo_en, set_accel_fifo_en: 3;
}

macro_rules! impl_bits {
    ($($reg:ident),*) => {
        $(
            impl $reg {
                /// All bits cleared.
                pub const fn empty() -> Self {
                    $reg(0)
                }

                /// Raw register value.
                pub const fn bits(&self) -> u8 {
                    self.0
                }
            }
        )*
    };
}

impl_bits!(PwrMgmt1, DlpfConfig, IntEnable, IntPinCfg, UserCtrl, FifoEn);
