//! I2S output sink (ESP-IDF standard mode, TX only).
//!
//! One driver per destination. Writes block at most `timeout_ms` and
//! report what the DMA queue took.

use esp_idf_svc::hal::delay::TickType;
use esp_idf_svc::hal::i2s::config::{
    Config, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig, StdSlotConfig,
};
use esp_idf_svc::hal::i2s::{I2sDriver, I2sTx};
use esp_idf_svc::sys::{EspError, ESP_ERR_TIMEOUT};

use super::{AudioSink, SinkError};

/// Philips I2S, 16-bit mono at `sample_rate`.
pub fn mono_config(sample_rate: u32) -> StdConfig {
    StdConfig::new(
        Config::default(),
        StdClkConfig::from_sample_rate_hz(sample_rate),
        StdSlotConfig::philips_slot_default(DataBitWidth::Bits16, SlotMode::Mono),
        StdGpioConfig::default(),
    )
}

/// `AudioSink` over an enabled I2S TX channel
pub struct I2sSink<'d> {
    driver: I2sDriver<'d, I2sTx>,
}

impl<'d> I2sSink<'d> {
    /// Take the driver and enable the channel.
    pub fn new(mut driver: I2sDriver<'d, I2sTx>) -> Result<Self, EspError> {
        driver.tx_enable()?;
        Ok(Self { driver })
    }
}

impl AudioSink for I2sSink<'_> {
    fn write(&mut self, data: &[u8], timeout_ms: u32) -> Result<usize, SinkError> {
        let ticks = TickType::new_millis(timeout_ms as u64).ticks();
        self.driver.write(data, ticks).map_err(|err| {
            if err.code() == ESP_ERR_TIMEOUT as i32 {
                SinkError::Timeout
            } else {
                SinkError::Io(err.code())
            }
        })
    }
}
