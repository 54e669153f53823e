//! DRV2605 haptic motor driver
//!
//! I2C register protocol only, no real-time constraints.
//! Reference: DRV2605 datasheet (TI SLOS854)

use embedded_hal::i2c::I2c;

/// DRV2605 I2C address (fixed)
pub const DRV2605_ADDR: u8 = 0x5A;

/// Highest effect ID of the ROM libraries
pub const MAX_EFFECT: u8 = 123;

/// Waveform sequencer slots
pub const SEQUENCE_SLOTS: usize = 8;

/// DRV2605 register addresses
mod regs {
    pub const STATUS: u8 = 0x00;
    pub const MODE: u8 = 0x01;
    pub const RTPIN: u8 = 0x02;
    pub const LIBRARY: u8 = 0x03;
    pub const WAVESEQ1: u8 = 0x04;
    pub const GO: u8 = 0x0C;
    pub const FEEDBACK: u8 = 0x1A;
}

/// MODE register values
pub mod mode {
    pub const INTTRIG: u8 = 0x00;
    pub const REALTIME: u8 = 0x05;
    pub const STANDBY: u8 = 0x40;
}

/// FEEDBACK bit selecting a linear resonant actuator
const FEEDBACK_LRA: u8 = 0x80;

/// Actuator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorType {
    /// Eccentric rotating mass
    Erm,
    /// Linear resonant actuator
    Lra,
}

/// DRV2605 driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drv2605Error {
    /// I2C communication error
    I2c,
    /// Effect ID outside 1..=123
    InvalidEffect(u8),
    /// Sequence with no valid effect
    EmptySequence,
    /// Library index above 6
    InvalidLibrary(u8),
}

impl core::fmt::Display for Drv2605Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c => write!(f, "i2c error"),
            Self::InvalidEffect(id) => write!(f, "invalid effect {} (1-{})", id, MAX_EFFECT),
            Self::EmptySequence => write!(f, "empty effect sequence"),
            Self::InvalidLibrary(lib) => write!(f, "invalid library {} (0-6)", lib),
        }
    }
}

/// DRV2605 driver
pub struct Drv2605<I2C> {
    i2c: I2C,
    motor: MotorType,
    library: u8,
}

impl<I2C: I2c> Drv2605<I2C> {
    /// Create driver. No bus traffic until `init`.
    ///
    /// # Arguments
    /// * `motor` - actuator type wired to the output
    /// * `library` - ROM library (1-5 for ERM, 6 for LRA, 0 empty)
    pub fn new(i2c: I2C, motor: MotorType, library: u8) -> Self {
        Self { i2c, motor, library }
    }

    /// Probe the chip and put it in internal-trigger mode
    pub fn init(&mut self) -> Result<(), Drv2605Error> {
        if self.library > 6 {
            return Err(Drv2605Error::InvalidLibrary(self.library));
        }

        // Status read doubles as presence check
        self.read_reg(regs::STATUS)?;

        // Leave standby
        self.write_reg(regs::MODE, mode::INTTRIG)?;

        let feedback = match self.motor {
            MotorType::Erm => 0x00,
            MotorType::Lra => FEEDBACK_LRA,
        };
        self.write_reg(regs::FEEDBACK, feedback)?;
        self.write_reg(regs::LIBRARY, self.library)?;
        self.write_reg(regs::MODE, mode::INTTRIG)
    }

    /// Play one ROM effect
    pub fn play_effect(&mut self, effect: u8) -> Result<(), Drv2605Error> {
        if !(1..=MAX_EFFECT).contains(&effect) {
            return Err(Drv2605Error::InvalidEffect(effect));
        }

        self.write_reg(regs::WAVESEQ1, effect)?;
        self.write_reg(regs::WAVESEQ1 + 1, 0)?;
        self.write_reg(regs::GO, 0x01)
    }

    /// Play up to 8 effects back to back
    ///
    /// Invalid IDs are skipped and the rest packed into consecutive slots.
    /// Returns the number of effects queued.
    pub fn play_sequence(&mut self, effects: &[u8]) -> Result<usize, Drv2605Error> {
        let mut slot = 0usize;
        for &effect in effects.iter().filter(|e| (1..=MAX_EFFECT).contains(*e)) {
            if slot == SEQUENCE_SLOTS {
                break;
            }
            self.write_reg(regs::WAVESEQ1 + slot as u8, effect)?;
            slot += 1;
        }

        if slot == 0 {
            return Err(Drv2605Error::EmptySequence);
        }
        if slot < SEQUENCE_SLOTS {
            self.write_reg(regs::WAVESEQ1 + slot as u8, 0)?;
        }
        self.write_reg(regs::GO, 0x01)?;
        Ok(slot)
    }

    /// Clear the sequencer and stop playback
    pub fn stop(&mut self) -> Result<(), Drv2605Error> {
        for slot in 0..SEQUENCE_SLOTS as u8 {
            self.write_reg(regs::WAVESEQ1 + slot, 0)?;
        }
        self.write_reg(regs::GO, 0x00)
    }

    /// Continuous drive at `value` (real-time playback mode)
    pub fn set_realtime_value(&mut self, value: u8) -> Result<(), Drv2605Error> {
        self.write_reg(regs::MODE, mode::REALTIME)?;
        self.write_reg(regs::RTPIN, value)
    }

    /// Low-power standby
    pub fn standby(&mut self) -> Result<(), Drv2605Error> {
        self.write_reg(regs::MODE, mode::STANDBY)
    }

    /// Back to internal trigger mode
    pub fn wake(&mut self) -> Result<(), Drv2605Error> {
        self.write_reg(regs::MODE, mode::INTTRIG)
    }

    pub fn motor(&self) -> MotorType {
        self.motor
    }

    pub fn library(&self) -> u8 {
        self.library
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), Drv2605Error> {
        self.i2c
            .write(DRV2605_ADDR, &[reg, val])
            .map_err(|_| Drv2605Error::I2c)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Drv2605Error> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(DRV2605_ADDR, &[reg], &mut buf)
            .map_err(|_| Drv2605Error::I2c)?;
        Ok(buf[0])
    }
}
