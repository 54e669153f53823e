//! RotaryPhoneAudio firmware entry point
//!
//! Single cooperative loop:
//! 1. Debounce the mode switch, click + haptic pulse on change
//! 2. Tick the tone engine on the 10 ms grid
//! 3. Feed console bytes
//! 4. Drain the log ring to the UART

#[cfg(target_os = "espidf")]
fn main() -> Result<(), esp_idf_svc::sys::EspError> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!("rotary: firmware binary, build for an ESP-IDF target");
}

#[cfg(target_os = "espidf")]
mod firmware {
    use core::fmt;

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_svc::hal::i2s::I2sDriver;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::UartDriver;
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::{self, EspError};

    use rotary_phone_audio::audio::{ModeSwitch, OutputRouter, ToneEngine};
    use rotary_phone_audio::config::{BoardPins, EngineConfig};
    use rotary_phone_audio::console::Console;
    use rotary_phone_audio::fault::FaultState;
    use rotary_phone_audio::hal::gpio::SwitchInput;
    use rotary_phone_audio::hal::i2s::{mono_config, I2sSink};
    use rotary_phone_audio::hal::{Drv2605, MotorType};
    use rotary_phone_audio::logging::LogStream;
    use rotary_phone_audio::scheduler::TickSchedule;
    use rotary_phone_audio::uart_logger::{self, UartLoggerConfig};
    use rotary_phone_audio::{rt_info, rt_warn};

    const TAG: &str = "main";

    /// DRV2605 ROM effect played on a switch change (strong click)
    const SWITCH_EFFECT: u8 = 1;

    static MODE_SWITCH: ModeSwitch = ModeSwitch::new();
    static FAULT_STATE: FaultState = FaultState::new();
    static LOG_STREAM: LogStream = LogStream::new();

    fn timestamp_us() -> u64 {
        // SAFETY: plain read of the monotonic high-resolution timer.
        let now = unsafe { sys::esp_timer_get_time() };
        now.max(0) as u64
    }

    /// GPIO number from the board map
    fn pin(num: u8) -> AnyIOPin {
        // SAFETY: each number in `BoardPins` is used for exactly one driver.
        unsafe { AnyIOPin::new(num as i32) }
    }

    /// `fmt::Write` over the console UART
    struct UartOut<'a, 'd>(&'a UartDriver<'d>);

    impl fmt::Write for UartOut<'_, '_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| fmt::Error)
        }
    }

    pub fn run() -> Result<(), EspError> {
        sys::link_patches();

        let peripherals = Peripherals::take()?;
        let pins = BoardPins::default();
        let config = EngineConfig::default();

        let uart_cfg = UartLoggerConfig::default();
        let uart = uart_logger::init_uart_logger(
            peripherals.uart0,
            pin(uart_cfg.tx_pin),
            pin(uart_cfg.rx_pin),
            &uart_cfg,
        )?;

        let i2s_cfg = mono_config(config.sample_rate);
        let handset = I2sDriver::new_std_tx(
            peripherals.i2s0,
            &i2s_cfg,
            pin(pins.handset_bclk),
            pin(pins.handset_dout),
            Option::<AnyIOPin>::None,
            pin(pins.handset_ws),
        )?;
        let base = I2sDriver::new_std_tx(
            peripherals.i2s1,
            &i2s_cfg,
            pin(pins.base_bclk),
            pin(pins.base_dout),
            Option::<AnyIOPin>::None,
            pin(pins.base_ws),
        )?;

        let mut switch = SwitchInput::new(pin(pins.mode_switch))?;
        MODE_SWITCH.set(switch.destination());

        let router = OutputRouter::new(
            Some(I2sSink::new(handset)?),
            Some(I2sSink::new(base)?),
            Some(&MODE_SWITCH),
            &LOG_STREAM,
        );
        let mut schedule = TickSchedule::new(config.frame_period_us());
        let mut engine = ToneEngine::new(config, router, &FAULT_STATE, &LOG_STREAM);
        // A failed setup leaves the engine disabled; the console still
        // reports the fault.
        let _ = engine.setup(timestamp_us());

        let i2c_cfg = I2cConfig::new().baudrate(Hertz(100_000));
        let i2c = I2cDriver::new(peripherals.i2c0, pin(pins.i2c_sda), pin(pins.i2c_scl), &i2c_cfg)?;
        let mut haptic = Drv2605::new(i2c, MotorType::Erm, 1);
        let mut haptic_ok = match haptic.init() {
            Ok(()) => true,
            Err(err) => {
                rt_warn!(LOG_STREAM, timestamp_us(), TAG, "haptic unavailable: {}", err);
                false
            }
        };

        let mut console = Console::new();
        console.print_banner(&mut UartOut(&uart));

        loop {
            let now = timestamp_us();

            if let Some(dest) = switch.poll(&MODE_SWITCH) {
                rt_info!(LOG_STREAM, now, TAG, "switch -> {}", dest.as_str());
                engine.trigger_click();
                if haptic_ok {
                    if let Err(err) = haptic.play_effect(SWITCH_EFFECT) {
                        rt_warn!(LOG_STREAM, now, TAG, "haptic: {}", err);
                        haptic_ok = false;
                    }
                }
            }

            if schedule.poll(now) {
                engine.tick(now);
            }

            while let Some(byte) = uart_logger::read_byte(&uart) {
                console.process_byte(byte, &mut engine, timestamp_us(), &mut UartOut(&uart));
            }

            uart_logger::write_pending(&uart, &LOG_STREAM);

            if schedule.remaining_us(timestamp_us()) >= 1_000 {
                FreeRtos::delay_ms(1);
            }
        }
    }
}
