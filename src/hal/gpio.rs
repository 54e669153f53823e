//! Mode switch input.
//!
//! Polled from the main loop; the debounced level is published to the
//! `ModeSwitch` the router reads.

use esp_idf_svc::hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use esp_idf_svc::sys::EspError;

use crate::audio::{Debounce, Destination, ModeSwitch};

/// Consecutive identical reads before a level is accepted
const STABLE_READS: u8 = 4;

/// Debounced switch pin. High selects the base speaker.
pub struct SwitchInput<'d> {
    pin: PinDriver<'d, AnyIOPin, Input>,
    debounce: Debounce,
}

impl<'d> SwitchInput<'d> {
    pub fn new(pin: AnyIOPin) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Down)?;
        let initial = pin.is_high();
        Ok(Self {
            pin,
            debounce: Debounce::new(initial, STABLE_READS),
        })
    }

    /// Current debounced level as a destination
    pub fn destination(&self) -> Destination {
        Destination::from_mode(Some(self.debounce.state()))
    }

    /// Sample the pin and publish a change. Returns the new destination
    /// when the switch moved.
    pub fn poll(&mut self, switch: &ModeSwitch) -> Option<Destination> {
        let changed = self.debounce.update(self.pin.is_high())?;
        let dest = Destination::from_mode(Some(changed));
        switch.set(dest);
        Some(dest)
    }
}
