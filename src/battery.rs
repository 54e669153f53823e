//! Battery gauge helpers.
//!
//! Linear Li-ion mapping: 3.0 V = 0 %, 4.2 V = 100 %.

pub const EMPTY_VOLTS: f32 = 3.0;
pub const FULL_VOLTS: f32 = 4.2;

/// Charge in percent, clamped to 0-100. `None` if the reading is NaN.
pub fn battery_level_percent(voltage: f32) -> Option<f32> {
    if voltage.is_nan() {
        return None;
    }
    let level = (voltage - EMPTY_VOLTS) / (FULL_VOLTS - EMPTY_VOLTS) * 100.0;
    Some(level.clamp(0.0, 100.0))
}

/// True if `voltage` is under `threshold_percent`. A NaN reading is not low.
pub fn is_battery_low(voltage: f32, threshold_percent: f32) -> bool {
    if voltage.is_nan() {
        return false;
    }
    let threshold_volts = EMPTY_VOLTS + (threshold_percent / 100.0) * (FULL_VOLTS - EMPTY_VOLTS);
    voltage < threshold_volts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_endpoints_and_clamp() {
        assert_eq!(battery_level_percent(3.0), Some(0.0));
        assert_eq!(battery_level_percent(2.5), Some(0.0));
        assert_eq!(battery_level_percent(4.5), Some(100.0));
        let mid = battery_level_percent(3.6).unwrap();
        assert!((mid - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_nan_reading() {
        assert_eq!(battery_level_percent(f32::NAN), None);
        assert!(!is_battery_low(f32::NAN, 20.0));
    }

    #[test]
    fn test_low_threshold() {
        // 20 % = 3.24 V
        assert!(is_battery_low(3.2, 20.0));
        assert!(!is_battery_low(3.3, 20.0));
    }
}
