use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Battery state word value meaning the charge cycle has finished.
const STATE_FULLY_CHARGED: u16 = 4;

/// The reported state of the battery.
///
/// Every field starts out unknown and is filled in by the first decoded
/// frame that carries it. Serialized names follow the JSON schema of the
/// stock PowerQueen app, spelling included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Nominal pack voltage as reported on the wire, in mV.
    #[serde(rename = "packVoltage")]
    pub pack_voltage: Option<f64>,
    /// Measured battery voltage as reported on the wire, in mV.
    pub voltage: Option<f64>,
    /// Voltage of each detected cell in V, keyed by 1-based cell number.
    #[serde(rename = "batteryPack")]
    pub battery_pack: BTreeMap<u8, f64>,
    /// Load (-) or charge (+) current in A.
    pub current: Option<f64>,
    /// Power in or out of the battery in W.
    pub watt: Option<f64>,
    /// Remaining capacity in Ah.
    #[serde(rename = "remainAh")]
    pub remain_ah: Option<f64>,
    /// Capacity when new in Ah.
    #[serde(rename = "factoryAh")]
    pub factory_ah: Option<f64>,
    /// Cell temperature in degrees C.
    #[serde(rename = "cellTemperature")]
    pub cell_temperature: Option<u16>,
    /// MOSFET temperature in degrees C.
    #[serde(rename = "mosfetTemperature")]
    pub mosfet_temperature: Option<u16>,
    /// Heating flag bytes.
    pub heat: Option<[u8; 4]>,
    /// Protection flag bytes.
    #[serde(rename = "protectState")]
    pub protect_state: Option<[u8; 4]>,
    /// Failure flag bytes. The first two signal cell faults.
    #[serde(rename = "failureState")]
    pub failure_state: Option<[u8; 4]>,
    /// Nonzero while the BMS is balancing cells.
    #[serde(rename = "equilibriumState")]
    pub equilibrium_state: Option<u32>,
    /// Charge cycle state word.
    #[serde(rename = "batteryState")]
    pub battery_state: Option<u16>,
    /// State of charge in %.
    #[serde(rename = "SOC")]
    pub soc: Option<u16>,
    /// State of health.
    #[serde(rename = "SOH")]
    pub soh: Option<u32>,
    /// Lifetime number of discharges.
    #[serde(rename = "dischargesCount")]
    pub discharges_count: Option<u32>,
    /// Lifetime discharged capacity in Ah.
    #[serde(rename = "dischargesAHCount")]
    pub discharges_ah_count: Option<u32>,

    /// Firmware version as "major.minor.patch".
    #[serde(rename = "firmwareVersion")]
    pub firmware_version: Option<String>,
    /// Manufacture date as "year-month-day", unpadded.
    #[serde(rename = "manfactureDate")]
    pub manfacture_date: Option<String>,
    /// Hardware revision, printable characters only.
    #[serde(rename = "hardwareVersion")]
    pub hardware_version: Option<String>,

    /// Human readable charge activity.
    pub battery_status: Option<String>,
    /// Human readable balancing state.
    pub balance_status: Option<String>,
    /// Human readable cell fault state.
    pub cell_status: Option<String>,
}

/// Charge activity from the scaled current, overridden once the battery
/// reports itself full.
pub(crate) fn battery_status(current: f64, soc: u16, battery_state: u16) -> &'static str {
    if soc >= 100 || battery_state == STATE_FULLY_CHARGED {
        return "Fully charged";
    }

    if current == 0.0 {
        "Standby"
    } else if current > 0.0 {
        "Charging"
    } else {
        "Discharging"
    }
}

pub(crate) fn balance_status(equilibrium: u32) -> &'static str {
    if equilibrium > 0 {
        "Battery cells are being balanced for better performance."
    } else {
        "All cells are well-balanced."
    }
}

pub(crate) fn cell_status(failure: &[u8; 4]) -> &'static str {
    if failure[0] > 0 || failure[1] > 0 {
        "Fault alert! There may be a problem with cell."
    } else {
        "Battery is in optimal working condition."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_status_follows_current_sign() {
        assert_eq!(battery_status(0.0, 76, 2), "Standby");
        assert_eq!(battery_status(1.2, 76, 2), "Charging");
        assert_eq!(battery_status(-0.5, 76, 2), "Discharging");
    }

    #[test]
    fn test_battery_status_full_charge_wins() {
        assert_eq!(battery_status(0.2, 100, 2), "Fully charged");
        assert_eq!(battery_status(-0.5, 100, 2), "Fully charged");
        assert_eq!(battery_status(0.2, 76, STATE_FULLY_CHARGED), "Fully charged");
    }

    #[test]
    fn test_balance_status() {
        assert_eq!(
            balance_status(1),
            "Battery cells are being balanced for better performance."
        );
        assert_eq!(balance_status(0), "All cells are well-balanced.");
    }

    #[test]
    fn test_cell_status() {
        assert_eq!(
            cell_status(&[1, 0, 0, 0]),
            "Fault alert! There may be a problem with cell."
        );
        assert_eq!(
            cell_status(&[0, 2, 0, 0]),
            "Fault alert! There may be a problem with cell."
        );
        assert_eq!(
            cell_status(&[0, 0, 9, 9]),
            "Battery is in optimal working condition."
        );
    }

    #[test]
    fn test_serialized_names_match_the_stock_app() {
        let mut telemetry = Telemetry::default();
        telemetry.pack_voltage = Some(12800.0);
        telemetry.soc = Some(76);
        telemetry.soh = Some(100);
        telemetry.discharges_ah_count = Some(3456);
        telemetry.manfacture_date = Some("2023-6-5".to_owned());
        telemetry.battery_pack.insert(1, 3.335);

        let json = serde_json::to_value(&telemetry).unwrap();
        assert_eq!(json["packVoltage"], 12800.0);
        assert_eq!(json["SOC"], 76);
        assert_eq!(json["SOH"], 100);
        assert_eq!(json["dischargesAHCount"], 3456);
        assert_eq!(json["manfactureDate"], "2023-6-5");
        assert_eq!(json["batteryPack"]["1"], 3.335);
        // Unknown fields serialize as null rather than disappearing.
        assert!(json["voltage"].is_null());
        assert!(json["failureState"].is_null());
    }

    #[test]
    fn test_json_round_trip() {
        let mut telemetry = Telemetry::default();
        telemetry.voltage = Some(13340.0);
        telemetry.current = Some(-0.5);
        telemetry.battery_pack.insert(1, 3.335);
        telemetry.battery_pack.insert(2, 3.338);
        telemetry.heat = Some([4, 3, 2, 1]);
        telemetry.failure_state = Some([0, 0, 0, 0]);
        telemetry.soc = Some(76);
        telemetry.battery_status = Some("Discharging".to_owned());

        let json = serde_json::to_string(&telemetry).unwrap();
        let back: Telemetry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, telemetry);
    }
}
