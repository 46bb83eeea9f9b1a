use crate::error::DecodeError;
use crate::frame::{ensure_len, reversed_flags, uint_from_reversed};
use crate::telemetry::{balance_status, battery_status, cell_status, Telemetry};

/// A verbatim message to send which requests pack, cell and status data
pub(crate) const REQUEST: [u8; 8] = [0x00, 0x00, 0x04, 0x01, 0x13, 0x55, 0xAA, 0x17];

/// Battery info frames carry fields through byte 104.
pub(crate) const MIN_FRAME_LEN: usize = 104;

/// Decode a battery info frame into the telemetry record.
///
/// The cell block at bytes 16..48 holds up to 16 voltage pairs. A pair
/// whose low byte is zero reads as an absent cell: it is skipped and the
/// cell numbering stays sequential. The cell map is rebuilt from scratch
/// on every frame so cells that disappear do not leave stale readings.
pub(crate) fn decode(frame: &[u8], telemetry: &mut Telemetry) -> Result<(), DecodeError> {
    ensure_len(frame, MIN_FRAME_LEN)?;

    let voltage = uint_from_reversed(&frame[12..16]) as f64;
    telemetry.pack_voltage = Some(uint_from_reversed(&frame[8..12]) as f64);
    telemetry.voltage = Some(voltage);

    telemetry.battery_pack.clear();
    let mut cell = 1u8;
    for pair in frame[16..48].chunks(2) {
        if pair[0] == 0 {
            continue;
        }
        telemetry
            .battery_pack
            .insert(cell, uint_from_reversed(pair) as f64 / 1000.0);
        cell += 1;
    }

    // Load / unload current in A
    let raw_current = i32::from_be_bytes([frame[51], frame[50], frame[49], frame[48]]);
    let current = round2(f64::from(raw_current) / 1000.0);
    telemetry.current = Some(current);

    // Watts the way the stock app computes them: raw voltage times raw
    // current, rounded between two divides.
    telemetry.watt = Some(round1(voltage * f64::from(raw_current) / 10000.0) / 100.0);

    telemetry.remain_ah = Some(round2(uint_from_reversed(&frame[62..64]) as f64 / 100.0));
    telemetry.factory_ah = Some(round2(uint_from_reversed(&frame[64..66]) as f64 / 100.0));

    telemetry.cell_temperature = Some(uint_from_reversed(&frame[52..54]) as u16);
    telemetry.mosfet_temperature = Some(uint_from_reversed(&frame[54..56]) as u16);

    telemetry.heat = Some(reversed_flags(&frame[68..72]));
    telemetry.protect_state = Some(reversed_flags(&frame[76..80]));
    let failure = reversed_flags(&frame[80..84]);
    telemetry.failure_state = Some(failure);

    let equilibrium = uint_from_reversed(&frame[84..88]) as u32;
    telemetry.equilibrium_state = Some(equilibrium);
    let battery_state = uint_from_reversed(&frame[88..90]) as u16;
    telemetry.battery_state = Some(battery_state);

    let soc = uint_from_reversed(&frame[90..92]) as u16;
    telemetry.soc = Some(soc);
    telemetry.soh = Some(uint_from_reversed(&frame[92..96]) as u32);

    telemetry.discharges_count = Some(uint_from_reversed(&frame[96..100]) as u32);
    telemetry.discharges_ah_count = Some(uint_from_reversed(&frame[100..104]) as u32);

    telemetry.battery_status = Some(battery_status(current, soc, battery_state).to_owned());
    telemetry.balance_status = Some(balance_status(equilibrium).to_owned());
    telemetry.cell_status = Some(cell_status(&failure).to_owned());

    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
