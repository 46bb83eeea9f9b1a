use crate::error::DecodeError;
use crate::frame::{battery_info, serial_number, version};
use crate::telemetry::Telemetry;

/// The requests understood by the BMS.
///
/// Requests are verbatim 8-byte strings whose last byte is an additive
/// checksum of the preceding seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetVersion,
    GetBatteryInfo,
    SerialNumber,
}

impl Command {
    /// Every command the BMS understands.
    pub const ALL: [Command; 3] = [
        Command::GetVersion,
        Command::GetBatteryInfo,
        Command::SerialNumber,
    ];

    /// The commands a routine telemetry poll sends. The serial number is
    /// left out: the firmware does not fill it in.
    pub const POLL: [Command; 2] = [Command::GetVersion, Command::GetBatteryInfo];

    /// The verbatim request bytes for this command.
    pub fn request(self) -> &'static [u8; 8] {
        match self {
            Command::GetVersion => &version::REQUEST,
            Command::GetBatteryInfo => &battery_info::REQUEST,
            Command::SerialNumber => &serial_number::REQUEST,
        }
    }

    /// Resolve raw request bytes back to a command.
    pub fn from_request(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::ALL
            .into_iter()
            .find(|command| command.request().as_slice() == bytes)
            .ok_or_else(|| DecodeError::UnknownCommand(bytes.to_vec()))
    }

    /// Decode a response frame into the telemetry record.
    ///
    /// Each decoder owns a disjoint set of fields, so responses to
    /// different commands can be decoded in any order.
    pub fn decode_into(self, frame: &[u8], telemetry: &mut Telemetry) -> Result<(), DecodeError> {
        match self {
            Command::GetVersion => version::decode(frame, telemetry),
            Command::GetBatteryInfo => battery_info::decode(frame, telemetry),
            Command::SerialNumber => serial_number::decode(frame, telemetry),
        }
    }
}

#[test]
fn test_request_checksum() {
    for command in Command::ALL {
        let request = command.request();
        let sum = request[..7]
            .iter()
            .fold(0u8, |acc, &byte| acc.wrapping_add(byte));
        assert_eq!(sum, request[7], "bad checksum on {command:?}");
    }
}

#[test]
fn test_from_request_round_trip() {
    for command in Command::ALL {
        assert_eq!(Command::from_request(command.request()), Ok(command));
    }
}

#[test]
fn test_from_request_rejects_unknown_bytes() {
    let bytes = [0x01, 0x03, 0xd0, 0x26, 0x00, 0x19, 0x5d, 0x0b];
    assert_eq!(
        Command::from_request(&bytes),
        Err(DecodeError::UnknownCommand(bytes.to_vec()))
    );
}

#[test]
fn test_decode_order_does_not_matter() {
    let mut battery = vec![0u8; 104];
    battery[12..16].copy_from_slice(&[0x1C, 0x34, 0x00, 0x00]);
    battery[90..92].copy_from_slice(&[0x4C, 0x00]);

    let mut version = vec![0u8; 18];
    version[8..14].copy_from_slice(&[0x01, 0x00, 0x02, 0x00, 0x0A, 0x00]);

    let mut battery_first = Telemetry::default();
    Command::GetBatteryInfo
        .decode_into(&battery, &mut battery_first)
        .unwrap();
    Command::GetVersion
        .decode_into(&version, &mut battery_first)
        .unwrap();

    let mut version_first = Telemetry::default();
    Command::GetVersion
        .decode_into(&version, &mut version_first)
        .unwrap();
    Command::GetBatteryInfo
        .decode_into(&battery, &mut version_first)
        .unwrap();

    assert_eq!(battery_first, version_first);
    assert_eq!(battery_first.voltage, Some(13340.0));
    assert_eq!(battery_first.soc, Some(76));
    assert_eq!(battery_first.firmware_version.as_deref(), Some("1.2.10"));
}
