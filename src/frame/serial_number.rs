use crate::error::DecodeError;
use crate::telemetry::Telemetry;

/// A verbatim message to send which requests the battery serial number
pub(crate) const REQUEST: [u8; 8] = [0x00, 0x00, 0x04, 0x01, 0x10, 0x55, 0xAA, 0x14];

/// The firmware answers this request but the payload carries nothing
/// usable. The stock app takes the serial from the QR code on the case
/// instead. The frame is accepted and the record left as it is.
pub(crate) fn decode(frame: &[u8], _telemetry: &mut Telemetry) -> Result<(), DecodeError> {
    log::debug!("serial number response: 0x{}", hex::encode(frame));
    Ok(())
}

#[test]
fn test_serial_number_frames_are_accepted_unparsed() {
    let mut telemetry = Telemetry::default();
    decode(&[0xDE, 0xAD], &mut telemetry).unwrap();
    assert_eq!(telemetry, Telemetry::default());
}
