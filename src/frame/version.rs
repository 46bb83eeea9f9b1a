use crate::error::DecodeError;
use crate::frame::{ensure_len, uint_from_reversed};
use crate::telemetry::Telemetry;

/// A verbatim message to send which requests version and build data
pub(crate) const REQUEST: [u8; 8] = [0x00, 0x00, 0x04, 0x01, 0x16, 0x55, 0xAA, 0x1A];

/// Version fields start at byte 8 and need 10 bytes after that.
pub(crate) const MIN_FRAME_LEN: usize = 18;

/// Decode a version frame into the telemetry record.
///
/// The hardware revision is spread over the even offsets of the frame
/// tail, padded with non-printable bytes. Only printable ASCII is kept;
/// if nothing printable remains the revision stays unknown.
pub(crate) fn decode(frame: &[u8], telemetry: &mut Telemetry) -> Result<(), DecodeError> {
    ensure_len(frame, MIN_FRAME_LEN)?;

    let start = &frame[8..];
    telemetry.firmware_version = Some(format!(
        "{}.{}.{}",
        uint_from_reversed(&start[0..2]),
        uint_from_reversed(&start[2..4]),
        uint_from_reversed(&start[4..6])
    ));
    telemetry.manfacture_date = Some(format!(
        "{}-{}-{}",
        uint_from_reversed(&start[6..8]),
        start[8],
        start[9]
    ));

    let hardware: String = start
        .iter()
        .step_by(2)
        .filter(|&&byte| (32..=126).contains(&byte))
        .map(|&byte| char::from(byte))
        .collect();
    telemetry.hardware_version = (!hardware.is_empty()).then_some(hardware);

    Ok(())
}

#[test]
fn test_parse_version_happy() {
    let mut data = vec![0u8; 8];
    data.extend_from_slice(&[
        0x01, 0x00, // firmware major 1
        0x02, 0x00, // firmware minor 2
        0x0A, 0x00, // firmware patch 10
        0xE7, 0x07, // year 2023
        0x06, // month
        0x05, // day
        0x56, 0x00, 0x32, 0x00, 0x2E, 0x00, 0x31, 0x00, // "V2.1" interleaved
    ]);

    let mut telemetry = Telemetry::default();
    decode(&data, &mut telemetry).unwrap();

    assert_eq!(telemetry.firmware_version.as_deref(), Some("1.2.10"));
    assert_eq!(telemetry.manfacture_date.as_deref(), Some("2023-6-5"));
    assert_eq!(telemetry.hardware_version.as_deref(), Some("V2.1"));
}

#[test]
fn test_parse_version_without_printable_hardware_bytes() {
    let mut data = vec![0u8; 8];
    data.extend_from_slice(&[
        0x01, 0x00, 0x02, 0x00, 0x0A, 0x00, 0xE7, 0x07, 0x06, 0x05,
    ]);

    let mut telemetry = Telemetry::default();
    telemetry.hardware_version = Some("stale".to_owned());
    decode(&data, &mut telemetry).unwrap();

    assert_eq!(telemetry.firmware_version.as_deref(), Some("1.2.10"));
    assert_eq!(telemetry.manfacture_date.as_deref(), Some("2023-6-5"));
    assert_eq!(telemetry.hardware_version, None);
}

#[test]
fn test_parse_version_short_frame() {
    let data = vec![0u8; MIN_FRAME_LEN - 1];
    let mut telemetry = Telemetry::default();
    telemetry.firmware_version = Some("1.2.10".to_owned());

    let result = decode(&data, &mut telemetry);

    assert_eq!(
        result,
        Err(DecodeError::FrameTooShort {
            expected: MIN_FRAME_LEN,
            actual: MIN_FRAME_LEN - 1,
        })
    );
    assert_eq!(telemetry.firmware_version.as_deref(), Some("1.2.10"));
}
