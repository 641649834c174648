//! Wildcard probe-request construction.

use crate::frame::MacAddress;

/// Length of the injected probe request.
pub const PROBE_REQUEST_LEN: usize = 42;

/// Supported rates: 1, 2, 5.5, 11 (basic), 9, 18, 36, 54 Mbps.
const SUPPORTED_RATES: [u8; 10] = [0x01, 0x08, 0x82, 0x84, 0x8B, 0x96, 0x12, 0x24, 0x48, 0x6C];

/// Extended supported rates: 6, 12, 24, 48 Mbps.
const EXTENDED_RATES: [u8; 6] = [0x32, 0x04, 0x0C, 0x18, 0x30, 0x60];

/// Build a broadcast probe request with a zero-length (wildcard) SSID.
///
/// The sequence number is left at zero; the driver fills it in.
pub fn wildcard_probe_request(source: MacAddress) -> [u8; PROBE_REQUEST_LEN] {
    let mut frame = [0u8; PROBE_REQUEST_LEN];

    // frame control + duration
    frame[0] = 0x40;
    frame[4..10].copy_from_slice(MacAddress::BROADCAST.as_bytes());
    frame[10..16].copy_from_slice(source.as_bytes());
    frame[16..22].copy_from_slice(MacAddress::BROADCAST.as_bytes());
    // sequence control at 22..24, SSID element header at 24..26 (id 0, len 0)
    frame[26..36].copy_from_slice(&SUPPORTED_RATES);
    frame[36..42].copy_from_slice(&EXTENDED_RATES);

    frame
}
