//! 802.11 management frame parsing.
//!
//! Only the two frame subtypes the scan cares about are decoded: probe
//! requests and probe responses. Every read is bounds-checked against the
//! declared frame length, so a malformed element list ends the walk instead of
//! reading past the buffer.

use core::fmt;

/// Frames shorter than this carry neither a complete BSSID field nor the
/// first element header and are rejected.
pub const MIN_FRAME_LEN: usize = 38;

/// Offset of the 6-byte source/BSSID field.
pub const BSSID_OFFSET: usize = 10;

/// Offset of the first information element (end of the MAC header).
pub const IE_OFFSET: usize = 24;

/// Longest SSID kept, in bytes.
pub const SSID_MAX_LEN: usize = 32;

const SUBTYPE_MASK: u8 = 0xFC;
const PROBE_REQUEST: u8 = 0x40;
const PROBE_RESPONSE: u8 = 0x50;
const SSID_ELEMENT_ID: u8 = 0x00;

/// A 6-byte IEEE 802 hardware address.
#[derive(Clone, Copy, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// The broadcast address `ff:ff:ff:ff:ff:ff`.
    pub const BROADCAST: Self = Self([0xFF; 6]);

    /// Build an address from a slice, `None` unless it is exactly 6 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MacAddress {
    fn format(&self, f: defmt::Formatter<'_>) {
        let [a, b, c, d, e, g] = self.0;
        defmt::write!(
            f,
            "{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}",
            a,
            b,
            c,
            d,
            e,
            g
        )
    }
}

/// Network name carried in an SSID element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ssid {
    /// Zero-length SSID: the frame asks for (or advertises) any network
    Wildcard,
    /// Up to [`SSID_MAX_LEN`] bytes of network name
    Named(heapless::Vec<u8, SSID_MAX_LEN>),
}

impl Ssid {
    /// Build an SSID from an element value. Empty values are the wildcard,
    /// values longer than [`SSID_MAX_LEN`] are truncated.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Wildcard;
        }
        let kept = &bytes[..bytes.len().min(SSID_MAX_LEN)];
        Self::Named(heapless::Vec::from_slice(kept).unwrap_or_default())
    }

    /// SSID bytes, empty for the wildcard.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Wildcard => &[],
            Self::Named(bytes) => bytes.as_slice(),
        }
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("WILDCARD"),
            Self::Named(bytes) => {
                for chunk in bytes.utf8_chunks() {
                    f.write_str(chunk.valid())?;
                    if !chunk.invalid().is_empty() {
                        f.write_str("\u{FFFD}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Ssid {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Wildcard => defmt::write!(f, "WILDCARD"),
            Self::Named(bytes) => match core::str::from_utf8(bytes) {
                Ok(name) => defmt::write!(f, "{=str}", name),
                Err(_) => defmt::write!(f, "{=[u8]:x}", bytes.as_slice()),
            },
        }
    }
}

/// Management frame subtype, as far as the scan is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Probe request (subtype 4)
    ProbeRequest,
    /// Probe response (subtype 5)
    ProbeResponse,
    /// Anything else; never parsed further
    Other,
}

impl FrameKind {
    /// Classify a frame by the first byte of its frame control field.
    pub fn classify(frame_control: u8) -> Self {
        match frame_control & SUBTYPE_MASK {
            PROBE_REQUEST => Self::ProbeRequest,
            PROBE_RESPONSE => Self::ProbeResponse,
            _ => Self::Other,
        }
    }
}

/// Reception metadata the driver delivers next to each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxMeta {
    /// Signal strength in dBm
    pub signal_strength: i8,
    /// Primary channel the frame was received on
    pub channel: u8,
}

impl RxMeta {
    /// Metadata for one received frame.
    pub fn new(signal_strength: i8, channel: u8) -> Self {
        Self {
            signal_strength,
            channel,
        }
    }
}

/// A decoded management frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Frame subtype
    pub kind: FrameKind,
    /// Source address from the BSSID field
    pub bssid: MacAddress,
    /// First SSID element, if the element list contained one
    pub ssid: Option<Ssid>,
    /// Channel from the reception metadata
    pub channel: u8,
    /// Signal strength from the reception metadata
    pub signal_strength: i8,
    /// Whether the buffer was long enough and of a kind that gets parsed
    pub valid: bool,
}

impl ParsedFrame {
    fn rejected(kind: FrameKind, rx: RxMeta) -> Self {
        Self {
            kind,
            bssid: MacAddress::default(),
            ssid: None,
            channel: rx.channel,
            signal_strength: rx.signal_strength,
            valid: false,
        }
    }

    /// A valid probe request or probe response.
    pub fn is_probe(&self) -> bool {
        self.valid && self.kind != FrameKind::Other
    }

    /// Whether this frame is a probe response.
    pub fn is_response(&self) -> bool {
        self.kind == FrameKind::ProbeResponse
    }
}

/// Parse a raw management frame.
///
/// Only the first `len` bytes of `buffer` are considered (or fewer, if the
/// buffer is shorter). Frames of other subtypes and frames shorter than
/// [`MIN_FRAME_LEN`] come back with `valid == false`.
pub fn parse_frame(buffer: &[u8], len: usize, rx: RxMeta) -> ParsedFrame {
    let data = &buffer[..len.min(buffer.len())];

    let kind = data
        .first()
        .map_or(FrameKind::Other, |&fc| FrameKind::classify(fc));
    if kind == FrameKind::Other || data.len() < MIN_FRAME_LEN {
        return ParsedFrame::rejected(kind, rx);
    }

    let Some(bssid) = data
        .get(BSSID_OFFSET..BSSID_OFFSET + 6)
        .and_then(MacAddress::from_slice)
    else {
        return ParsedFrame::rejected(kind, rx);
    };

    ParsedFrame {
        kind,
        bssid,
        ssid: data.get(IE_OFFSET..).and_then(find_ssid),
        channel: rx.channel,
        signal_strength: rx.signal_strength,
        valid: true,
    }
}

/// Walk the element list and return the first SSID element.
///
/// An element whose header or value runs past the end stops the walk.
fn find_ssid(elements: &[u8]) -> Option<Ssid> {
    let mut pos = 0;
    while let Some(&[id, len]) = elements.get(pos..pos + 2) {
        let start = pos + 2;
        let end = start + usize::from(len);
        let value = elements.get(start..end)?;
        if id == SSID_ELEMENT_ID {
            return Some(Ssid::from_bytes(value));
        }
        pos = end;
    }
    None
}
