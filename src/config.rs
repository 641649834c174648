//! Scan timing, channel plan and radio settings.
//!
//! The constants describe the sweep the firmware runs by default. A
//! [`ScanConfig`] carries the values a session actually uses and can be
//! adjusted with its `with_*` setters.

use embassy_time::Duration;

use crate::frame::MacAddress;

/// Delay before a probe request is sent on a freshly tuned channel.
pub const PROBE_DELAY: Duration = Duration::from_millis(20);

/// Listening window granted on a channel once something was heard on it.
pub const CHAN_DWELL_TIME: Duration = Duration::from_millis(100);

/// The 2.4 GHz channels visited by one sweep, in order.
pub const CHANNEL_PLAN: [u8; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14];

/// Maximum number of stations kept by one session.
pub const MAX_RECORDS: usize = 30;

/// Source address written into injected probe requests.
pub const DEFAULT_SOURCE_ADDRESS: MacAddress = MacAddress([0x84, 0xF7, 0x03, 0x07, 0xC3, 0x10]);

/// PHY rate used for injected frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxRate {
    /// 1 Mbps, long preamble
    Rate1mL,
    /// 2 Mbps, long preamble
    Rate2mL,
    /// 5.5 Mbps, long preamble
    Rate5mL,
    /// 11 Mbps, long preamble
    Rate11mL,
}

/// 802.11 protocol set enabled on the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyProtocol {
    /// 802.11b only
    B,
    /// 802.11b/g
    BG,
    /// 802.11b/g/n
    BGN,
}

/// Channel bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    /// 20 MHz
    Ht20,
    /// 40 MHz
    Ht40,
}

/// Radio settings applied once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Rate for injected frames
    pub tx_rate: TxRate,
    /// Enabled protocols
    pub protocol: PhyProtocol,
    /// Maximum transmit power in units of 0.25 dBm
    pub max_tx_power: i8,
    /// Channel bandwidth
    pub bandwidth: Bandwidth,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            tx_rate: TxRate::Rate1mL,
            protocol: PhyProtocol::B,
            max_tx_power: 84,
            bandwidth: Bandwidth::Ht20,
        }
    }
}

/// Per-session scan configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Delay between tuning a channel and sending the probe request
    pub probe_delay: Duration,
    /// Listening window armed by a sighting
    pub dwell_time: Duration,
    /// Listening window armed (or refreshed) by a sent probe request
    pub post_probe_listen: Duration,
    /// Source address of injected probe requests
    pub source_address: MacAddress,
    /// Radio settings applied at session start
    pub radio: RadioConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            probe_delay: PROBE_DELAY,
            dwell_time: CHAN_DWELL_TIME,
            post_probe_listen: CHAN_DWELL_TIME,
            source_address: DEFAULT_SOURCE_ADDRESS,
            radio: RadioConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Set the probe delay.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    /// Set the dwell window armed by sightings.
    pub fn with_dwell_time(mut self, dwell: Duration) -> Self {
        self.dwell_time = dwell;
        self
    }

    /// Set the listening window armed after each probe request.
    pub fn with_post_probe_listen(mut self, listen: Duration) -> Self {
        self.post_probe_listen = listen;
        self
    }

    /// Set the source address used in injected frames.
    pub fn with_source_address(mut self, address: MacAddress) -> Self {
        self.source_address = address;
        self
    }

    /// Replace the radio settings.
    pub fn with_radio(mut self, radio: RadioConfig) -> Self {
        self.radio = radio;
        self
    }

    /// Time one channel takes when nothing is heard on it.
    pub fn quiet_channel_time(&self) -> Duration {
        self.probe_delay + self.post_probe_listen
    }
}
