//! Deduplicating station table.
//!
//! Stations are keyed by hardware address and stored in a fixed-capacity
//! vector, so the table never allocates. Lookups are linear; the capacity is
//! a few dozen entries.

use crate::config::MAX_RECORDS;
use crate::frame::{MacAddress, Ssid};

/// One station heard during the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRecord {
    /// Hardware address, the table key
    pub address: MacAddress,
    /// SSID from the first sighting, if it carried one
    pub ssid: Option<Ssid>,
    /// Channel of the latest sighting
    pub channel: u8,
    /// Signal strength of the latest sighting, in dBm
    pub signal_strength: i8,
    /// At least one probe response was attributed to this address
    pub heard_as_response: bool,
}

/// What [`StationTable::record_sighting`] did with a sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sighting {
    /// A new record was created
    Inserted,
    /// An existing record was refreshed
    Updated,
    /// Probe response from an address never heard probing; nothing stored
    IgnoredResponse,
    /// New address while the table was full; nothing stored
    Dropped,
}

/// Fixed-capacity table of stations keyed by address.
#[derive(Debug, Clone, Default)]
pub struct StationTable<const N: usize = MAX_RECORDS> {
    records: heapless::Vec<StationRecord, N>,
}

impl<const N: usize> StationTable<N> {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            records: heapless::Vec::new(),
        }
    }

    /// Record one sighting of `address`.
    ///
    /// Known addresses always get their channel and signal refreshed, and a
    /// response marks them as `heard_as_response` for good. Only probe
    /// requests create records, and only while capacity remains.
    pub fn record_sighting(
        &mut self,
        address: MacAddress,
        ssid: Option<&Ssid>,
        channel: u8,
        signal_strength: i8,
        is_response: bool,
    ) -> Sighting {
        if let Some(record) = self.records.iter_mut().find(|r| r.address == address) {
            record.channel = channel;
            record.signal_strength = signal_strength;
            record.heard_as_response |= is_response;
            return Sighting::Updated;
        }

        if is_response {
            return Sighting::IgnoredResponse;
        }

        let record = StationRecord {
            address,
            ssid: ssid.cloned(),
            channel,
            signal_strength,
            heard_as_response: false,
        };
        match self.records.push(record) {
            Ok(()) => Sighting::Inserted,
            Err(_) => Sighting::Dropped,
        }
    }

    /// Look up a station by address.
    pub fn get(&self, address: &MacAddress) -> Option<&StationRecord> {
        self.records.iter().find(|r| r.address == *address)
    }

    /// Number of stations stored.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether no station is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether new addresses are being dropped.
    pub fn is_full(&self) -> bool {
        self.records.is_full()
    }

    /// Maximum number of stations.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterate over the stored stations. Each call starts a fresh pass.
    pub fn iter(&self) -> core::slice::Iter<'_, StationRecord> {
        self.records.iter()
    }

    /// Remove every station.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'a, const N: usize> IntoIterator for &'a StationTable<N> {
    type Item = &'a StationRecord;
    type IntoIter = core::slice::Iter<'a, StationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
