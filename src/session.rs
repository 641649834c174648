//! Probe/dwell scan state machine.
//!
//! A [`ScanSession`] owns everything one sweep mutates: the channel index, the
//! station table and the two timers (through [`TimerControl`]). Its handlers
//! must be called from a single consumer, one event at a time; see
//! [`crate::runner`] for the loop that does this.
//!
//! Timeline for a channel with nothing on it:
//!
//! ```text
//! tune ──probe_delay──▶ probe sent ──post_probe_listen──▶ next channel
//! ```
//!
//! A sighting cancels a pending probe and starts the dwell window if it is not
//! already running, so busy channels are listened to instead of probed.

use crate::config::{CHANNEL_PLAN, MAX_RECORDS, ScanConfig};
use crate::error::ScanError;
use crate::frame::{ParsedFrame, RxMeta, parse_frame};
use crate::probe::{PROBE_REQUEST_LEN, wildcard_probe_request};
use crate::radio::{Radio, TimerControl, TimerId};
use crate::station::{Sighting, StationRecord, StationTable};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanPhase {
    /// Constructed, not started
    Idle,
    /// Sweeping the channel plan
    Scanning,
    /// Sweep finished; the radio is handed to association
    Connecting,
    /// A radio command failed; see [`ScanSession::fault`]
    Aborted,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// The probe timer fired
    ProbeTimer,
    /// The dwell timer fired
    DwellTimer,
    /// A frame was received and parsed
    Frame(ParsedFrame),
}

impl From<TimerId> for ScanEvent {
    fn from(timer: TimerId) -> Self {
        match timer {
            TimerId::Probe => Self::ProbeTimer,
            TimerId::Dwell => Self::DwellTimer,
        }
    }
}

/// Counters kept over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanStats {
    /// Probe requests injected
    pub probes_sent: u32,
    /// Valid probe requests/responses handled
    pub frames_accepted: u32,
    /// Frames dropped as malformed or of another subtype
    pub frames_ignored: u32,
    /// New addresses dropped because the table was full
    pub stations_dropped: u32,
    /// Channels tuned to, including the first
    pub channels_visited: u8,
}

/// One sweep over [`CHANNEL_PLAN`].
pub struct ScanSession<R, T, const N: usize = MAX_RECORDS> {
    radio: R,
    timers: T,
    config: ScanConfig,
    probe: [u8; PROBE_REQUEST_LEN],
    stations: StationTable<N>,
    channel_index: usize,
    phase: ScanPhase,
    fault: Option<ScanError>,
    stats: ScanStats,
}

impl<R, T, const N: usize> ScanSession<R, T, N>
where
    R: Radio,
    T: TimerControl,
{
    /// Create an idle session. Nothing is sent to the radio until [`start`](Self::start).
    pub fn new(radio: R, timers: T, config: ScanConfig) -> Self {
        Self {
            probe: wildcard_probe_request(config.source_address),
            radio,
            timers,
            config,
            stations: StationTable::new(),
            channel_index: 0,
            phase: ScanPhase::Idle,
            fault: None,
            stats: ScanStats::default(),
        }
    }

    /// Start a sweep from the first channel with an empty station table.
    ///
    /// Configures the radio, tunes it, enters promiscuous mode and arms the
    /// probe timer. Starting again after completion begins a new sweep.
    pub fn start(&mut self) -> Result<(), ScanError> {
        self.stations.clear();
        self.stats = ScanStats::default();
        self.fault = None;
        self.channel_index = 0;
        self.phase = ScanPhase::Scanning;

        let result = self.bring_up();
        self.settle(result)
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: ScanEvent) -> Result<(), ScanError> {
        match event {
            ScanEvent::ProbeTimer => self.on_probe_timer(),
            ScanEvent::DwellTimer => self.on_dwell_timer(),
            ScanEvent::Frame(frame) => self.on_frame(&frame),
        }
    }

    /// The probe timer fired: inject a probe and (re)start the listening window.
    pub fn on_probe_timer(&mut self) -> Result<(), ScanError> {
        if !self.is_scanning() {
            return Ok(());
        }
        let result = self.send_probe();
        self.settle(result)
    }

    /// The dwell timer fired: move to the next channel, or finish the sweep
    /// after the last one.
    pub fn on_dwell_timer(&mut self) -> Result<(), ScanError> {
        if !self.is_scanning() {
            return Ok(());
        }
        let result = self.advance_channel();
        self.settle(result)
    }

    /// Parse a raw frame and handle it.
    pub fn on_raw_frame(&mut self, buffer: &[u8], len: usize, rx: RxMeta) -> Result<(), ScanError> {
        if !self.is_scanning() {
            return Ok(());
        }
        self.on_frame(&parse_frame(buffer, len, rx))
    }

    /// A frame was received. Anything but a valid probe request/response is
    /// dropped without touching timers or the table.
    pub fn on_frame(&mut self, frame: &ParsedFrame) -> Result<(), ScanError> {
        if !self.is_scanning() {
            return Ok(());
        }
        if !frame.is_probe() {
            self.stats.frames_ignored += 1;
            trace!("ignoring frame on channel {}", frame.channel);
            return Ok(());
        }

        let result = self.extend_listening();
        self.settle(result)?;

        self.stats.frames_accepted += 1;
        let sighting = self.stations.record_sighting(
            frame.bssid,
            frame.ssid.as_ref(),
            frame.channel,
            frame.signal_strength,
            frame.is_response(),
        );
        match sighting {
            Sighting::Inserted => info!(
                "new station {} on channel {} ({} dBm)",
                frame.bssid,
                frame.channel,
                frame.signal_strength
            ),
            Sighting::Dropped => {
                self.stats.stations_dropped += 1;
                trace!("station table full, dropping {}", frame.bssid);
            }
            Sighting::Updated | Sighting::IgnoredResponse => {}
        }
        Ok(())
    }

    /// Whether the sweep is over, successfully or not. Stays true until the
    /// next [`start`](Self::start).
    pub fn is_completed(&self) -> bool {
        matches!(self.phase, ScanPhase::Connecting | ScanPhase::Aborted)
    }

    /// Whether events are currently acted on.
    pub fn is_scanning(&self) -> bool {
        self.phase == ScanPhase::Scanning
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// The error that aborted the sweep, if any.
    pub fn fault(&self) -> Option<&ScanError> {
        self.fault.as_ref()
    }

    /// Position in [`CHANNEL_PLAN`].
    pub fn channel_index(&self) -> usize {
        self.channel_index
    }

    /// Channel the radio is tuned to.
    pub fn current_channel(&self) -> u8 {
        CHANNEL_PLAN[self.channel_index]
    }

    /// Stations heard so far. Each call starts a fresh pass.
    pub fn station_snapshot(&self) -> core::slice::Iter<'_, StationRecord> {
        self.stations.iter()
    }

    /// The station table.
    pub fn stations(&self) -> &StationTable<N> {
        &self.stations
    }

    /// Session counters.
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Session configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The timer service.
    pub fn timers(&self) -> &T {
        &self.timers
    }

    /// The timer service, mutably. Used by event loops to expire fired timers.
    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    /// Take the session apart, typically to hand the table to association.
    pub fn into_parts(self) -> (R, T, StationTable<N>) {
        (self.radio, self.timers, self.stations)
    }

    fn bring_up(&mut self) -> Result<(), ScanError> {
        for timer in TimerId::ALL {
            self.cancel_timer(timer)?;
        }
        self.radio
            .configure(&self.config.radio)
            .map_err(|source| ScanError::Configure { source })?;
        self.tune(self.current_channel())?;
        self.stats.channels_visited += 1;
        self.set_promiscuous(true)?;
        self.arm_timer(TimerId::Probe, self.config.probe_delay)?;

        info!("probe scan started on channel {}", self.current_channel());
        Ok(())
    }

    fn send_probe(&mut self) -> Result<(), ScanError> {
        let channel = self.current_channel();
        self.radio
            .transmit(&self.probe)
            .map_err(|source| ScanError::Transmit { channel, source })?;
        self.stats.probes_sent += 1;
        debug!("wildcard probe request sent on channel {}", channel);

        // Each probe buys a full listening window, even mid-dwell.
        if self.timers.is_armed(TimerId::Dwell) {
            self.cancel_timer(TimerId::Dwell)?;
        }
        self.arm_timer(TimerId::Dwell, self.config.post_probe_listen)
    }

    fn advance_channel(&mut self) -> Result<(), ScanError> {
        if self.channel_index + 1 >= CHANNEL_PLAN.len() {
            return self.complete();
        }

        self.channel_index += 1;
        self.tune(self.current_channel())?;
        self.stats.channels_visited += 1;
        debug!(
            "moved to channel {} ({} stations so far)",
            self.current_channel(),
            self.stations.count()
        );

        if self.timers.is_armed(TimerId::Probe) {
            self.cancel_timer(TimerId::Probe)?;
        }
        self.arm_timer(TimerId::Probe, self.config.probe_delay)
    }

    fn extend_listening(&mut self) -> Result<(), ScanError> {
        if self.timers.is_armed(TimerId::Probe) {
            self.cancel_timer(TimerId::Probe)?;
        }
        // A running dwell window is never pushed back by later sightings.
        if !self.timers.is_armed(TimerId::Dwell) {
            self.arm_timer(TimerId::Dwell, self.config.dwell_time)?;
        }
        Ok(())
    }

    fn complete(&mut self) -> Result<(), ScanError> {
        if self.is_completed() {
            return Ok(());
        }
        self.phase = ScanPhase::Connecting;

        for timer in TimerId::ALL {
            self.cancel_timer(timer)?;
        }
        self.set_promiscuous(false)?;

        info!(
            "probe scan complete: {} stations, {} probes sent, {} frames heard",
            self.stations.count(),
            self.stats.probes_sent,
            self.stats.frames_accepted
        );
        Ok(())
    }

    /// Turn a failed step into an aborted session.
    fn settle(&mut self, result: Result<(), ScanError>) -> Result<(), ScanError> {
        if let Err(err) = result {
            self.abort(err);
        }
        result
    }

    fn abort(&mut self, err: ScanError) {
        error!("probe scan aborted on channel {}: {}", self.current_channel(), err);
        self.phase = ScanPhase::Aborted;
        self.fault = Some(err);

        for timer in TimerId::ALL {
            if let Err(e) = self.timers.cancel(timer) {
                warn!("could not cancel {} timer during shutdown: {}", timer, e);
            }
        }
        if let Err(e) = self.radio.set_promiscuous(false) {
            warn!("could not leave promiscuous mode during shutdown: {}", e);
        }
    }

    fn tune(&mut self, channel: u8) -> Result<(), ScanError> {
        self.radio
            .set_channel(channel)
            .map_err(|source| ScanError::SetChannel { channel, source })
    }

    fn set_promiscuous(&mut self, enable: bool) -> Result<(), ScanError> {
        self.radio
            .set_promiscuous(enable)
            .map_err(|source| ScanError::Promiscuous { enable, source })
    }

    fn arm_timer(&mut self, timer: TimerId, after: embassy_time::Duration) -> Result<(), ScanError> {
        self.timers
            .arm(timer, after)
            .map_err(|source| ScanError::ArmTimer { timer, source })
    }

    fn cancel_timer(&mut self, timer: TimerId) -> Result<(), ScanError> {
        self.timers
            .cancel(timer)
            .map_err(|source| ScanError::CancelTimer { timer, source })
    }
}
