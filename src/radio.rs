//! Radio surface consumed by the scan coordinator.
//!
//! The coordinator never talks to a driver directly. It issues synchronous
//! commands through [`Radio`] and [`TimerControl`]; any `Err` from them ends
//! the session.

use core::fmt;

use embassy_time::Duration;

use crate::config::RadioConfig;
use crate::error::RadioError;

/// Commands the coordinator sends to the radio.
pub trait Radio {
    /// Apply rate, protocol, power and bandwidth settings. Called once per session.
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError>;

    /// Enter or leave promiscuous capture. Leaving also stops frame delivery.
    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), RadioError>;

    /// Tune to a 2.4 GHz channel.
    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError>;

    /// Inject a raw 802.11 frame on the current channel.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError>;
}

impl<R: Radio + ?Sized> Radio for &mut R {
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        (**self).configure(config)
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), RadioError> {
        (**self).set_promiscuous(enabled)
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        (**self).set_channel(channel)
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        (**self).transmit(frame)
    }
}

/// The two one-shot timers a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Fires to send a probe request on the current channel
    Probe,
    /// Fires to move on to the next channel
    Dwell,
}

impl TimerId {
    /// Both timers, probe first.
    pub const ALL: [Self; 2] = [Self::Probe, Self::Dwell];

    /// Stable slot index.
    pub const fn index(self) -> usize {
        match self {
            Self::Probe => 0,
            Self::Dwell => 1,
        }
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe => f.write_str("probe"),
            Self::Dwell => f.write_str("dwell"),
        }
    }
}

/// One-shot timer service.
///
/// A timer is armed until it fires or is cancelled. Firing disarms it before
/// the matching session handler runs.
pub trait TimerControl {
    /// Arm `timer` to fire `after` from now, replacing any pending deadline.
    fn arm(&mut self, timer: TimerId, after: Duration) -> Result<(), RadioError>;

    /// Disarm `timer`. Cancelling an idle timer is not an error.
    fn cancel(&mut self, timer: TimerId) -> Result<(), RadioError>;

    /// Whether `timer` is armed.
    fn is_armed(&self, timer: TimerId) -> bool;
}

impl<T: TimerControl + ?Sized> TimerControl for &mut T {
    fn arm(&mut self, timer: TimerId, after: Duration) -> Result<(), RadioError> {
        (**self).arm(timer, after)
    }

    fn cancel(&mut self, timer: TimerId) -> Result<(), RadioError> {
        (**self).cancel(timer)
    }

    fn is_armed(&self, timer: TimerId) -> bool {
        (**self).is_armed(timer)
    }
}
