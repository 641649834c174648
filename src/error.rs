//! Error types for radio commands and scan sessions.

use thiserror::Error;

use crate::radio::TimerId;

/// Failure reported by the radio surface for a single command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// The driver returned a non-zero status code
    #[error("radio driver returned error code {0}")]
    Driver(i32),

    /// The driver refused the command
    #[error("radio driver rejected the command")]
    Rejected,

    /// The radio has not been started
    #[error("radio is not started")]
    NotStarted,
}

impl RadioError {
    /// Map an ESP-IDF style status code to a result.
    pub fn check(code: i32) -> Result<(), Self> {
        match code {
            0 => Ok(()),
            code => Err(Self::Driver(code)),
        }
    }
}

/// Terminal failure of a scan session.
///
/// Every variant comes from a radio-surface command that failed. A session
/// that returns one of these has already shut its timers down and left
/// promiscuous mode on a best-effort basis.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError {
    /// Applying the radio configuration failed
    #[error("failed to configure radio: {source}")]
    Configure {
        /// Underlying radio failure
        source: RadioError,
    },

    /// Entering or leaving promiscuous mode failed
    #[error("failed to set promiscuous mode to {enable}: {source}")]
    Promiscuous {
        /// Requested mode
        enable: bool,
        /// Underlying radio failure
        source: RadioError,
    },

    /// Tuning the radio failed
    #[error("failed to tune to channel {channel}: {source}")]
    SetChannel {
        /// Requested channel
        channel: u8,
        /// Underlying radio failure
        source: RadioError,
    },

    /// Injecting the probe request failed
    #[error("failed to transmit probe request on channel {channel}: {source}")]
    Transmit {
        /// Channel the radio was tuned to
        channel: u8,
        /// Underlying radio failure
        source: RadioError,
    },

    /// Arming a timer failed
    #[error("failed to arm {timer} timer: {source}")]
    ArmTimer {
        /// Timer concerned
        timer: TimerId,
        /// Underlying radio failure
        source: RadioError,
    },

    /// Cancelling a timer failed
    #[error("failed to cancel {timer} timer: {source}")]
    CancelTimer {
        /// Timer concerned
        timer: TimerId,
        /// Underlying radio failure
        source: RadioError,
    },
}

impl ScanError {
    /// The radio failure behind this error.
    pub fn radio_error(&self) -> RadioError {
        match *self {
            Self::Configure { source }
            | Self::Promiscuous { source, .. }
            | Self::SetChannel { source, .. }
            | Self::Transmit { source, .. }
            | Self::ArmTimer { source, .. }
            | Self::CancelTimer { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_maps_status_codes() {
        assert_eq!(RadioError::check(0), Ok(()));
        assert_eq!(RadioError::check(0x3002), Err(RadioError::Driver(0x3002)));
    }

    #[test]
    fn scan_error_display_names_the_command() {
        let err = ScanError::SetChannel {
            channel: 6,
            source: RadioError::Rejected,
        };
        assert_eq!(
            err.to_string(),
            "failed to tune to channel 6: radio driver rejected the command"
        );
        assert_eq!(err.radio_error(), RadioError::Rejected);
    }

    #[test]
    fn timer_errors_name_the_timer() {
        let err = ScanError::ArmTimer {
            timer: TimerId::Dwell,
            source: RadioError::NotStarted,
        };
        assert_eq!(err.to_string(), "failed to arm dwell timer: radio is not started");
    }
}
