//! Single-consumer async event loop.
//!
//! Frames arrive from the driver's receive callback, which runs outside the
//! scan task. The callback parses the frame and pushes it into a bounded
//! [`EventQueue`]; [`run_scan`] is the only consumer and also owns the timer
//! deadlines, so probe expiry, dwell expiry and frame delivery are handled
//! strictly one after another.

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};

use crate::error::ScanError;
use crate::radio::Radio;
use crate::session::{ScanEvent, ScanSession};
use crate::timer::DeadlineTimers;

/// Number of events that can wait for the scan task.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Queue between the receive callback and the scan task.
pub type EventQueue = Channel<CriticalSectionRawMutex, ScanEvent, EVENT_QUEUE_DEPTH>;

/// Run one sweep to completion.
///
/// Starts `session`, then handles timer expiries and queued events until the
/// session completes. Events left in the queue from an earlier sweep are
/// discarded first. Returns the error that aborted the sweep, if any.
pub async fn run_scan<R, M, const N: usize, const Q: usize>(
    session: &mut ScanSession<R, DeadlineTimers, N>,
    events: &Channel<M, ScanEvent, Q>,
) -> Result<(), ScanError>
where
    R: Radio,
    M: RawMutex,
{
    while events.try_receive().is_ok() {}

    session.start()?;

    while !session.is_completed() {
        let next = session.timers().next_deadline().map(|(_, at)| at);
        match select(wait_until(next), events.receive()).await {
            Either::First(()) => {
                // Both timers may be due after a late wakeup; earliest first.
                while let Some(timer) = session.timers_mut().take_due(Instant::now()) {
                    session.handle(ScanEvent::from(timer))?;
                }
            }
            Either::Second(event) => session.handle(event)?,
        }
    }

    Ok(())
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => Timer::at(at).await,
        None => core::future::pending().await,
    }
}
