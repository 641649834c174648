#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embassy_time::Duration;
use probe_scan::config::{RadioConfig, ScanConfig};
use probe_scan::error::RadioError;
use probe_scan::radio::{Radio, TimerControl, TimerId};
use probe_scan::session::ScanSession;

/// Every command the session sent, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Configure,
    Promiscuous(bool),
    SetChannel(u8),
    Transmit(usize),
    Arm(TimerId, Duration),
    Cancel(TimerId),
}

/// Command that should fail next time it is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Configure,
    Promiscuous(bool),
    SetChannel(u8),
    Transmit,
    Arm(TimerId),
    Cancel(TimerId),
}

/// Shared state behind the mock radio and mock timers, with a virtual clock
/// in milliseconds.
#[derive(Debug, Default)]
pub struct RigState {
    pub log: Vec<Command>,
    pub now_ms: u64,
    pub deadlines: [Option<u64>; 2],
    pub fail: Option<FailPoint>,
    pub promiscuous: bool,
    pub channel: Option<u8>,
    pub configured: Vec<RadioConfig>,
    pub transmitted: Vec<Vec<u8>>,
}

pub type Rig = Rc<RefCell<RigState>>;

impl RigState {
    fn check(&mut self, point: FailPoint) -> Result<(), RadioError> {
        if self.fail == Some(point) {
            self.fail = None;
            return Err(RadioError::Driver(-1));
        }
        Ok(())
    }
}

pub struct MockRadio(pub Rig);

impl Radio for MockRadio {
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        let mut rig = self.0.borrow_mut();
        rig.log.push(Command::Configure);
        rig.check(FailPoint::Configure)?;
        rig.configured.push(*config);
        Ok(())
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), RadioError> {
        let mut rig = self.0.borrow_mut();
        rig.log.push(Command::Promiscuous(enabled));
        rig.check(FailPoint::Promiscuous(enabled))?;
        rig.promiscuous = enabled;
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        let mut rig = self.0.borrow_mut();
        rig.log.push(Command::SetChannel(channel));
        rig.check(FailPoint::SetChannel(channel))?;
        rig.channel = Some(channel);
        Ok(())
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        let mut rig = self.0.borrow_mut();
        rig.log.push(Command::Transmit(frame.len()));
        rig.check(FailPoint::Transmit)?;
        rig.transmitted.push(frame.to_vec());
        Ok(())
    }
}

pub struct MockTimers(pub Rig);

impl TimerControl for MockTimers {
    fn arm(&mut self, timer: TimerId, after: Duration) -> Result<(), RadioError> {
        let mut rig = self.0.borrow_mut();
        rig.log.push(Command::Arm(timer, after));
        rig.check(FailPoint::Arm(timer))?;
        let deadline = rig.now_ms + after.as_millis();
        rig.deadlines[timer.index()] = Some(deadline);
        Ok(())
    }

    fn cancel(&mut self, timer: TimerId) -> Result<(), RadioError> {
        let mut rig = self.0.borrow_mut();
        rig.log.push(Command::Cancel(timer));
        rig.check(FailPoint::Cancel(timer))?;
        rig.deadlines[timer.index()] = None;
        Ok(())
    }

    fn is_armed(&self, timer: TimerId) -> bool {
        self.0.borrow().deadlines[timer.index()].is_some()
    }
}

pub type MockSession<const N: usize = 30> = ScanSession<MockRadio, MockTimers, N>;

pub fn new_rig() -> Rig {
    Rc::new(RefCell::new(RigState::default()))
}

pub fn mock_session<const N: usize>(config: ScanConfig) -> (ScanSession<MockRadio, MockTimers, N>, Rig) {
    let rig = new_rig();
    let session = ScanSession::new(MockRadio(rig.clone()), MockTimers(rig.clone()), config);
    (session, rig)
}

/// Advance the virtual clock to the earliest armed timer and disarm it, the
/// way a one-shot timer fires. Returns the timer and the firing time.
pub fn fire_next(rig: &Rig) -> Option<(TimerId, u64)> {
    let mut state = rig.borrow_mut();
    let (timer, at) = TimerId::ALL
        .into_iter()
        .filter_map(|t| state.deadlines[t.index()].map(|at| (t, at)))
        .min_by_key(|&(_, at)| at)?;
    state.now_ms = at;
    state.deadlines[timer.index()] = None;
    Some((timer, at))
}

/// Fire the next timer into the session.
pub fn step<const N: usize>(
    session: &mut ScanSession<MockRadio, MockTimers, N>,
    rig: &Rig,
) -> Option<(TimerId, u64)> {
    let (timer, at) = fire_next(rig)?;
    let result = match timer {
        TimerId::Probe => session.on_probe_timer(),
        TimerId::Dwell => session.on_dwell_timer(),
    };
    result.expect("timer handler failed");
    Some((timer, at))
}

pub fn deadline(rig: &Rig, timer: TimerId) -> Option<u64> {
    rig.borrow().deadlines[timer.index()]
}

pub fn log_len(rig: &Rig) -> usize {
    rig.borrow().log.len()
}

pub fn log_since(rig: &Rig, from: usize) -> Vec<Command> {
    rig.borrow().log[from..].to_vec()
}

/// A probe request (or response) from `source` with the given SSID, padded
/// with rate elements so it clears the minimum frame length.
pub fn probe_frame(subtype: u8, source: [u8; 6], ssid: &[u8]) -> Vec<u8> {
    let mut frame = vec![subtype, 0x00, 0x00, 0x00];
    frame.extend_from_slice(&[0xFF; 6]);
    frame.extend_from_slice(&source);
    frame.extend_from_slice(&[0xFF; 6]);
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.push(0x00);
    frame.push(ssid.len() as u8);
    frame.extend_from_slice(ssid);
    frame.extend_from_slice(&[0x01, 0x08, 0x82, 0x84, 0x8B, 0x96, 0x12, 0x24, 0x48, 0x6C]);
    frame.extend_from_slice(&[0x32, 0x04, 0x0C, 0x18, 0x30, 0x60]);
    frame
}

pub fn probe_request(source: [u8; 6], ssid: &[u8]) -> Vec<u8> {
    probe_frame(0x40, source, ssid)
}

pub fn probe_response(source: [u8; 6], ssid: &[u8]) -> Vec<u8> {
    probe_frame(0x50, source, ssid)
}

pub fn station_mac(n: u8) -> [u8; 6] {
    [0x02, 0x11, 0x22, 0x33, 0x44, n]
}
