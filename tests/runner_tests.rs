mod test_utils;

use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use probe_scan::config::{CHANNEL_PLAN, ScanConfig};
use probe_scan::error::{RadioError, ScanError};
use probe_scan::frame::{MacAddress, RxMeta, parse_frame};
use probe_scan::runner::run_scan;
use probe_scan::session::{ScanEvent, ScanPhase, ScanSession};
use probe_scan::timer::DeadlineTimers;
use test_utils::*;

const STATION: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

type Queue = Channel<CriticalSectionRawMutex, ScanEvent, 4>;

fn fast_config() -> ScanConfig {
    ScanConfig::default()
        .with_probe_delay(Duration::from_millis(2))
        .with_post_probe_listen(Duration::from_millis(5))
        .with_dwell_time(Duration::from_millis(5))
}

fn timed_session(rig: &Rig) -> ScanSession<MockRadio, DeadlineTimers> {
    ScanSession::new(MockRadio(rig.clone()), DeadlineTimers::new(), fast_config())
}

fn sighting() -> ScanEvent {
    let buffer = probe_request(STATION, b"home");
    ScanEvent::Frame(parse_frame(&buffer, buffer.len(), RxMeta::new(-30, 1)))
}

fn tuned_channels(rig: &Rig) -> Vec<u8> {
    rig.borrow()
        .log
        .iter()
        .filter_map(|c| match c {
            Command::SetChannel(ch) => Some(*ch),
            _ => None,
        })
        .collect()
}

#[test]
fn sweep_runs_to_completion_and_keeps_sightings() {
    let rig = new_rig();
    let mut session = timed_session(&rig);
    let events = Queue::new();

    let (result, ()) = block_on(join(run_scan(&mut session, &events), async {
        Timer::after_millis(1).await;
        events.send(sighting()).await;
    }));

    result.unwrap();
    assert_eq!(session.phase(), ScanPhase::Connecting);
    assert_eq!(tuned_channels(&rig), CHANNEL_PLAN.to_vec());
    assert!(!rig.borrow().promiscuous);
    assert_eq!(session.timers().next_deadline(), None);

    let record = session.stations().get(&MacAddress(STATION)).unwrap();
    assert_eq!(record.signal_strength, -30);
    assert_eq!(session.stations().count(), 1);
}

#[test]
fn stale_events_are_discarded_before_start() {
    let rig = new_rig();
    let mut session = timed_session(&rig);
    let events = Queue::new();
    events.try_send(sighting()).unwrap();
    events.try_send(ScanEvent::DwellTimer).unwrap();

    block_on(run_scan(&mut session, &events)).unwrap();

    assert!(session.stations().is_empty());
    assert_eq!(tuned_channels(&rig), CHANNEL_PLAN.to_vec());
    assert_eq!(session.stats().probes_sent as usize, CHANNEL_PLAN.len());
}

#[test]
fn radio_failure_ends_the_loop_with_the_error() {
    let rig = new_rig();
    rig.borrow_mut().fail = Some(FailPoint::Transmit);
    let mut session = timed_session(&rig);
    let events = Queue::new();

    let err = block_on(run_scan(&mut session, &events)).unwrap_err();

    assert_eq!(
        err,
        ScanError::Transmit {
            channel: 1,
            source: RadioError::Driver(-1),
        }
    );
    assert_eq!(session.phase(), ScanPhase::Aborted);
    assert_eq!(session.fault(), Some(&err));
    assert_eq!(session.timers().next_deadline(), None);
    assert_eq!(tuned_channels(&rig), vec![1]);
}

#[test]
fn timers_due_in_one_wakeup_are_all_handled() {
    let rig = new_rig();
    let config = ScanConfig::default()
        .with_probe_delay(Duration::from_millis(0))
        .with_post_probe_listen(Duration::from_millis(0))
        .with_dwell_time(Duration::from_millis(0));
    let mut session: ScanSession<_, _> =
        ScanSession::new(MockRadio(rig.clone()), DeadlineTimers::new(), config);
    let events = Queue::new();

    block_on(run_scan(&mut session, &events)).unwrap();

    assert_eq!(session.phase(), ScanPhase::Connecting);
    assert_eq!(tuned_channels(&rig), CHANNEL_PLAN.to_vec());
    assert_eq!(session.stats().probes_sent as usize, CHANNEL_PLAN.len());
}
