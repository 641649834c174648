//! esp-radio bring-up and the probe scan task for ESP32.
//!
//! This module wires the scan core to the hardware. [`EspRadio`] implements
//! [`Radio`] on top of the esp-radio controller and sniffer, using the
//! `esp-wifi-sys` bindings for the settings esp-radio does not wrap. The
//! sniffer callback feeds [`SCAN_EVENTS`] and [`probe_scan_task`] runs one
//! sweep.

use core::fmt::Error;
use core::sync::atomic::Ordering;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_println::println;
use esp_radio::wifi::{PromiscuousPkt, Protocol, Sniffer, WifiController, WifiMode};
use esp_wifi_sys::include::{
    esp_wifi_config_80211_tx_rate,
    esp_wifi_set_bandwidth,
    esp_wifi_set_channel,
    esp_wifi_set_max_tx_power,
    wifi_bandwidth_t,
    wifi_bandwidth_t_WIFI_BW_HT20,
    wifi_bandwidth_t_WIFI_BW_HT40,
    wifi_interface_t_WIFI_IF_STA,
    wifi_phy_rate_t,
    wifi_phy_rate_t_WIFI_PHY_RATE_1M_L,
    wifi_phy_rate_t_WIFI_PHY_RATE_2M_L,
    wifi_phy_rate_t_WIFI_PHY_RATE_5M_L,
    wifi_phy_rate_t_WIFI_PHY_RATE_11M_L,
    wifi_second_chan_t_WIFI_SECOND_CHAN_NONE,
};

use crate::config::{Bandwidth, PhyProtocol, RadioConfig, ScanConfig, TxRate};
use crate::error::RadioError;
use crate::frame::{RxMeta, parse_frame};
use crate::radio::Radio;
use crate::runner::run_scan;
use crate::session::{ScanEvent, ScanSession};
use crate::timer::DeadlineTimers;
use crate::types::{CAPTURE_ENABLED, FRAMES_DROPPED, RADIO_INIT, SCAN_EVENTS, WIFI_CONTROLLER};

/// Settle time after starting the Wi-Fi controller
const WIFI_SETTLE_MS: u64 = 500;

fn phy_rate(rate: TxRate) -> wifi_phy_rate_t {
    match rate {
        TxRate::Rate1mL => wifi_phy_rate_t_WIFI_PHY_RATE_1M_L,
        TxRate::Rate2mL => wifi_phy_rate_t_WIFI_PHY_RATE_2M_L,
        TxRate::Rate5mL => wifi_phy_rate_t_WIFI_PHY_RATE_5M_L,
        TxRate::Rate11mL => wifi_phy_rate_t_WIFI_PHY_RATE_11M_L,
    }
}

fn protocol(protocol: PhyProtocol) -> Protocol {
    match protocol {
        PhyProtocol::B => Protocol::P802D11B,
        PhyProtocol::BG => Protocol::P802D11BG,
        PhyProtocol::BGN => Protocol::P802D11BGN,
    }
}

fn bandwidth(bandwidth: Bandwidth) -> wifi_bandwidth_t {
    match bandwidth {
        Bandwidth::Ht20 => wifi_bandwidth_t_WIFI_BW_HT20,
        Bandwidth::Ht40 => wifi_bandwidth_t_WIFI_BW_HT40,
    }
}

/// [`Radio`] implementation over the esp-radio controller and sniffer.
pub struct EspRadio {
    controller: &'static mut WifiController<'static>,
    sniffer: Sniffer<'static>,
}

impl EspRadio {
    /// Wrap the controller and sniffer, and install the frame callback.
    ///
    /// Frames are only forwarded while promiscuous mode is on.
    pub fn new(controller: &'static mut WifiController<'static>, mut sniffer: Sniffer<'static>) -> Self {
        sniffer.set_receive_cb(on_promiscuous_packet);
        Self { controller, sniffer }
    }

    /// Give up the sniffer and return the controller, still started and in
    /// station mode, for association.
    pub fn into_controller(self) -> &'static mut WifiController<'static> {
        self.controller
    }
}

impl Radio for EspRadio {
    fn configure(&mut self, config: &RadioConfig) -> Result<(), RadioError> {
        self.controller
            .set_protocol(protocol(config.protocol).into())
            .map_err(|e| {
                println!("Failed to set Wi-Fi protocol: {}", e);
                RadioError::Rejected
            })?;

        // esp-radio has no wrappers for these; the controller is started, so
        // the blob accepts them.
        unsafe {
            RadioError::check(esp_wifi_config_80211_tx_rate(
                wifi_interface_t_WIFI_IF_STA,
                phy_rate(config.tx_rate),
            ))?;
            RadioError::check(esp_wifi_set_max_tx_power(config.max_tx_power))?;
            RadioError::check(esp_wifi_set_bandwidth(
                wifi_interface_t_WIFI_IF_STA,
                bandwidth(config.bandwidth),
            ))?;
        }
        Ok(())
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<(), RadioError> {
        if !enabled {
            CAPTURE_ENABLED.store(false, Ordering::Release);
        }
        self.sniffer.set_promiscuous_mode(enabled).map_err(|e| {
            println!("Failed to set promiscuous mode: {}", e);
            RadioError::Rejected
        })?;
        if enabled {
            CAPTURE_ENABLED.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        RadioError::check(unsafe {
            esp_wifi_set_channel(channel, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE)
        })
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        self.sniffer.send_raw_frame(true, frame, true).map_err(|e| {
            println!("Failed to inject frame: {}", e);
            RadioError::Rejected
        })
    }
}

/// Sniffer callback; runs in the Wi-Fi driver's context.
///
/// Parses the frame and queues probe requests/responses for the scan task.
/// Never blocks: when the queue is full the frame is counted and dropped.
fn on_promiscuous_packet(packet: PromiscuousPkt<'_>) {
    if !CAPTURE_ENABLED.load(Ordering::Acquire) {
        return;
    }

    let rssi = packet.rx_cntl.rssi.clamp(i8::MIN.into(), i8::MAX.into()) as i8;
    let channel = u8::try_from(packet.rx_cntl.channel).unwrap_or(0);
    let frame = parse_frame(packet.data, packet.len, RxMeta::new(rssi, channel));
    if !frame.is_probe() {
        return;
    }

    if SCAN_EVENTS.try_send(ScanEvent::Frame(frame)).is_err() {
        FRAMES_DROPPED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Embassy task that runs one probe sweep and reports what it heard.
///
/// On success the radio has left promiscuous mode and the station list is
/// printed for the association step that follows the scan.
#[embassy_executor::task]
pub async fn probe_scan_task(radio: EspRadio) {
    let mut session: ScanSession<EspRadio, DeadlineTimers> =
        ScanSession::new(radio, DeadlineTimers::new(), ScanConfig::default());

    println!("Starting probe scan...");
    if let Err(e) = run_scan(&mut session, &SCAN_EVENTS).await {
        println!("Probe scan aborted: {}", e);
        return;
    }

    let probes_sent = session.stats().probes_sent;
    let (radio, _, stations) = session.into_parts();
    println!(
        "Probe scan finished: {} stations, {} probes sent, {} frames dropped",
        stations.count(),
        probes_sent,
        FRAMES_DROPPED.load(Ordering::Relaxed)
    );

    for (i, station) in stations.iter().enumerate() {
        match &station.ssid {
            Some(ssid) => println!(
                "  {}: BSSID: {}, SSID: {}, Channel: {}, RSSI: {}, Responded: {}",
                i + 1,
                station.address,
                ssid,
                station.channel,
                station.signal_strength,
                station.heard_as_response
            ),
            None => println!(
                "  {}: BSSID: {}, Channel: {}, RSSI: {}, Responded: {}",
                i + 1,
                station.address,
                station.channel,
                station.signal_strength,
                station.heard_as_response
            ),
        }
    }

    match radio.into_controller().is_started() {
        Ok(true) => println!("Handing radio over to association"),
        _ => println!("Wi-Fi controller is not running, skipping association"),
    }
}

/// Initializes the Wi-Fi subsystem and spawns the probe scan task.
///
/// This function sets up the radio and Wi-Fi controller in station mode,
/// starts it, and spawns [`probe_scan_task`] with an [`EspRadio`] built on
/// the sniffer interface.
///
/// # Arguments
///
/// * `spawner` - Embassy task spawner for creating the scan task
/// * `device` - WiFi peripheral device with static lifetime
///
/// # Errors
///
/// This function will return an error if:
/// - Radio initialization fails
/// - WiFi controller creation fails
/// - Setting WiFi mode fails
/// - Starting the WiFi controller fails
/// - Spawning the scan task fails
pub async fn probe_scanner(spawner: Spawner, device: WIFI<'static>) -> Result<(), Error> {
    let radio_init = esp_radio::init().map_err(|e| {
        println!("Failed to initialize radio controller: {}", e);
        Error
    })?;
    let radio_init = RADIO_INIT.init(radio_init);

    println!("Radio initialized!");

    println!("Creating WiFi controller...");
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio_init, device, Default::default()).map_err(|e| {
            println!("Failed to create WiFi controller: {}", e);
            Error
        })?;
    println!("WiFi controller created!");

    let wifi_controller = WIFI_CONTROLLER.init(wifi_controller);

    wifi_controller.set_mode(WifiMode::Sta).map_err(|e| {
        println!("Failed to set Wi-Fi mode: {}", e);
        Error
    })?;

    println!("Starting WiFi controller...");
    wifi_controller.start_async().await.map_err(|e| {
        println!("Failed to start Wi-Fi controller: {}", e);
        Error
    })?;
    println!("WiFi controller started!");

    // Give WiFi some time to initialize
    Timer::after(Duration::from_millis(WIFI_SETTLE_MS)).await;

    let radio = EspRadio::new(wifi_controller, interfaces.sniffer);
    spawner.spawn(probe_scan_task(radio)).map_err(|e| {
        println!("Failed to spawn probe scan task: {}", e);
        Error
    })?;

    Ok(())
}
