//! Global static storage for Wi-Fi components.
//!
//! The driver's receive callback is a plain `fn`, so everything it touches
//! lives here with a `'static` lifetime, next to the cells that give the
//! controller and radio the lifetime Embassy tasks need.

use core::sync::atomic::{AtomicBool, AtomicU32};

use esp_radio::wifi::WifiController;
use static_cell::StaticCell;

use crate::runner::EventQueue;

/// Static storage for the Wi-Fi controller.
///
/// Keeps the controller alive (and Wi-Fi started) after the probe scan,
/// for the association that follows it.
pub static WIFI_CONTROLLER: StaticCell<WifiController<'static>> = StaticCell::new();

/// Static storage for radio initialization controller.
///
/// This static cell stores the radio controller that manages WiFi/BLE hardware.
pub static RADIO_INIT: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

/// Frames handed from the sniffer callback to the scan task.
pub static SCAN_EVENTS: EventQueue = EventQueue::new();

/// Set while the scan wants frames; cleared when leaving promiscuous mode.
pub static CAPTURE_ENABLED: AtomicBool = AtomicBool::new(false);

/// Probe frames lost because [`SCAN_EVENTS`] was full.
pub static FRAMES_DROPPED: AtomicU32 = AtomicU32::new(0);
