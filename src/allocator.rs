//! Heap setup for the esp-radio Wi-Fi driver.
//!
//! The scan core never allocates. The heap only backs the driver's internal
//! state and the RX/TX buffers that promiscuous capture and raw injection use.

/// Reclaimed RAM heap size (from bootloader sections)
const RECLAIMED_HEAP_SIZE: usize = 98768;

/// Size of one driver RX/TX buffer; a full 802.11 frame plus descriptor.
const WIFI_BUFFER_SIZE: usize = 1600;

/// RX buffers the driver allocates up front (esp-radio default).
const STATIC_RX_BUFFERS: usize = 10;

/// Dynamic buffers expected in flight while sniffing a busy channel: queued
/// management frames plus the one injected probe request.
const DYNAMIC_BUFFERS_IN_FLIGHT: usize = 30;

/// Main heap size for Wi-Fi driver buffers
const MAIN_HEAP_SIZE: usize = (STATIC_RX_BUFFERS + DYNAMIC_BUFFERS_IN_FLIGHT) * WIFI_BUFFER_SIZE;

/// Initialize heap allocators for the Wi-Fi driver.
///
/// This function sets up two heap regions:
/// - Reclaimed RAM: driver state and control blocks
/// - Main heap: `STATIC_RX_BUFFERS` plus `DYNAMIC_BUFFERS_IN_FLIGHT`
///   frame buffers for promiscuous RX and raw frame TX
///
/// Must be called once, before [`crate::scanner::probe_scanner`].
pub fn init_heap() {
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: RECLAIMED_HEAP_SIZE);
    esp_alloc::heap_allocator!(size: MAIN_HEAP_SIZE);
}
