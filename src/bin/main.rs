#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use esp_println::println;
use panic_rtt_target as _;
use probe_scan::{allocator, scanner};

esp_bootloader_esp_idf::esp_app_desc!();

/// Interval of the idle heartbeat once the scan task is running
const HEARTBEAT_SECS: u64 = 10;

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_defmt!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    allocator::init_heap();
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    println!("Embassy initialized!");

    if scanner::probe_scanner(spawner, peripherals.WIFI).await.is_err() {
        println!("Probe scanner failed to start");
    }

    loop {
        Timer::after(Duration::from_secs(HEARTBEAT_SECS)).await;
    }
}
