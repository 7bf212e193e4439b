//! ESP32 captive-portal stepper controller.
//!
//! Brings up the soft access point, the captive DNS server and the HTTP
//! server, then hands everything to the polling main loop:
//!
//! - answers one DNS query per iteration
//! - serves one HTTP request per iteration
//! - advances an outstanding move by one step-if-due
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32-http --bin esp32_main
//!
//! # Override the network name / passphrase at compile time
//! PORTAL_SSID=bench PORTAL_PASSWORD=changeme1 cargo build --release --features esp32-http
//!
//! # Original stall-until-done moves, and move3/move4 registered
//! PORTAL_BLOCKING_MOVES=1 PORTAL_EXTRA_MOVES=1 cargo build --release --features esp32-http
//! ```

use accel_stepper::{OperatingSystemClock, StepAndDirection};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use stepper_portal::config::{AccessPointConfig, Config, MotionConfig, WebConfig};
use stepper_portal::control_loop::ControlLoop;
use stepper_portal::dns::CaptiveDns;
use stepper_portal::hal::esp32::{pins, Esp32AccessPoint, Esp32HttpServer};
use stepper_portal::hal::GpioLed;
use stepper_portal::motor::MoveMode;
use stepper_portal::portal::Portal;
use stepper_portal::services::request_queue;

/// Idle iterations between RTOS yields.
const IDLE_YIELD_EVERY: u32 = 1000;

fn env_flag(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("yes"))
}

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("================================");
    log::info!("  stepper-portal");
    log::info!("================================");

    // =========================================================================
    // Configuration (compile-time overrides only)
    // =========================================================================
    let mut access_point = AccessPointConfig::default();
    if let Some(ssid) = option_env!("PORTAL_SSID") {
        access_point = access_point.with_ssid(ssid);
    }
    if let Some(password) = option_env!("PORTAL_PASSWORD") {
        access_point = access_point.with_password(password);
    }
    let mode = if env_flag(option_env!("PORTAL_BLOCKING_MOVES")) {
        MoveMode::Blocking
    } else {
        MoveMode::NonBlocking
    };
    let config = Config::default()
        .with_access_point(access_point)
        .with_web(WebConfig::default().with_extra_moves(env_flag(option_env!("PORTAL_EXTRA_MOVES"))))
        .with_motion(MotionConfig::default().with_mode(mode));

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Stepper driver (STEP=GPIO18, DIR=GPIO19)
    // =========================================================================
    let step = PinDriver::output(peripherals.pins.gpio18)?;
    let dir = PinDriver::output(peripherals.pins.gpio19)?;
    let stepper = StepAndDirection::new(step, dir);
    log::info!("[OK] Stepper driver on GPIO{}/{}", pins::STEP, pins::DIR);

    // =========================================================================
    // Status LED (GPIO2)
    // =========================================================================
    let led = GpioLed::new(PinDriver::output(peripherals.pins.gpio2)?);
    log::info!("[OK] LED on GPIO{}", pins::LED);

    let mut portal = Portal::from_config(stepper, led, &config);
    log::info!("[OK] Portal ready ({:?} moves)", portal.mode());

    // =========================================================================
    // Access point
    // =========================================================================
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();
    let ap = Esp32AccessPoint::start(peripherals.modem, sysloop, nvs, &config.access_point)?;
    let ap_addr = ap.ip_addr();

    // =========================================================================
    // Captive DNS
    // =========================================================================
    let dns = if config.dns.enabled {
        match CaptiveDns::bind(&config.dns, ap_addr) {
            Ok(dns) => Some(dns),
            Err(e) => {
                log::error!("[DNS] failed to bind port {}: {}", config.dns.port, e);
                None
            }
        }
    } else {
        None
    };

    // =========================================================================
    // HTTP server
    // =========================================================================
    let (sender, queued) = request_queue(config.web.queue_depth);
    let _server = Esp32HttpServer::new(&config.web, sender)?;

    log::info!(
        "[OK] Join '{}' and open http://{}/",
        config.access_point.ssid.as_str(),
        ap_addr
    );

    // =========================================================================
    // Main loop
    // =========================================================================
    let mut main_loop = ControlLoop::new(dns, queued, OperatingSystemClock::new());
    let mut idle = 0u32;
    main_loop.run_with(&mut portal, |tick| {
        if tick.is_idle() {
            idle += 1;
            if idle >= IDLE_YIELD_EVERY {
                idle = 0;
                // Let the idle task feed the watchdog
                FreeRtos::delay_ms(1);
            }
        } else {
            idle = 0;
        }
    })
}
