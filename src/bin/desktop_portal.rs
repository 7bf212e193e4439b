//! Desktop simulator for the stepper portal.
//!
//! Runs the same portal and main loop as the firmware against a simulated
//! stepper and a console LED. axum stands in for the device's HTTP server;
//! the captive DNS binds a high port so it runs without root.
//!
//! ```bash
//! cargo run --features web --bin desktop_portal
//! # then open http://localhost:8080/
//! dig @127.0.0.1 -p 5353 example.com
//! ```
//!
//! Environment:
//!
//! - `PORTAL_HTTP_PORT` (default 8080)
//! - `PORTAL_DNS_PORT` (default 5353)
//! - `PORTAL_BLOCKING_MOVES=1` for stall-until-done moves
//! - `PORTAL_EXTRA_MOVES=1` to register move3/move4
//! - `RUST_LOG` for log filtering (e.g. `RUST_LOG=debug`)

use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use accel_stepper::OperatingSystemClock;
use anyhow::Context;
use stepper_portal::config::{Config, DnsConfig, MotionConfig, WebConfig};
use stepper_portal::control_loop::ControlLoop;
use stepper_portal::dns::CaptiveDns;
use stepper_portal::hal::{ConsoleLed, MockStepper};
use stepper_portal::motor::MoveMode;
use stepper_portal::portal::Portal;
use stepper_portal::services::{request_queue, run_server, WebServerConfig};

/// Back-off on idle iterations so the simulator does not spin a core.
const IDLE_SLEEP_US: u64 = 200;

fn env_port(name: &str, default: u16) -> anyhow::Result<u16> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{name} must be a port number, got '{value}'")),
        Err(_) => Ok(default),
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mode = if env_flag("PORTAL_BLOCKING_MOVES") {
        MoveMode::Blocking
    } else {
        MoveMode::NonBlocking
    };
    let config = Config::default()
        .with_dns(DnsConfig::default().with_port(env_port("PORTAL_DNS_PORT", 5353)?))
        .with_web(
            WebConfig::default()
                .with_port(env_port("PORTAL_HTTP_PORT", 8080)?)
                .with_extra_moves(env_flag("PORTAL_EXTRA_MOVES")),
        )
        .with_motion(MotionConfig::default().with_mode(mode));

    let [a, b, c, d] = config.access_point.address;
    let answer = Ipv4Addr::new(a, b, c, d);
    let dns = match CaptiveDns::bind(&config.dns, answer) {
        Ok(dns) => Some(dns),
        Err(e) => {
            log::warn!("[DNS] disabled, bind on port {} failed: {}", config.dns.port, e);
            None
        }
    };

    let (sender, queued) = request_queue(config.web.queue_depth);

    let loop_config = config.clone();
    thread::Builder::new()
        .name("portal-loop".into())
        .spawn(move || {
            let mut portal = Portal::from_config(MockStepper::new(), ConsoleLed::new(), &loop_config);
            log::info!("[Sim] portal ready ({:?} moves)", portal.mode());
            let mut main_loop = ControlLoop::new(dns, queued, OperatingSystemClock::new());
            main_loop.run_with(&mut portal, |tick| {
                if tick.is_idle() {
                    thread::sleep(Duration::from_micros(IDLE_SLEEP_US));
                }
            })
        })
        .context("spawning main loop thread")?;

    run_server(sender, WebServerConfig::from_config(&config.web)).await?;
    Ok(())
}
