//! Shared configuration for the firmware and the desktop simulator.
//!
//! Uses `heapless::String` so the same types work without an allocator.
//! Defaults reproduce the stock portal: open access point `ovo`, captive DNS
//! on port 53 answering every name, HTTP on port 80, ±2000-step moves.
//!
//! # Example
//!
//! ```rust
//! use stepper_portal::config::{AccessPointConfig, Config, DnsConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.access_point.ssid.as_str(), "ovo");
//!
//! // Or customize
//! let config = Config::default()
//!     .with_access_point(AccessPointConfig::default().with_ssid("bench"))
//!     .with_dns(DnsConfig::default().with_port(5353))
//!     .with_web(WebConfig::default().with_port(8080));
//! ```

use heapless::String as HString;

use crate::motor::{MoveCommand, MoveMode, MovePreset};

/// Maximum length for short config strings (SSIDs, passphrases, names)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (DNS names)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helpers for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating on a char boundary if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating on a char boundary if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Soft access point configuration
    pub access_point: AccessPointConfig,
    /// Captive DNS configuration
    pub dns: DnsConfig,
    /// HTTP server configuration
    pub web: WebConfig,
    /// Move presets and execution mode
    pub motion: MotionConfig,
}

impl Config {
    /// Set access point configuration
    pub fn with_access_point(mut self, access_point: AccessPointConfig) -> Self {
        self.access_point = access_point;
        self
    }

    /// Set DNS configuration
    pub fn with_dns(mut self, dns: DnsConfig) -> Self {
        self.dns = dns;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set motion configuration
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }
}

// ============================================================================
// Access Point Config
// ============================================================================

/// Soft access point configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessPointConfig {
    /// Network name broadcast by the device
    pub ssid: ShortString,
    /// WPA2 passphrase (empty = open network)
    pub password: ShortString,
    /// 2.4 GHz channel
    pub channel: u8,
    /// Maximum simultaneous stations
    pub max_connections: u16,
    /// Address the access point serves on, answered by the captive DNS
    pub address: [u8; 4],
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            ssid: short_string("ovo"),
            password: short_string("twx20051"),
            channel: 1,
            max_connections: 4,
            address: [192, 168, 4, 1],
        }
    }
}

impl AccessPointConfig {
    /// Minimum WPA2 passphrase length
    pub const MIN_PASSWORD_LEN: usize = 8;

    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the passphrase
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the channel
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Set the station limit
    pub fn with_max_connections(mut self, max: u16) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the access point address
    pub fn with_address(mut self, address: [u8; 4]) -> Self {
        self.address = address;
        self
    }

    /// True when no passphrase is set
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }

    /// SSID is non-empty and the passphrase is either empty or long enough
    /// for WPA2.
    pub fn is_valid(&self) -> bool {
        !self.ssid.is_empty()
            && (self.is_open() || self.password.len() >= Self::MIN_PASSWORD_LEN)
    }
}

// ============================================================================
// DNS Config
// ============================================================================

/// Captive DNS configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DnsConfig {
    /// UDP port to listen on
    pub port: u16,
    /// Name to answer; `*` answers every name
    pub domain: LongString,
    /// TTL for answers in seconds
    pub ttl_secs: u32,
    /// Whether the DNS server is started
    pub enabled: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            port: 53,
            domain: long_string("*"),
            ttl_secs: 60,
            enabled: true,
        }
    }
}

impl DnsConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the answered domain
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = long_string(domain);
        self
    }

    /// Set the answer TTL
    pub fn with_ttl_secs(mut self, ttl: u32) -> Self {
        self.ttl_secs = ttl;
        self
    }

    /// Enable or disable the DNS server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// True when every name is answered
    pub fn is_wildcard(&self) -> bool {
        self.domain.as_str() == "*"
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// HTTP server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins (desktop front-end)
    pub cors_permissive: bool,
    /// Register `/stepper/move3` and `/stepper/move4` as forward/backward.
    /// Off by default: the page shows those buttons but they land on the
    /// control page.
    pub register_extra_moves: bool,
    /// Pending requests the loop queue holds before callers block
    pub queue_depth: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 80,
            cors_permissive: true,
            register_extra_moves: false,
            queue_depth: 8,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Register or leave unregistered the move3/move4 routes
    pub fn with_extra_moves(mut self, register: bool) -> Self {
        self.register_extra_moves = register;
        self
    }

    /// Set the request queue depth (at least 1)
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }
}

// ============================================================================
// Motion Config
// ============================================================================

/// Move presets and execution mode
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Maximum speed in steps/s
    pub max_speed: f32,
    /// Acceleration in steps/s²
    pub acceleration: f32,
    /// Absolute target of the forward preset
    pub forward_target: i64,
    /// Absolute target of the backward preset
    pub backward_target: i64,
    /// Blocking or non-blocking moves
    pub mode: MoveMode,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: MoveCommand::DEFAULT_MAX_SPEED,
            acceleration: MoveCommand::DEFAULT_ACCELERATION,
            forward_target: MoveCommand::DEFAULT_TRAVEL,
            backward_target: -MoveCommand::DEFAULT_TRAVEL,
            mode: MoveMode::NonBlocking,
        }
    }
}

impl MotionConfig {
    /// Set the maximum speed (magnitude)
    pub fn with_max_speed(mut self, steps_per_second: f32) -> Self {
        self.max_speed = libm::fabsf(steps_per_second);
        self
    }

    /// Set the acceleration (magnitude)
    pub fn with_acceleration(mut self, acceleration: f32) -> Self {
        self.acceleration = libm::fabsf(acceleration);
        self
    }

    /// Set both preset targets
    pub fn with_targets(mut self, forward: i64, backward: i64) -> Self {
        self.forward_target = forward;
        self.backward_target = backward;
        self
    }

    /// Set the execution mode
    pub fn with_mode(mut self, mode: MoveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the command for a preset
    pub fn command(&self, preset: MovePreset) -> MoveCommand {
        let target = match preset {
            MovePreset::Forward => self.forward_target,
            MovePreset::Backward => self.backward_target,
        };
        MoveCommand::new(target, self.max_speed, self.acceleration)
    }
}

// ============================================================================
// Tests
// ============================================================================
