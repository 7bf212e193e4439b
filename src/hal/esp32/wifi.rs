//! Soft access point bring-up for ESP32.
//!
//! The device runs its own network; clients get a DHCP lease with the AP
//! address as their DNS server, which is what makes the captive DNS work.
//!
//! # Example
//!
//! ```ignore
//! use stepper_portal::hal::esp32::Esp32AccessPoint;
//! use stepper_portal::config::AccessPointConfig;
//!
//! let ap = Esp32AccessPoint::start(modem, sysloop, nvs, &AccessPointConfig::default())?;
//! println!("AP address: {}", ap.ip_addr());
//! ```

use crate::config::AccessPointConfig;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::ipv4::{self, Mask, Subnet};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi, WifiDriver,
};
use std::net::Ipv4Addr;

/// Running soft access point.
///
/// The network stays up for the lifetime of this struct.
pub struct Esp32AccessPoint<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
    address: Ipv4Addr,
}

impl<'a> Esp32AccessPoint<'a> {
    /// Configure and start the access point.
    ///
    /// The AP netif is a /24 router on `config.address` with DHCP on and the
    /// AP itself advertised as DNS server.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are invalid (empty SSID, or a
    /// passphrase shorter than 8 characters) or the driver fails to start.
    pub fn start(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &AccessPointConfig,
    ) -> anyhow::Result<Self> {
        if !config.is_valid() {
            anyhow::bail!(
                "invalid access point credentials for '{}'",
                config.ssid.as_str()
            );
        }

        let [a, b, c, d] = config.address;
        let address = Ipv4Addr::new(a, b, c, d);

        let ap_netif = EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: Some(ipv4::Configuration::Router(ipv4::RouterConfiguration {
                subnet: Subnet {
                    gateway: address,
                    mask: Mask(24),
                },
                dhcp_enabled: true,
                dns: Some(address),
                secondary_dns: None,
            })),
            ..NetifConfiguration::wifi_default_router()
        })?;
        let sta_netif = EspNetif::new(NetifStack::Sta)?;
        let driver = WifiDriver::new(modem, sysloop.clone(), nvs)?;

        let mut wifi = BlockingWifi::wrap(
            EspWifi::wrap_all(driver, sta_netif, ap_netif)?,
            sysloop,
        )?;

        let ssid: heapless::String<32> = config
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow::anyhow!("SSID longer than 32 bytes"))?;
        let password: heapless::String<64> = config
            .password
            .as_str()
            .try_into()
            .map_err(|_| anyhow::anyhow!("passphrase longer than 64 bytes"))?;
        let auth_method = if config.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
            ssid,
            password,
            ssid_hidden: false,
            channel: config.channel,
            auth_method,
            max_connections: config.max_connections,
            ..Default::default()
        }))?;

        log::info!("[WiFi] Starting access point '{}'...", config.ssid.as_str());
        wifi.start()?;
        wifi.wait_netif_up()?;

        let ap = Self { wifi, address };
        log::info!("[WiFi] Access point up at {}", ap.ip_addr());
        Ok(ap)
    }

    /// Address of the AP interface, as reported by the netif (falls back to
    /// the configured address).
    pub fn ip_addr(&self) -> Ipv4Addr {
        self.wifi
            .wifi()
            .ap_netif()
            .get_ip_info()
            .map(|info| info.ip)
            .unwrap_or(self.address)
    }

    /// Get the underlying WiFi driver for advanced operations.
    pub fn driver(&self) -> &EspWifi<'a> {
        self.wifi.wifi()
    }
}
