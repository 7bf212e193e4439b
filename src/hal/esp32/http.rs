//! esp-idf-svc HTTP server feeding the main loop's request queue.
//!
//! One wildcard handler per method catches every URI. Handlers run on the
//! server task, hand the request to the loop through a
//! [`RequestSender`](crate::services::RequestSender), and write back
//! whatever the loop answers. Routing happens in the loop, never here.
//!
//! # Example
//!
//! ```ignore
//! use stepper_portal::hal::esp32::Esp32HttpServer;
//! use stepper_portal::services::request_queue;
//! use stepper_portal::config::WebConfig;
//!
//! let (sender, queued) = request_queue(8);
//! let server = Esp32HttpServer::new(&WebConfig::default(), sender)?;
//! // hand `queued` to the ControlLoop; keep `server` alive
//! ```

use crate::config::WebConfig;
use crate::services::RequestSender;
use crate::traits::{HttpMethod, HttpRequest};
use esp_idf_hal::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;

/// Methods the wildcard handler is registered for.
const METHODS: [(Method, HttpMethod); 5] = [
    (Method::Get, HttpMethod::Get),
    (Method::Post, HttpMethod::Post),
    (Method::Put, HttpMethod::Put),
    (Method::Delete, HttpMethod::Delete),
    (Method::Head, HttpMethod::Head),
];

/// Running HTTP server. Stops when dropped.
pub struct Esp32HttpServer {
    _server: EspHttpServer<'static>,
}

impl Esp32HttpServer {
    /// Start the server on `config.port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails to start or a handler
    /// cannot be registered.
    pub fn new(config: &WebConfig, sender: RequestSender) -> anyhow::Result<Self> {
        let server_config = Configuration {
            http_port: config.port,
            uri_match_wildcard: true,
            stack_size: 8192,
            ..Default::default()
        };

        let mut server = EspHttpServer::new(&server_config)?;

        for (method, ours) in METHODS {
            let sender = sender.clone();
            server.fn_handler::<anyhow::Error, _>("/*", method, move |req| {
                let request = HttpRequest::new(ours, req.uri());
                match sender.call(request) {
                    Ok(response) => {
                        let mut resp = req.into_response(
                            response.status,
                            None,
                            &[("Content-Type", response.content_type)],
                        )?;
                        resp.write_all(&response.body)?;
                    }
                    Err(e) => {
                        log::warn!("[HTTP] {}", e);
                        let mut resp = req.into_response(503, None, &[])?;
                        resp.write_all(b"unavailable")?;
                    }
                }
                Ok(())
            })?;
        }

        log::info!("[HTTP] Server listening on port {}", config.port);
        Ok(Self { _server: server })
    }
}
