//! Path to handler mapping.
//!
//! The table is built once at startup and never changes afterwards. Lookup
//! never fails: any path that is not registered resolves to the fallback,
//! which is how the captive portal catches OS connectivity checks such as
//! `/generate_204` or `/hotspot-detect.html`.
//!
//! The HTTP method is not part of the match.

use alloc::string::String;
use alloc::vec::Vec;

use crate::motor::MovePreset;

/// Handler selected for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Serve the control page.
    Index,
    /// Switch the LED on.
    LedOn,
    /// Switch the LED off.
    LedOff,
    /// Run a move preset.
    StepperMove(MovePreset),
    /// Decelerate to a stop.
    StepperStop,
}

impl Route {
    /// Short name for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::LedOn => "led-on",
            Self::LedOff => "led-off",
            Self::StepperMove(MovePreset::Forward) => "move-forward",
            Self::StepperMove(MovePreset::Backward) => "move-backward",
            Self::StepperStop => "stop",
        }
    }
}

/// Immutable route table.
#[derive(Clone, Debug)]
pub struct RouteTable {
    entries: Vec<(String, Route)>,
    fallback: Route,
}

impl RouteTable {
    /// Start an empty table whose fallback is [`Route::Index`].
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder {
            entries: Vec::new(),
            fallback: Route::Index,
        }
    }

    /// The portal's routes.
    ///
    /// `/stepper/move3` and `/stepper/move4` are deliberately absent; they
    /// resolve to the fallback.
    pub fn standard() -> Self {
        Self::standard_builder().build()
    }

    /// [`standard`](Self::standard) plus `/stepper/move3` (forward) and
    /// `/stepper/move4` (backward).
    pub fn with_extra_moves() -> Self {
        Self::standard_builder()
            .route("/stepper/move3", Route::StepperMove(MovePreset::Forward))
            .route("/stepper/move4", Route::StepperMove(MovePreset::Backward))
            .build()
    }

    /// Pick the standard or extended table.
    pub fn for_config(register_extra_moves: bool) -> Self {
        if register_extra_moves {
            Self::with_extra_moves()
        } else {
            Self::standard()
        }
    }

    fn standard_builder() -> RouteTableBuilder {
        Self::builder()
            .route("/", Route::Index)
            .route("/LED/on", Route::LedOn)
            .route("/LED/off", Route::LedOff)
            .route("/stepper/move1", Route::StepperMove(MovePreset::Forward))
            .route("/stepper/move2", Route::StepperMove(MovePreset::Backward))
            .route("/stepper/stop", Route::StepperStop)
            .fallback(Route::Index)
    }

    /// Resolve a path (without query string). Exact, case-sensitive match.
    pub fn resolve(&self, path: &str) -> Route {
        self.entries
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, route)| *route)
            .unwrap_or(self.fallback)
    }

    /// True if `path` has its own entry.
    pub fn is_registered(&self, path: &str) -> bool {
        self.entries.iter().any(|(p, _)| p.as_str() == path)
    }

    /// Registered paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// The catch-all route.
    pub fn fallback(&self) -> Route {
        self.fallback
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`RouteTable`].
#[derive(Debug)]
pub struct RouteTableBuilder {
    entries: Vec<(String, Route)>,
    fallback: Route,
}

impl RouteTableBuilder {
    /// Register a path. A later registration of the same path replaces the
    /// earlier one.
    pub fn route(mut self, path: &str, route: Route) -> Self {
        match self.entries.iter_mut().find(|(p, _)| p.as_str() == path) {
            Some(entry) => entry.1 = route,
            None => self.entries.push((String::from(path), route)),
        }
        self
    }

    /// Set the route for unmatched paths.
    pub fn fallback(mut self, route: Route) -> Self {
        self.fallback = route;
        self
    }

    /// Freeze the table.
    pub fn build(self) -> RouteTable {
        RouteTable {
            entries: self.entries,
            fallback: self.fallback,
        }
    }
}
