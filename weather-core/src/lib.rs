//! Core library for the mock weather screen.
//!
//! This crate defines:
//! - Shared domain models (readings, conditions, requests)
//! - A provider abstraction and the randomised mock provider
//! - Screen state, its reducer, and the derived view model
//! - The controller that ties input, provider, and alerts together
//! - Configuration handling
//!
//! It is used by `weather-screen`, but any front-end can drive the controller.

pub mod cancel;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod state;
pub mod view;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use config::Config;
pub use controller::{FetchTicket, Notifier, SubmitOutcome, WeatherScreenController};
pub use error::{FetchError, ValidationError};
pub use model::{Condition, WeatherReading, WeatherRequest};
pub use provider::{WeatherProvider, mock::MockWeatherProvider, provider_from_config};
pub use state::{Alert, AlertKind, DisplayedReading, FailurePolicy, Phase, ScreenState};
pub use view::{ImageKey, ViewModel, derive_view_model};
