//! Screen state and the pure reducer that drives it.
//!
//! `reduce` never performs I/O. Anything with a side effect (starting a fetch,
//! raising a blocking alert) is returned as an [`Effect`] for the caller to run.
//!
//! Every fetch is tagged with a sequence number. Only the resolution carrying
//! the current in-flight number is applied; anything else is stale and dropped.
//! Submitting while a fetch is in flight is ignored, mirroring the disabled
//! search action.

use serde::{Deserialize, Serialize};

use crate::{FetchError, ValidationError, WeatherReading};

/// What happens to the previous reading when a later fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Drop the old reading so the error is the only thing on screen.
    #[default]
    ClearReading,
    /// Keep showing the last successful reading beneath the error.
    KeepLastKnownGood,
}

impl FailurePolicy {
    pub const ALL: [FailurePolicy; 2] =
        [FailurePolicy::ClearReading, FailurePolicy::KeepLastKnownGood];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::ClearReading => "clear-reading",
            FailurePolicy::KeepLastKnownGood => "keep-last-known-good",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading together with the city it was requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedReading {
    pub city: String,
    pub reading: WeatherReading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    seq: u64,
    city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScreenState {
    city_input: String,
    in_flight: Option<InFlight>,
    last_seq: u64,
    last_reading: Option<DisplayedReading>,
    last_error: Option<FetchError>,
    policy: FailurePolicy,
}

impl ScreenState {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn city_input(&self) -> &str {
        &self.city_input
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_seq(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|f| f.seq)
    }

    pub fn last_reading(&self) -> Option<&DisplayedReading> {
        self.last_reading.as_ref()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading() {
            Phase::Loading
        } else if self.last_error.is_some() {
            Phase::Failure
        } else if self.last_reading.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CityInputChanged(String),
    SubmitRequested,
    FetchResolved {
        seq: u64,
        result: Result<WeatherReading, FetchError>,
    },
    FetchCancelled {
        seq: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    ValidationFailure,
    FetchFailure,
}

/// Payload of a blocking, acknowledge-only dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn validation(err: &ValidationError) -> Self {
        Self {
            kind: AlertKind::ValidationFailure,
            title: "Error".to_string(),
            message: err.to_string(),
        }
    }

    pub fn fetch_failure() -> Self {
        Self {
            kind: AlertKind::FetchFailure,
            title: "Error".to_string(),
            message: "Unable to retrieve weather data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartFetch(FetchRequest),
    Alert(Alert),
}

/// Trim the raw input, rejecting empty or whitespace-only cities.
pub fn validate_city(raw: &str) -> Result<&str, ValidationError> {
    let city = raw.trim();
    if city.is_empty() {
        Err(ValidationError::EmptyCity)
    } else {
        Ok(city)
    }
}

pub fn reduce(state: &ScreenState, event: Event) -> (ScreenState, Vec<Effect>) {
    let mut next = state.clone();

    match event {
        Event::CityInputChanged(text) => {
            next.city_input = text;
            (next, Vec::new())
        }

        Event::SubmitRequested => {
            if state.is_loading() {
                return (next, Vec::new());
            }

            let city = match validate_city(&state.city_input) {
                Ok(city) => city.to_string(),
                Err(err) => return (next, vec![Effect::Alert(Alert::validation(&err))]),
            };

            let seq = state.last_seq + 1;
            next.last_seq = seq;
            next.last_error = None;
            next.in_flight = Some(InFlight { seq, city: city.clone() });

            (next, vec![Effect::StartFetch(FetchRequest { seq, city })])
        }

        Event::FetchResolved { seq, result } => {
            let Some(in_flight) = next.in_flight.take_if(|f| f.seq == seq) else {
                return (next, Vec::new());
            };

            match result {
                Ok(reading) => {
                    next.last_reading = Some(DisplayedReading { city: in_flight.city, reading });
                    (next, Vec::new())
                }
                Err(FetchError::Cancelled) => (next, Vec::new()),
                Err(err) => {
                    next.last_error = Some(err);
                    if next.policy == FailurePolicy::ClearReading {
                        next.last_reading = None;
                    }
                    (next, vec![Effect::Alert(Alert::fetch_failure())])
                }
            }
        }

        Event::FetchCancelled { seq } => {
            if next.in_flight_seq() == Some(seq) {
                next.in_flight = None;
            }
            (next, Vec::new())
        }
    }
}
