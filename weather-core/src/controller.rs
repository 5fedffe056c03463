//! The interactive screen: owns [`ScreenState`], runs the effects the reducer
//! emits, and talks to the provider.

use std::{fmt::Debug, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
    Alert, CancelHandle, CancelToken, FetchError, WeatherProvider, WeatherReading, WeatherRequest,
    cancel::cancel_pair,
    state::{Effect, Event, FailurePolicy, FetchRequest, ScreenState, reduce},
    view::{ViewModel, derive_view_model},
};

/// Sink for blocking, acknowledge-only alerts.
pub trait Notifier: Send + Sync + Debug {
    fn alert(&self, alert: &Alert);
}

/// A started fetch. Hand it to [`WeatherScreenController::run_fetch`] (or
/// drive the provider yourself) and report back through `complete`.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub request: FetchRequest,
    pub cancel: CancelToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A reading was stored.
    Resolved,
    /// The provider failed; the error is now on screen.
    Failed,
    /// The input was blank; nothing was started.
    Rejected,
    /// A fetch was already in flight.
    Busy,
    /// The fetch was cancelled before it resolved.
    Cancelled,
    /// The fetch resolved but had been superseded.
    Stale,
}

#[derive(Debug)]
pub struct WeatherScreenController {
    state: ScreenState,
    provider: Arc<dyn WeatherProvider>,
    notifier: Arc<dyn Notifier>,
    in_flight: Option<(u64, CancelHandle)>,
}

impl WeatherScreenController {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        notifier: Arc<dyn Notifier>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            state: ScreenState::new(policy),
            provider,
            notifier,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    pub fn view_model(&self) -> ViewModel {
        derive_view_model(&self.state)
    }

    pub fn set_city_input(&mut self, text: impl Into<String>) {
        self.dispatch(Event::CityInputChanged(text.into()));
    }

    /// Apply an event, raising any alerts it produces. Returns the fetch to
    /// start, if any.
    fn dispatch(&mut self, event: Event) -> Option<FetchRequest> {
        let (next, effects) = reduce(&self.state, event);
        self.state = next;

        let mut start = None;
        for effect in effects {
            match effect {
                Effect::Alert(alert) => {
                    debug!(kind = ?alert.kind, message = %alert.message, "raising alert");
                    self.notifier.alert(&alert);
                }
                Effect::StartFetch(request) => start = Some(request),
            }
        }
        start
    }

    /// Validate the input and enter the loading state.
    ///
    /// Returns `Err` with the reason when no fetch was started.
    pub fn begin_submit(&mut self) -> Result<FetchTicket, SubmitOutcome> {
        if self.state.is_loading() {
            debug!("submit ignored, fetch already in flight");
            return Err(SubmitOutcome::Busy);
        }

        let request = self.dispatch(Event::SubmitRequested).ok_or(SubmitOutcome::Rejected)?;
        let (handle, cancel) = cancel_pair();
        self.in_flight = Some((request.seq, handle));

        info!(seq = request.seq, city = %request.city, "weather fetch started");
        Ok(FetchTicket { request, cancel })
    }

    /// Run the provider for a ticket. Does not touch screen state.
    pub async fn run_fetch(&self, ticket: &FetchTicket) -> Result<WeatherReading, FetchError> {
        let request = WeatherRequest::new(ticket.request.city.clone());
        self.provider.fetch_reading(&request, &ticket.cancel).await
    }

    /// Feed a provider result back into the screen.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<WeatherReading, FetchError>,
    ) -> SubmitOutcome {
        if self.state.in_flight_seq() != Some(seq) {
            debug!(seq, "discarding stale weather result");
            return SubmitOutcome::Stale;
        }
        if self.in_flight.as_ref().is_some_and(|(s, _)| *s == seq) {
            self.in_flight = None;
        }

        let outcome = match &result {
            Ok(reading) => {
                info!(seq, condition = %reading.condition, "weather fetch resolved");
                SubmitOutcome::Resolved
            }
            Err(FetchError::Cancelled) => {
                debug!(seq, "weather fetch cancelled");
                SubmitOutcome::Cancelled
            }
            Err(err) => {
                warn!(seq, error = %err, "weather fetch failed");
                SubmitOutcome::Failed
            }
        };

        self.dispatch(Event::FetchResolved { seq, result });
        outcome
    }

    /// Abandon the in-flight fetch, if any, and leave the loading state.
    pub fn cancel_in_flight(&mut self) {
        if let Some((seq, handle)) = self.in_flight.take() {
            handle.cancel();
            debug!(seq, "weather fetch cancelled by caller");
            self.dispatch(Event::FetchCancelled { seq });
        }
    }

    /// Validate, fetch, and store the outcome. Loading is cleared on every path.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let result = self.run_fetch(&ticket).await;
        self.complete(ticket.request.seq, result)
    }
}

impl Drop for WeatherScreenController {
    fn drop(&mut self) {
        if let Some((seq, handle)) = self.in_flight.take() {
            debug!(seq, "screen torn down with fetch in flight");
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlertKind, MockWeatherProvider, provider::DEFAULT_DELAY, state::Phase};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        alerts: Mutex<Vec<Alert>>,
    }

    impl RecordingNotifier {
        fn kinds(&self) -> Vec<AlertKind> {
            self.alerts.lock().unwrap().iter().map(|a| a.kind).collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn alert(&self, alert: &Alert) {
            self.alerts.lock().unwrap().push(alert.clone());
        }
    }

    #[derive(Debug, Default)]
    struct FailingProvider;

    #[async_trait]
    impl WeatherProvider for FailingProvider {
        async fn fetch_reading(
            &self,
            _request: &WeatherRequest,
            _cancel: &CancelToken,
        ) -> Result<WeatherReading, FetchError> {
            Err(FetchError::Failure("unreachable host".into()))
        }
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        inner: MockWeatherProvider,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn fetch_reading(
            &self,
            request: &WeatherRequest,
            cancel: &CancelToken,
        ) -> Result<WeatherReading, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.inner.fetch_reading(request, cancel).await
        }
    }

    fn controller(
        provider: Arc<dyn WeatherProvider>,
    ) -> (WeatherScreenController, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let ctl = WeatherScreenController::new(
            provider,
            notifier.clone(),
            FailurePolicy::ClearReading,
        );
        (ctl, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn rome_scenario_resolves_after_delay() {
        let (mut ctl, notifier) =
            controller(Arc::new(MockWeatherProvider::default().with_seed(3)));
        ctl.set_city_input("Rome");

        let start = tokio::time::Instant::now();
        assert_eq!(ctl.submit().await, SubmitOutcome::Resolved);
        assert!(start.elapsed() >= DEFAULT_DELAY);

        assert_eq!(ctl.state().phase(), Phase::Success);
        let vm = ctl.view_model();
        assert!(!vm.show_spinner);
        assert!(vm.show_error.is_none());
        let shown = vm.show_result.expect("reading shown");
        assert_eq!(shown.city, "Rome");
        assert!(shown.reading.is_within_ranges());
        assert!(notifier.kinds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_alerts_once_and_never_loads() {
        let provider = Arc::new(CountingProvider::default());
        let (mut ctl, notifier) = controller(provider.clone());
        ctl.set_city_input("   ");

        assert_eq!(ctl.submit().await, SubmitOutcome::Rejected);

        assert_eq!(ctl.state().phase(), Phase::Idle);
        assert_eq!(notifier.kinds(), vec![AlertKind::ValidationFailure]);
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_alerts_and_clears_loading() {
        let (mut ctl, notifier) = controller(Arc::new(FailingProvider));
        ctl.set_city_input("Rome");

        assert_eq!(ctl.submit().await, SubmitOutcome::Failed);

        assert!(!ctl.state().is_loading());
        assert_eq!(notifier.kinds(), vec![AlertKind::FetchFailure]);
        assert_eq!(ctl.view_model().show_error.as_deref(), Some("Error retrieving data"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_loading_is_busy() {
        let provider = Arc::new(CountingProvider::default());
        let (mut ctl, _) = controller(provider.clone());
        ctl.set_city_input("Rome");

        let ticket = ctl.begin_submit().expect("first submit starts");
        assert!(!ctl.view_model().submit_enabled);
        assert_eq!(ctl.begin_submit().unwrap_err(), SubmitOutcome::Busy);
        assert_eq!(ctl.submit().await, SubmitOutcome::Busy);

        let result = ctl.run_fetch(&ticket).await;
        assert_eq!(ctl.complete(ticket.request.seq, result), SubmitOutcome::Resolved);
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_result_is_ignored() {
        let provider = Arc::new(MockWeatherProvider::default().with_seed(11));
        let (mut ctl, _) = controller(provider);
        ctl.set_city_input("Rome");

        let first = ctl.begin_submit().expect("first submit starts");
        ctl.cancel_in_flight();
        assert!(first.cancel.is_cancelled());
        assert!(!ctl.state().is_loading());

        ctl.set_city_input("Paris");
        let second = ctl.begin_submit().expect("second submit starts");

        let late = ctl
            .provider()
            .fetch_reading(&WeatherRequest::new("Rome"), &CancelToken::never())
            .await;
        assert_eq!(ctl.complete(first.request.seq, late), SubmitOutcome::Stale);
        assert!(ctl.state().is_loading());

        let result = ctl.run_fetch(&second).await;
        assert_eq!(ctl.complete(second.request.seq, result), SubmitOutcome::Resolved);
        assert_eq!(ctl.view_model().show_result.expect("shown").city, "Paris");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_controller_cancels_in_flight_fetch() {
        let (mut ctl, _) = controller(Arc::new(MockWeatherProvider::default()));
        ctl.set_city_input("Rome");

        let ticket = ctl.begin_submit().expect("submit starts");
        let provider = ctl.provider();
        drop(ctl);

        let result = provider
            .fetch_reading(&WeatherRequest::new(ticket.request.city.clone()), &ticket.cancel)
            .await;
        assert_eq!(result.unwrap_err(), FetchError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_failure_replaces_error() {
        let (mut ctl, _) = controller(Arc::new(FailingProvider));
        ctl.set_city_input("Rome");
        assert_eq!(ctl.submit().await, SubmitOutcome::Failed);

        let ticket = ctl.begin_submit().expect("retry starts");
        assert!(ctl.state().last_error().is_none());

        let reading = MockWeatherProvider::default()
            .with_seed(5)
            .fetch_reading(&WeatherRequest::new("Rome"), &CancelToken::never())
            .await;
        assert_eq!(ctl.complete(ticket.request.seq, reading), SubmitOutcome::Resolved);
        assert_eq!(ctl.state().phase(), Phase::Success);
    }
}
