//! Search orchestration.
//!
//! A [`Session`] owns the view state, the last successful report and the
//! [`Screen`] built from them. Front-ends either await the `on_*` handlers
//! directly, or split a search into [`Session::dispatch`], [`execute`] and
//! [`Session::complete`] to run the network part elsewhere. Each dispatched
//! fetch carries a generation number; only the latest may touch the screen.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    config::{Config, TogglePolicy},
    error::WeatherError,
    model::{ForecastEntry, ForecastOutcome, WeatherReport},
    provider::WeatherClient,
    view::{Effect, Event, FetchPlan, Screen, Status, ViewState, render},
};

/// Handle for a fetch started by [`Session::dispatch`].
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
    plan: FetchPlan,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }
}

#[derive(Debug)]
pub struct Session<C: ?Sized> {
    client: Arc<C>,
    policy: TogglePolicy,
    forecast_days: u8,
    state: ViewState,
    screen: Screen,
    last_report: Option<WeatherReport>,
    generation: u64,
}

impl<C: WeatherClient + ?Sized> Session<C> {
    pub fn new(client: Arc<C>, config: &Config) -> Self {
        Self {
            client,
            policy: config.toggle_policy,
            forecast_days: config.forecast_days,
            state: ViewState::new(config.unit),
            screen: Screen::default(),
            last_report: None,
            generation: 0,
        }
    }

    /// Start with the forecast region switched on.
    pub fn with_forecast_visible(mut self, visible: bool) -> Self {
        self.state.forecast_visible = visible;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn last_report(&self) -> Option<&WeatherReport> {
        self.last_report.as_ref()
    }

    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days
    }

    pub async fn on_search(&mut self, input: &str) {
        self.handle(Event::Search(input.to_string())).await;
    }

    pub async fn on_unit_toggle(&mut self) {
        self.handle(Event::ToggleUnit).await;
    }

    pub async fn on_forecast_toggle(&mut self) {
        self.handle(Event::ToggleForecast).await;
    }

    /// Applies `event` and, if it needs data, fetches it inline.
    pub async fn handle(&mut self, event: Event) {
        if let Some(ticket) = self.dispatch(event) {
            let outcome = execute(self.client.as_ref(), &ticket.plan, self.forecast_days).await;
            self.complete(ticket, outcome);
        }
    }

    /// Applies `event` to the view state and performs every effect that needs
    /// no I/O. Returns a ticket when the caller has to run a fetch.
    pub fn dispatch(&mut self, event: Event) -> Option<Ticket> {
        let (next, effect) = self.state.reduce(event, self.policy);
        self.state = next;

        match effect {
            Effect::None => None,
            Effect::Reject(err) => {
                debug!(error = %err, "Rejected input");
                self.screen.status = Status::Error(err.to_string());
                None
            }
            Effect::ClearForecast => {
                self.screen.forecast = None;
                None
            }
            Effect::Rerender { city } => {
                if self.last_report.as_ref().is_some_and(|r| r.city == city) {
                    self.redraw();
                    None
                } else {
                    // nothing cached for this city, e.g. the last search failed
                    let include_forecast = self.state.forecast_visible;
                    Some(self.begin(FetchPlan {
                        city,
                        include_forecast,
                    }))
                }
            }
            Effect::Fetch(plan) => Some(self.begin(plan)),
        }
    }

    fn begin(&mut self, plan: FetchPlan) -> Ticket {
        self.generation += 1;
        self.screen.status = Status::Loading(plan.city.clone());
        Ticket {
            generation: self.generation,
            plan,
        }
    }

    /// Applies a fetch outcome. Returns `false` if a newer fetch has been
    /// started since `ticket` was issued; the outcome is then dropped.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<WeatherReport, WeatherError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                city = %ticket.plan.city,
                "Dropping superseded weather result"
            );
            return false;
        }

        match outcome {
            Ok(report) => {
                info!(city = %report.city, "Weather updated");
                self.screen.status = match &report.forecast {
                    ForecastOutcome::Failed(msg) => Status::Error(format!("Forecast error: {msg}")),
                    ForecastOutcome::Hidden | ForecastOutcome::Loaded(_) => Status::Idle,
                };
                self.last_report = Some(report);
                self.redraw();
            }
            Err(err) => {
                warn!(city = %ticket.plan.city, kind = err.kind(), error = %err, "Weather search failed");
                self.screen.status = Status::Error(err.to_string());
                self.screen.clear();
                self.last_report = None;
            }
        }

        true
    }

    fn redraw(&mut self) {
        if let Some(report) = &self.last_report {
            let (panel, forecast) = render(report, self.state.unit);
            self.screen.current = Some(panel);
            self.screen.forecast = forecast.filter(|_| self.state.forecast_visible);
        }
    }
}

/// Runs one fetch plan: current conditions, then the forecast if asked for,
/// then icons. Only a failure of the current-conditions call fails the whole
/// search; a forecast failure is carried in the report.
pub async fn execute<C: WeatherClient + ?Sized>(
    client: &C,
    plan: &FetchPlan,
    forecast_days: u8,
) -> Result<WeatherReport, WeatherError> {
    let current = client.fetch_current(&plan.city).await?;

    let forecast = if plan.include_forecast {
        match client.fetch_forecast(&plan.city, forecast_days).await {
            Ok(days) => {
                let mut entries = Vec::with_capacity(days.len());
                for day in days {
                    let icon = client.fetch_icon(&day.icon).await;
                    entries.push(ForecastEntry { day, icon });
                }
                ForecastOutcome::Loaded(entries)
            }
            Err(err) => {
                warn!(city = %plan.city, error = %err, "Forecast request failed");
                ForecastOutcome::Failed(err.to_string())
            }
        }
    } else {
        ForecastOutcome::Hidden
    };

    let current_icon = client.fetch_icon(&current.icon).await;

    Ok(WeatherReport {
        city: plan.city.clone(),
        current,
        current_icon,
        forecast,
        fetched_at: Utc::now(),
    })
}
