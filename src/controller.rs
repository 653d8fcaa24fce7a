//! Application controller
//!
//! Owns the query lifecycle (`Idle -> Loading -> Success | Failure`) and the
//! single view state the presentation layer reads. Every submitted query
//! runs as its own task tagged with a generation number; only the newest
//! generation may settle the state, and starting a query aborts the one
//! before it.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, debug, error, info, info_span};

use crate::models::{ForecastResult, LocationQuery};
use crate::service::WeatherQueryService;

/// Where the current query stands
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryPhase {
    #[default]
    Idle,
    Loading,
    Success(Arc<ForecastResult>),
    /// Holds the user-facing message only; details go to the log
    Failure { message: String },
}

/// Snapshot of everything the presentation layer displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Incremented on every accepted submission
    pub generation: u64,
    /// Location of the latest submission
    pub location: Option<String>,
    pub phase: QueryPhase,
}

impl ViewState {
    #[must_use]
    pub fn result(&self) -> Option<&ForecastResult> {
        match &self.phase {
            QueryPhase::Success(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            QueryPhase::Failure { message } => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, QueryPhase::Loading)
    }
}

/// Handle on an accepted submission
#[derive(Debug)]
pub struct QueryTicket {
    pub generation: u64,
    pub task: JoinHandle<()>,
}

pub struct ApplicationController {
    service: Arc<WeatherQueryService>,
    state: watch::Sender<ViewState>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl ApplicationController {
    pub fn new(service: WeatherQueryService) -> Arc<Self> {
        let (state, _) = watch::channel(ViewState::default());
        Arc::new(Self {
            service: Arc::new(service),
            state,
            in_flight: Mutex::new(None),
        })
    }

    /// Kick off the implicit startup query
    pub fn start(self: &Arc<Self>, initial_location: &str) -> Option<QueryTicket> {
        info!("Loading initial forecast for '{}'", initial_location);
        self.submit_query(initial_location)
    }

    /// Submit a search
    ///
    /// Blank input is ignored and returns `None`. Otherwise the state moves
    /// to `Loading`, any in-flight query is aborted, and a ticket for the
    /// spawned query task is returned.
    pub fn submit_query(self: &Arc<Self>, location: &str) -> Option<QueryTicket> {
        let Ok(query) = LocationQuery::parse(location) else {
            debug!("Ignoring blank search");
            return None;
        };

        // Held across the bump and the swap so two submissions cannot abort
        // each other out of order.
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.location = Some(query.to_string());
            state.phase = QueryPhase::Loading;
        });

        let controller = Arc::clone(self);
        let span = info_span!("query", generation, location = %query);
        let task = tokio::spawn(
            async move {
                let outcome = controller.service.fetch_forecast(&query).await;
                controller.settle(generation, outcome);
            }
            .instrument(span),
        );

        if let Some(previous) = in_flight.replace(task.abort_handle()) {
            previous.abort();
        }

        Some(QueryTicket { generation, task })
    }

    /// Apply a finished query if it is still the newest one
    fn settle(&self, generation: u64, outcome: crate::Result<ForecastResult>) {
        if let Err(e) = &outcome {
            error!(generation, "Forecast query failed: {e}");
        }

        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.phase = match outcome {
                Ok(result) => QueryPhase::Success(Arc::new(result)),
                Err(e) => QueryPhase::Failure {
                    message: e.user_message(),
                },
            };
            true
        });

        if applied {
            debug!(generation, "Query settled");
        } else {
            debug!(generation, "Discarding result of superseded query");
        }
    }

    /// Current view state
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }
}
