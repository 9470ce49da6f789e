use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ExperimentId, VariationId},
    error::{ApiRejection, ErrorBody},
    protocol::{AssignedVariation, ConversionReceipt, Experiment, NewExperiment},
};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{error, info};

/// Base URL the dashboard backend listens on in local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

const FETCH_FAILED_MESSAGE: &str = "Failed to fetch experiments.";
const CREATE_FAILED_MESSAGE: &str = "Failed to create experiment.";
const STORE_EVENT_CAPACITY: usize = 64;

/// Backend surface the store depends on. `ApiClient` is the production
/// implementation; tests substitute scripted ones.
#[async_trait]
pub trait ExperimentApi: Send + Sync {
    async fn get_experiments(&self) -> Result<Vec<Experiment>>;
    async fn create_experiment(&self, data: NewExperiment) -> Result<Experiment>;
    async fn record_conversion(&self, variation_id: VariationId) -> Result<ConversionReceipt>;
    async fn assign_to_variation(&self, experiment_id: ExperimentId) -> Result<AssignedVariation>;
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Decodes a 2xx body, or surfaces the backend's error envelope when the
/// response carries one. No retries and no interpretation beyond that.
async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        return Err(ApiRejection::new(status.as_u16(), message).into());
    }
    Ok(response.json().await?)
}

#[async_trait]
impl ExperimentApi for ApiClient {
    async fn get_experiments(&self) -> Result<Vec<Experiment>> {
        let response = self
            .http
            .get(format!("{}/experiments", self.base_url))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn create_experiment(&self, data: NewExperiment) -> Result<Experiment> {
        let response = self
            .http
            .post(format!("{}/experiments", self.base_url))
            .json(&data)
            .send()
            .await?;
        expect_json(response).await
    }

    async fn record_conversion(&self, variation_id: VariationId) -> Result<ConversionReceipt> {
        let response = self
            .http
            .post(format!(
                "{}/variations/{}/convert",
                self.base_url, variation_id.0
            ))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn assign_to_variation(&self, experiment_id: ExperimentId) -> Result<AssignedVariation> {
        let response = self
            .http
            .post(format!(
                "{}/experiments/{}/assign",
                self.base_url, experiment_id.0
            ))
            .send()
            .await?;
        expect_json(response).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub experiments: Vec<Experiment>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    ExperimentsReplaced { count: usize },
    ExperimentAdded { experiment: Experiment },
    ActionFailed { message: String },
}

/// Client-side cache of the experiment list plus loading/error flags.
///
/// Actions are serialized through `action_guard`, so a call issued while
/// another is in flight waits and applies in call order. State reads go
/// through `snapshot`, which stays available mid-action.
pub struct ExperimentStore {
    api: Arc<dyn ExperimentApi>,
    action_guard: Mutex<()>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl ExperimentStore {
    pub fn new(api: Arc<dyn ExperimentApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Arc::new(Self {
            api,
            action_guard: Mutex::new(()),
            state: RwLock::new(StoreState::default()),
            events,
        })
    }

    pub fn with_default_api() -> Arc<Self> {
        Self::new(Arc::new(ApiClient::default()))
    }

    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn enter_pending(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn settle(&self, message: Option<&'static str>) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.error = message.map(str::to_string);
    }

    /// Refreshes the cached list from the backend. The whole list is
    /// replaced, never merged. Failures land in `state.error` and are
    /// otherwise swallowed.
    pub async fn fetch_experiments(&self) {
        let _serialized = self.action_guard.lock().await;
        self.enter_pending().await;

        match self.api.get_experiments().await {
            Ok(experiments) => {
                let count = experiments.len();
                {
                    let mut state = self.state.write().await;
                    state.experiments = experiments;
                    state.is_loading = false;
                }
                info!(count, "experiments: list refreshed");
                let _ = self.events.send(StoreEvent::ExperimentsReplaced { count });
            }
            Err(err) => {
                error!(cause = %err, "experiments: fetch failed");
                self.settle(Some(FETCH_FAILED_MESSAGE)).await;
                let _ = self.events.send(StoreEvent::ActionFailed {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                });
            }
        }
    }

    /// Creates an experiment and appends the created record locally without
    /// re-fetching. Failures set `state.error` and are also returned, so a
    /// caller can react directly.
    pub async fn add_experiment(&self, data: NewExperiment) -> Result<Experiment> {
        let _serialized = self.action_guard.lock().await;
        self.enter_pending().await;

        match self.api.create_experiment(data).await {
            Ok(created) => {
                {
                    let mut state = self.state.write().await;
                    state.experiments.push(created.clone());
                    state.is_loading = false;
                }
                info!(experiment_id = created.id.0, name = %created.name, "experiments: created");
                let _ = self.events.send(StoreEvent::ExperimentAdded {
                    experiment: created.clone(),
                });
                Ok(created)
            }
            Err(err) => {
                error!(cause = %err, "experiments: create failed");
                self.settle(Some(CREATE_FAILED_MESSAGE)).await;
                let _ = self.events.send(StoreEvent::ActionFailed {
                    message: CREATE_FAILED_MESSAGE.to_string(),
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests;
