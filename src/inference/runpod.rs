use super::output::{extract_image, extract_video};
use super::types::{
    GraphQlRequest, GraphQlResponse, ImageJobInput, JobStatus, RunRequest, WorkflowJobInput,
};
use super::{workflow, InferenceService};
use crate::models::{Config, DEFAULT_RUNPOD_BASE_URL, DEFAULT_RUNPOD_GRAPHQL_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio_retry::{strategy::FixedInterval, RetryIf};

/// Budget for one generation job, queueing included.
pub const JOB_TIMEOUT: Duration = Duration::from_secs(300);
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const ADMIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for RunPod serverless endpoints and the RunPod GraphQL API.
pub struct RunPodClient {
    client: Client,
    api_key: String,
    endpoint_id: String,
    video_endpoint_id: Option<String>,
    base_url: String,
    graphql_url: String,
    job_timeout: Duration,
    poll_interval: Duration,
}

impl RunPodClient {
    pub fn new(api_key: String, endpoint_id: String) -> Self {
        Self::new_with_client(api_key, endpoint_id, Client::new())
    }

    pub fn new_with_client(api_key: String, endpoint_id: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            endpoint_id,
            video_endpoint_id: None,
            base_url: DEFAULT_RUNPOD_BASE_URL.to_string(),
            graphql_url: DEFAULT_RUNPOD_GRAPHQL_URL.to_string(),
            job_timeout: JOB_TIMEOUT,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.runpod_api_key.clone(),
            config.runpod_endpoint_id.clone(),
        )
        .with_video_endpoint(config.runpod_video_endpoint_id.clone())
        .with_base_url(config.runpod_base_url.clone())
        .with_graphql_url(config.runpod_graphql_url.clone())
    }

    pub fn with_video_endpoint(mut self, endpoint_id: Option<String>) -> Self {
        self.video_endpoint_id = endpoint_id;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_graphql_url(mut self, graphql_url: String) -> Self {
        self.graphql_url = graphql_url;
        self
    }

    pub fn with_polling(mut self, poll_interval: Duration, job_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.job_timeout = job_timeout;
        self
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    fn video_endpoint_id(&self) -> &str {
        self.video_endpoint_id
            .as_deref()
            .unwrap_or(&self.endpoint_id)
    }

    fn endpoint_url(&self, endpoint_id: &str, path: &str) -> String {
        format!("{}/v2/{}/{}", self.base_url, endpoint_id, path)
    }

    async fn send<Resp: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Resp> {
        let response = request
            .timeout(timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to RunPod: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("RunPod API error (status {}): {}", status, error_text);
            return Err(Error::Inference(format!(
                "RunPod API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse RunPod response: {}\nBody: {}", e, body);
            Error::Inference(format!("Failed to parse RunPod response: {}", e))
        })
    }

    async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: &str,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp> {
        self.send(self.client.post(url).json(request), timeout).await
    }

    /// Submit a job and wait for its output, polling while it is queued.
    pub async fn run_sync<T: Serialize + Send + Sync>(
        &self,
        endpoint_id: &str,
        input: T,
    ) -> Result<Value> {
        tracing::debug!("Submitting RunPod job to endpoint {}", endpoint_id);
        let deadline = Instant::now() + self.job_timeout;
        let url = self.endpoint_url(endpoint_id, "runsync");
        let job: JobStatus = self
            .post(&url, &RunRequest { input }, self.job_timeout)
            .await?;

        if !job.is_pending() {
            return settle(job);
        }

        tracing::info!("RunPod job {} is {}, polling for completion", job.id, job.status);
        self.wait_for_job(endpoint_id, &job.id, deadline).await
    }

    /// Poll a queued job until it settles. Polling stops at `deadline`, which
    /// covers the whole job including the initial `runsync` call.
    async fn wait_for_job(
        &self,
        endpoint_id: &str,
        job_id: &str,
        deadline: Instant,
    ) -> Result<Value> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let attempts = (remaining.as_millis() / self.poll_interval.as_millis().max(1)) as usize;
        let strategy = FixedInterval::new(self.poll_interval).take(attempts);
        let url = self.endpoint_url(endpoint_id, &format!("status/{}", job_id));
        let url = url.as_str();

        RetryIf::spawn(
            strategy,
            move || async move {
                let job: JobStatus = self.send(self.client.get(url), ADMIN_TIMEOUT).await?;
                settle(job)
            },
            |e: &Error| matches!(e, Error::JobPending { .. }),
        )
        .await
        .map_err(|e| match e {
            Error::JobPending { id, status } => {
                tracing::error!("RunPod job {} still {} after {:?}", id, status, self.job_timeout);
                Error::Inference(format!(
                    "Job {} did not finish within {} seconds (last status {})",
                    id,
                    self.job_timeout.as_secs(),
                    status
                ))
            }
            other => other,
        })
    }

    /// Queue a no-op job so idle workers start up.
    pub async fn wake(&self) -> Result<JobStatus> {
        let url = self.endpoint_url(&self.endpoint_id, "run");
        let input = WorkflowJobInput {
            workflow: Value::Object(Default::default()),
        };
        self.post(&url, &RunRequest { input }, ADMIN_TIMEOUT).await
    }

    /// Set the endpoint's worker bounds through the GraphQL API.
    pub async fn scale_workers(&self, min: u32, max: u32) -> Result<Value> {
        if min > max {
            return Err(Error::Validation(format!(
                "workers min ({}) exceeds max ({})",
                min, max
            )));
        }

        let query = format!(
            "mutation {{ updateEndpoint(input: {{ endpointId: {}, workersMin: {}, workersMax: {} }}) {{ id workersMin workersMax }} }}",
            Value::String(self.endpoint_id.clone()),
            min,
            max
        );
        let response: GraphQlResponse = self
            .post(&self.graphql_url, &GraphQlRequest { query }, ADMIN_TIMEOUT)
            .await?;

        if let Some(errors) = response.errors {
            return Err(Error::Inference(format!("GraphQL returned errors: {}", errors)));
        }
        match response.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(Error::Inference("GraphQL response had no data".to_string())),
        }
    }
}

/// Map a job status to its output or a terminal error.
fn settle(job: JobStatus) -> Result<Value> {
    if job.is_pending() {
        return Err(Error::JobPending {
            id: job.id,
            status: job.status,
        });
    }
    if job.status != "COMPLETED" {
        return Err(Error::Inference(format!(
            "Job {} {}: {}",
            job.id,
            job.status,
            job.error_text()
        )));
    }
    let id = job.id;
    job.output
        .ok_or_else(|| Error::UnexpectedOutput(format!("Job {} completed without output", id)))
}

#[async_trait]
impl InferenceService for RunPodClient {
    async fn generate_image(&self, enhanced_prompt: &str) -> Result<Value> {
        let input = ImageJobInput::new(enhanced_prompt.to_string());
        let output = self.run_sync(&self.endpoint_id, input).await?;
        extract_image(&output)
    }

    async fn generate_video(&self, enhanced_prompt: &str) -> Result<String> {
        let seed = chrono::Utc::now().timestamp().max(0) as u64;
        let input = WorkflowJobInput {
            workflow: workflow::animatediff(enhanced_prompt, seed),
        };
        let output = self.run_sync(self.video_endpoint_id(), input).await?;
        extract_video(&output)
    }
}
