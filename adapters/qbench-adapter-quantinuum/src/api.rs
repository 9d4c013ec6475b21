//! Quantinuum REST API client.
//!
//! Covers the endpoints a benchmark run needs: login, job submission, job
//! status with results, cancellation and machine status.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::error::{QuantinuumError, QuantinuumResult};

/// Quantinuum cloud API base URL.
pub const BASE_URL: &str = "https://qapi.quantinuum.com/v1";

/// Quantinuum REST API client.
///
/// Logs in lazily with email and password and keeps the JWT id-token. A 401
/// on any call clears the token, logs in again and retries that call once.
pub struct QuantinuumClient {
    client: Client,
    base_url: String,
    email: String,
    password: String,
    token: Mutex<Option<String>>,
}

impl std::fmt::Debug for QuantinuumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantinuumClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl QuantinuumClient {
    /// Create a client for the production endpoint.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> QuantinuumResult<Self> {
        Self::with_base_url(BASE_URL, email, password)
    }

    /// Create a client for a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> QuantinuumResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            password: password.into(),
            token: Mutex::new(None),
        })
    }

    /// API base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange email and password for an id-token.
    #[instrument(skip(self))]
    pub async fn login(&self) -> QuantinuumResult<String> {
        debug!("Logging in to Quantinuum API");
        let body = serde_json::json!({
            "email": self.email,
            "password": self.password,
        });

        let resp = self
            .client
            .post(self.url("login"))
            .json(&body)
            .send()
            .await?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            let msg = resp.text().await.unwrap_or_default();
            return Err(QuantinuumError::AuthFailed(msg));
        }
        let data: LoginResponse = decode(resp).await?;

        *self.token.lock().await = Some(data.id_token.clone());
        debug!("Quantinuum login successful");
        Ok(data.id_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn token(&self) -> QuantinuumResult<String> {
        if let Some(token) = self.token.lock().await.clone() {
            return Ok(token);
        }
        self.login().await
    }

    /// Send an authorized request, logging in again and retrying once on 401.
    ///
    /// Quantinuum expects the bare id-token in `Authorization`, without a
    /// `Bearer` prefix.
    async fn send<F>(&self, build: F) -> QuantinuumResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.token().await?;
        let resp = build(&self.client)
            .header("Authorization", &token)
            .send()
            .await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!("Quantinuum token rejected, logging in again");
        *self.token.lock().await = None;
        let token = self.login().await?;
        let resp = build(&self.client)
            .header("Authorization", &token)
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            let msg = resp.text().await.unwrap_or_default();
            return Err(QuantinuumError::AuthFailed(msg));
        }
        Ok(resp)
    }

    /// Submit a circuit for execution.
    #[instrument(skip(self, req), fields(machine = %req.machine))]
    pub async fn submit_job(&self, req: &JobRequest) -> QuantinuumResult<JobResponse> {
        let url = self.url("job");
        let resp = self.send(|c| c.post(&url).json(req)).await?;
        decode(resp).await
    }

    /// Current status of a job, with results once it has completed.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> QuantinuumResult<JobStatusResponse> {
        let url = self.url(&format!("job/{job_id}"));
        let resp = self.send(|c| c.get(&url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(QuantinuumError::JobNotFound(job_id.to_string()));
        }
        decode(resp).await
    }

    /// Cancel a queued or running job.
    #[instrument(skip(self))]
    pub async fn cancel_job(&self, job_id: &str) -> QuantinuumResult<()> {
        let url = self.url(&format!("job/{job_id}/cancel"));
        let resp = self.send(|c| c.post(&url)).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(QuantinuumError::JobNotFound(job_id.to_string())),
            s if s.is_success() => Ok(()),
            s => Err(QuantinuumError::ApiError {
                status: s.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Status of one machine.
    #[instrument(skip(self))]
    pub async fn get_machine(&self, machine: &str) -> QuantinuumResult<MachineInfo> {
        let url = self.url(&format!("machine/{machine}"));
        let resp = self.send(|c| c.get(&url)).await?;
        decode(resp).await
    }
}

/// Deserialize a success body, or turn the response into an `ApiError`.
async fn decode<T: DeserializeOwned>(resp: Response) -> QuantinuumResult<T> {
    let status = resp.status();
    if !status.is_success() {
        return Err(QuantinuumError::ApiError {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Response from `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "id-token")]
    pub id_token: String,
}

/// Request body for `POST /job`.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    /// Job name shown in the Quantinuum user portal.
    pub name: String,
    /// Number of shots.
    pub count: u32,
    /// Target machine, e.g. `"H2-1LE"`.
    pub machine: String,
    /// Always `"OPENQASM 2.0"`.
    pub language: String,
    /// Program text.
    pub program: String,
    /// Server-side optimisation switch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<JobOptions>,
}

impl JobRequest {
    /// Create a QASM 2.0 job request.
    pub fn new(machine: impl Into<String>, program: impl Into<String>, count: u32) -> Self {
        Self {
            name: format!("qbench-{}", uuid::Uuid::new_v4()),
            count,
            machine: machine.into(),
            language: "OPENQASM 2.0".into(),
            program: program.into(),
            options: None,
        }
    }

    /// Set job options.
    #[must_use]
    pub fn with_options(mut self, options: JobOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Optional job execution options.
#[derive(Debug, Default, Serialize)]
pub struct JobOptions {
    /// Disable server-side optimisation so the submitted circuit runs as compiled.
    #[serde(rename = "no-opt", skip_serializing_if = "Option::is_none")]
    pub no_opt: Option<bool>,
}

/// Response from `POST /job`.
#[derive(Debug, Deserialize)]
pub struct JobResponse {
    pub job: String,
}

/// Response from `GET /job/{id}`.
#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub job: Option<String>,
    /// `queued`, `submitted`, `running`, `completed`, `failed`, `canceled`
    /// or `cancelling`.
    pub status: String,
    /// Per-register shot results once completed: register name to one
    /// bitstring per shot, highest bit first.
    #[serde(default)]
    pub results: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "queue-position", default)]
    pub queue_position: Option<u32>,
}

impl JobStatusResponse {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("failed")
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("canceled") || self.status.eq_ignore_ascii_case("cancelled")
    }

    pub fn is_running(&self) -> bool {
        self.status.eq_ignore_ascii_case("running")
    }
}

/// Machine status returned by `GET /machine/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineInfo {
    pub name: String,
    #[serde(rename = "n_qubits", default)]
    pub num_qubits: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "queue-length", default)]
    pub queue_length: Option<u32>,
}

impl MachineInfo {
    /// Whether the machine accepts jobs.
    pub fn is_online(&self) -> bool {
        self.status.as_deref().is_some_and(|s| {
            matches!(
                s.to_ascii_lowercase().as_str(),
                "online" | "available" | "ready"
            )
        })
    }
}
