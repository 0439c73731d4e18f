use std::time::Duration;

use reqwest::header::{ACCEPT, LOCATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::error::PceError;
use super::source::WorkloadSource;
use super::types::{Inventory, JobStatus, Page};
use crate::config::PceConfig;

const API_PREFIX: &str = "/api/v2";

/// Bounds for polling a deferred (HTTP 202) job.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    /// Fixed wait before the first status check.
    pub initial_delay: Duration,
    /// Wait between checks when the PCE sends no `Retry-After`.
    pub default_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            default_wait: Duration::from_secs(1),
        }
    }
}

/// Outcome of one status check.
enum JobCheck {
    Done(Value),
    Pending(String),
}

pub struct PceClient {
    client: Client,
    base_url: String,
    org: String,
    api_user: String,
    api_key: String,
    poll: PollConfig,
}

impl PceClient {
    pub fn from_config(config: &PceConfig) -> Result<Self, PceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            org: config.org.clone(),
            api_user: config.api_user.clone(),
            api_key: config.api_key.clone(),
            poll: PollConfig {
                max_attempts: config.max_poll_attempts,
                initial_delay: Duration::from_millis(config.initial_poll_delay_ms),
                ..PollConfig::default()
            },
        })
    }

    /// Client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(
        base_url: &str,
        org: &str,
        api_user: &str,
        api_key: &str,
    ) -> Result<Self, PceError> {
        let config = PceConfig {
            server: base_url.to_string(),
            org: org.to_string(),
            api_user: api_user.to_string(),
            api_key: api_key.to_string(),
            ..PceConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an href the PCE hands out.
    ///
    /// Absolute URLs pass through; hrefs already under `/api/v2` get the
    /// server prepended; anything else is placed under `/api/v2`.
    pub fn api_url(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else if href.starts_with(API_PREFIX) {
            format!("{}{href}", self.base_url)
        } else if href.starts_with('/') {
            format!("{}{API_PREFIX}{href}", self.base_url)
        } else {
            format!("{}{API_PREFIX}/{href}", self.base_url)
        }
    }

    /// Fetch one resource, logging any failure and yielding `None` instead.
    pub async fn get_data(&self, url: &str) -> Option<Value> {
        match self.fetch_json(url).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%url, error = %e, "request yielded no data");
                None
            }
        }
    }

    /// Fetch one resource, following a deferred job to its result.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, PceError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_user, Some(&self.api_key))
            .header(ACCEPT, "application/json")
            .header("Prefer", "respond-async")
            .send()
            .await?;

        if response.status() == StatusCode::ACCEPTED {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or(PceError::MissingLocation)?;
            let wait = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(self.poll.default_wait);

            info!("waiting for the PCE to process the request");
            return self.wait_for_job(&self.api_url(&location), wait).await;
        }

        decode(response).await
    }

    /// Poll a job's status resource until it is done or the attempt bound
    /// is reached. The first check always waits the fixed initial delay;
    /// later ones wait the interval the PCE suggested.
    async fn wait_for_job(&self, location: &str, wait: Duration) -> Result<Value, PceError> {
        debug!(%location, "checking job status");
        sleep(self.poll.initial_delay).await;

        let max = self.poll.max_attempts;
        let mut attempt = 0;
        while attempt < max {
            attempt += 1;
            match self.check_job(location).await {
                Ok(JobCheck::Done(value)) => return Ok(value),
                Ok(JobCheck::Pending(status)) => {
                    info!(
                        %status,
                        "job not done, retrying in {}s (attempt {attempt}/{max})",
                        wait.as_secs()
                    );
                }
                Err(e @ PceError::MissingResult(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "error checking job status (attempt {attempt}/{max})");
                }
            }
            if attempt < max {
                sleep(wait).await;
            }
        }

        Err(PceError::JobNotDone {
            location: location.to_string(),
            attempts: attempt,
        })
    }

    async fn check_job(&self, location: &str) -> Result<JobCheck, PceError> {
        let response = self.get(location).await?;
        let job: JobStatus = serde_json::from_value(decode(response).await?)?;

        if !job.is_done() {
            let status = job.status.unwrap_or_else(|| "unknown".to_string());
            return Ok(JobCheck::Pending(status));
        }

        let href = job
            .result_href()
            .ok_or_else(|| PceError::MissingResult(location.to_string()))?;
        let response = self.get(&self.api_url(href)).await?;
        Ok(JobCheck::Done(decode(response).await?))
    }

    // Job resources are requested without `Prefer: respond-async`.
    async fn get(&self, url: &str) -> Result<Response, PceError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_user, Some(&self.api_key))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Ok(response)
    }
}

/// Turn a response into JSON, mapping non-success statuses to
/// [`PceError::ApiError`].
async fn decode(response: Response) -> Result<Value, PceError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(PceError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

impl WorkloadSource for PceClient {
    fn origin(&self) -> String {
        self.base_url().to_string()
    }

    /// Walk the workload listing page by page. A page that yields no data
    /// ends the walk; whatever was collected up to then is returned.
    async fn fetch_all_workloads(&self) -> Inventory {
        let mut inventory = Inventory {
            complete: true,
            ..Inventory::default()
        };
        let mut next = Some(format!("/orgs/{}/workloads", self.org));

        while let Some(href) = next.take() {
            let url = self.api_url(&href);
            let Some(body) = self.get_data(&url).await else {
                inventory.complete = false;
                break;
            };

            let (records, cursor) = match Page::from_value(body) {
                Ok(page) => page.into_parts(),
                Err(e) => {
                    warn!(%url, error = %e, "stopping pagination on malformed page");
                    inventory.complete = false;
                    break;
                }
            };
            inventory.pages += 1;
            inventory.workloads.extend(records);
            next = cursor;

            info!(
                count = inventory.workloads.len(),
                "retrieved {} workloads so far",
                inventory.workloads.len()
            );
        }

        inventory
    }
}
