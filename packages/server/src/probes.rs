//! Outbound credential probes.
//!
//! Each probe sends one minimal authenticated request to the provider and
//! inspects the HTTP status. No retries, no circuit breaking; a single
//! configured timeout bounds the round trip.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use thiserror::Error;

use crate::config::ProbesConfig;

pub const SLUG_OPENAI: &str = "openai";
pub const SLUG_ANTHROPIC: &str = "anthropic";
pub const SLUG_DEEPGRAM: &str = "deepgram";
pub const SLUG_GEMINI: &str = "gemini";

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Credential testing is not implemented for integration '{0}'")]
    Unsupported(String),
    #[error("Credential is missing secret field '{0}'")]
    MissingField(&'static str),
    #[error("{provider} rejected the credential with HTTP {status}")]
    Rejected { provider: &'static str, status: u16 },
    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ProbeError {
    /// HTTP status returned by the provider, when one was received.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            ProbeError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result of one probe invocation. Latency is measured whether the probe
/// passed or failed.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub latency_ms: i64,
    pub result: Result<(), ProbeError>,
}

/// Probe the provider identified by `slug` using the decrypted secret map.
pub async fn run(
    client: &Client,
    config: &ProbesConfig,
    slug: &str,
    secrets: &HashMap<String, String>,
) -> ProbeOutcome {
    let started = Instant::now();
    let timeout = Duration::from_secs(config.timeout_secs);

    let result = match slug {
        SLUG_OPENAI => probe_openai(client, config, timeout, secrets).await,
        SLUG_ANTHROPIC => probe_anthropic(client, config, timeout, secrets).await,
        SLUG_DEEPGRAM => probe_deepgram(client, config, timeout, secrets).await,
        SLUG_GEMINI => probe_gemini(client, config, timeout, secrets).await,
        other => Err(ProbeError::Unsupported(other.to_string())),
    };

    ProbeOutcome {
        latency_ms: started.elapsed().as_millis() as i64,
        result,
    }
}

async fn probe_openai(
    client: &Client,
    config: &ProbesConfig,
    timeout: Duration,
    secrets: &HashMap<String, String>,
) -> Result<(), ProbeError> {
    let api_key = secret_field(secrets, "api_key")?;
    let request = client
        .get(format!("{}/v1/models", config.openai_base_url))
        .bearer_auth(api_key)
        .timeout(timeout);
    send_and_check("OpenAI", request).await
}

async fn probe_anthropic(
    client: &Client,
    config: &ProbesConfig,
    timeout: Duration,
    secrets: &HashMap<String, String>,
) -> Result<(), ProbeError> {
    let api_key = secret_field(secrets, "api_key")?;
    let request = client
        .get(format!("{}/v1/models", config.anthropic_base_url))
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .timeout(timeout);
    send_and_check("Anthropic", request).await
}

async fn probe_deepgram(
    client: &Client,
    config: &ProbesConfig,
    timeout: Duration,
    secrets: &HashMap<String, String>,
) -> Result<(), ProbeError> {
    let api_key = secret_field(secrets, "api_key")?;
    let request = client
        .get(format!("{}/v1/projects", config.deepgram_base_url))
        .header("Authorization", format!("Token {api_key}"))
        .timeout(timeout);
    send_and_check("Deepgram", request).await
}

async fn probe_gemini(
    client: &Client,
    config: &ProbesConfig,
    timeout: Duration,
    secrets: &HashMap<String, String>,
) -> Result<(), ProbeError> {
    let api_key = secret_field(secrets, "api_key")?;
    let request = client
        .get(format!("{}/v1beta/models", config.gemini_base_url))
        .header("x-goog-api-key", api_key)
        .timeout(timeout);
    send_and_check("Gemini", request).await
}

fn secret_field<'a>(
    secrets: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, ProbeError> {
    secrets
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(ProbeError::MissingField(name))
}

async fn send_and_check(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<(), ProbeError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProbeError::Transport { provider, source })?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ProbeError::Rejected {
            provider,
            status: status.as_u16(),
        })
    }
}
