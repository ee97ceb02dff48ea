//! Blocking HTTP client for the nuc API server.
//!
//! Status codes are not transport errors here: the agent hands every
//! response back, and `check_status` turns non-2xx replies into
//! `NucError::Api` with the server's `message` when it sent one.

use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::http::Response;
use ureq::{Agent, Body};

use super::types::{
    Container, ContainerCommand, ContainerListing, LoginRequest, LoginResponse, MessageBody,
    ServiceCommand, UnitListing, VersionInfo,
};
use crate::config::Settings;
use crate::errors::{NucError, Result};

/// A configured connection to one API server.
pub struct ApiClient {
    base_url: String,
    agent: Agent,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: config.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.api_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `true` if `GET /ping` answers 200.  Never fails.
    pub fn ping(&self) -> bool {
        match self.agent.get(&self.url("/ping")).call() {
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "ping");
                resp.status() == 200
            }
            Err(e) => {
                tracing::debug!(error = %e, "ping failed");
                false
            }
        }
    }

    /// Exchange username and password for a token.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        tracing::debug!(url = %self.url("/login"), "logging in");
        let resp = self
            .agent
            .post(&self.url("/login"))
            .send_json(&LoginRequest { username, password })?;
        read_json(resp)
    }

    pub fn version(&self, token: &str) -> Result<VersionInfo> {
        let resp = self
            .agent
            .get(&self.url("/version"))
            .header("Authorization", bearer(token))
            .call()?;
        read_json(resp)
    }

    /// Running services and all sockets owned by the server user.
    pub fn list_units(&self, token: &str) -> Result<UnitListing> {
        let resp = self
            .agent
            .get(&self.url("/io/system/services"))
            .header("Authorization", bearer(token))
            .call()?;
        read_json(resp)
    }

    pub fn service(&self, token: &str, command: ServiceCommand, name: &str) -> Result<()> {
        let path = format!("/system/services/{}", command.as_str());
        tracing::debug!(%path, service = name, "service command");
        let mut resp = self
            .agent
            .post(&self.url(&path))
            .header("Authorization", bearer(token))
            .query("target", name)
            .send_empty()?;
        check_status(&mut resp)
    }

    pub fn running_containers(&self, token: &str) -> Result<Vec<Container>> {
        let resp = self
            .agent
            .get(&self.url("/io/docker/running"))
            .header("Authorization", bearer(token))
            .call()?;
        let listing: ContainerListing = read_json(resp)?;
        Ok(listing.containers)
    }

    pub fn container(&self, token: &str, command: ContainerCommand, name: &str) -> Result<()> {
        let path = format!("/io/docker/{}", command.as_str());
        tracing::debug!(%path, container = name, "container command");
        let mut resp = self
            .agent
            .post(&self.url(&path))
            .header("Authorization", bearer(token))
            .query("target", name)
            .send_empty()?;
        check_status(&mut resp)
    }

    /// Remove an image; returns the server's confirmation message.
    pub fn remove_image(&self, token: &str, image: &str, force: bool) -> Result<String> {
        let resp = self
            .agent
            .delete(&self.url("/docker/image/rm"))
            .header("Authorization", bearer(token))
            .query("targetid", image)
            .query("toforce", if force { "true" } else { "false" })
            .call()?;
        let body: MessageBody = read_json(resp)?;
        Ok(body.message)
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn read_json<T: DeserializeOwned>(mut resp: Response<Body>) -> Result<T> {
    check_status(&mut resp)?;
    Ok(resp.body_mut().read_json::<T>()?)
}

/// Map a non-2xx response to `NucError::Api`.
fn check_status(resp: &mut Response<Body>) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }

    let body = resp.body_mut().read_to_string().unwrap_or_default();
    let message = match serde_json::from_str::<MessageBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    tracing::debug!(status = status.as_u16(), %message, "API error");
    Err(NucError::Api {
        status: status.as_u16(),
        message,
    })
}
