//! Request and response bodies exchanged with the API server.

use serde::{Deserialize, Serialize};

use crate::vault::TokenBundle;

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body returned by `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Server-chosen expiry (Unix seconds); most servers leave it out.
    #[serde(default)]
    pub expiration: Option<i64>,
}

impl LoginResponse {
    /// Turn the response into a bundle, using `default_expiry` when the
    /// server did not set one.
    pub fn into_bundle(self, default_expiry: i64) -> TokenBundle {
        TokenBundle {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expiration.unwrap_or(default_expiry),
            message: self.message,
        }
    }
}

/// Body returned by `GET /version`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub user: Option<String>,
}

/// One systemd unit as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Unit {
    #[serde(rename = "UNIT")]
    pub unit: String,
    #[serde(rename = "LOAD", default)]
    pub load: String,
    #[serde(rename = "ACTIVE", default)]
    pub active: String,
    #[serde(rename = "SUB", default)]
    pub sub: String,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: String,
}

/// Body returned by `GET /io/system/services`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitListing {
    #[serde(default)]
    pub services: Vec<Unit>,
    #[serde(default)]
    pub sockets: Vec<Unit>,
}

/// One running container as reported by `docker ps` on the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Container {
    #[serde(rename = "CONTAINER_ID")]
    pub id: String,
    #[serde(rename = "IMAGE", default)]
    pub image: String,
    #[serde(rename = "COMMAND", default)]
    pub command: String,
    #[serde(rename = "CREATED", default)]
    pub created: String,
    #[serde(rename = "STATUS", default)]
    pub status: String,
    #[serde(rename = "PORTS", default)]
    pub ports: String,
    #[serde(rename = "NAMES", default)]
    pub names: String,
}

/// Body returned by `GET /io/docker/running`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerListing {
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// Generic `{ "message": ... }` body used by action endpoints and errors.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Lifecycle commands for a systemd service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    Start,
    Stop,
    Restart,
}

impl ServiceCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    /// Past tense for user-facing messages.
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
        }
    }
}

/// Lifecycle commands for a Docker container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCommand {
    Start,
    Stop,
}

impl ContainerCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
        }
    }
}
