//! CRUD collections relayed for the dashboard.
//!
//! Records are passed through as JSON; field validation and consistency are
//! enforced by the backend.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use tracing::instrument;
use utoipa::ToSchema;

use super::{BackendClient, BackendError, Call};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Vehicles,
    ServiceRecords,
    EchoTests,
    InsuranceClaims,
    ModificationRequests,
    ServiceStations,
}

impl Resource {
    pub const ALL: [Self; 6] = [
        Self::Vehicles,
        Self::ServiceRecords,
        Self::EchoTests,
        Self::InsuranceClaims,
        Self::ModificationRequests,
        Self::ServiceStations,
    ];

    /// URL slug shared by the gateway and backend routes.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::ServiceRecords => "service-records",
            Self::EchoTests => "echo-tests",
            Self::InsuranceClaims => "insurance-claims",
            Self::ModificationRequests => "modification-requests",
            Self::ServiceStations => "service-stations",
        }
    }

    /// Human label used in fallback error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::ServiceRecords => "service records",
            Self::EchoTests => "echo tests",
            Self::InsuranceClaims => "insurance claims",
            Self::ModificationRequests => "modification requests",
            Self::ServiceStations => "service stations",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.slug() == value)
            .ok_or_else(|| UnknownResource(value.to_string()))
    }
}

impl BackendClient {
    /// `GET /api/<resource>`
    ///
    /// # Errors
    /// `Unauthorized` when the token is rejected, `Api` for other refusals.
    #[instrument(skip(self, access_token))]
    pub async fn list(
        &self,
        resource: Resource,
        access_token: &SecretString,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["api", resource.slug()])?;
        let fallback = format!("Failed to fetch {}", resource.label());
        self.relay(self.http().get(url), access_token, &fallback).await
    }

    /// `GET /api/<resource>/:id`
    ///
    /// # Errors
    /// `Unauthorized` when the token is rejected, `Api` for other refusals.
    #[instrument(skip(self, access_token))]
    pub async fn get(
        &self,
        resource: Resource,
        id: &str,
        access_token: &SecretString,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["api", resource.slug(), id])?;
        let fallback = format!("Failed to fetch {}", resource.label());
        self.relay(self.http().get(url), access_token, &fallback).await
    }

    /// `POST /api/<resource>`
    ///
    /// # Errors
    /// `Unauthorized` when the token is rejected, `Api` for other refusals.
    #[instrument(skip(self, record, access_token))]
    pub async fn create(
        &self,
        resource: Resource,
        record: &Value,
        access_token: &SecretString,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["api", resource.slug()])?;
        let fallback = format!("Failed to create {}", resource.label());
        self.relay(self.http().post(url).json(record), access_token, &fallback)
            .await
    }

    /// `PUT /api/<resource>/:id`
    ///
    /// # Errors
    /// `Unauthorized` when the token is rejected, `Api` for other refusals.
    #[instrument(skip(self, record, access_token))]
    pub async fn update(
        &self,
        resource: Resource,
        id: &str,
        record: &Value,
        access_token: &SecretString,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["api", resource.slug(), id])?;
        let fallback = format!("Failed to update {}", resource.label());
        self.relay(self.http().put(url).json(record), access_token, &fallback)
            .await
    }

    /// `DELETE /api/<resource>/:id`
    ///
    /// # Errors
    /// `Unauthorized` when the token is rejected, `Api` for other refusals.
    #[instrument(skip(self, access_token))]
    pub async fn delete(
        &self,
        resource: Resource,
        id: &str,
        access_token: &SecretString,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["api", resource.slug(), id])?;
        let fallback = format!("Failed to delete {}", resource.label());
        self.relay(self.http().delete(url), access_token, &fallback)
            .await
    }

    async fn relay(
        &self,
        request: reqwest::RequestBuilder,
        access_token: &SecretString,
        fallback: &str,
    ) -> Result<Value, BackendError> {
        let envelope = self
            .execute::<Value>(
                request.bearer_auth(access_token.expose_secret()),
                Call::authenticated(fallback),
            )
            .await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(resource.slug().parse::<Resource>().ok(), Some(resource));
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!("users".parse::<Resource>().is_err());
        assert!("Vehicles".parse::<Resource>().is_err());
    }

    #[test]
    fn serde_uses_slugs() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::to_value(Resource::ModificationRequests)?,
            serde_json::json!("modification-requests")
        );
        Ok(())
    }
}
