//! AutoScalr application definition API client
//!
//! Every operation is a single POST to the same endpoint with a fixed
//! timeout. Responses are classified the same way for all operations:
//! transport failure, non-200 status, error envelope inside a 200, or a
//! success payload.

use crate::api::{
    ApiReply, ApplicationDefinition, CapacityUpdate, GroupKey, NodeRemoval, RequestEnvelope,
    RequestType,
};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use capbridge_config::BridgeConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Timeout applied to every request, connect through body
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// The remote operations the capacity bridge depends on
#[async_trait]
pub trait CapacityApi: Send + Sync {
    /// Create the application definition
    async fn create(&self, definition: &ApplicationDefinition) -> Result<()>;

    /// Read the application definition; `None` when the service returned none
    async fn get(&self) -> Result<Option<ApplicationDefinition>>;

    /// Set the target capacity, in vCPUs
    async fn update(&self, target_vcpus: u32) -> Result<()>;

    /// Remove specific instances from the group
    async fn delete_nodes(&self, delta_vcpu: u32, instance_ids: Vec<String>) -> Result<()>;

    /// Delete the application definition
    async fn delete(&self) -> Result<()>;
}

/// HTTP client bound to one group/region
pub struct CapacityClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    group_id: String,
    region: String,
}

impl CapacityClient {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            group_id: config.group_id.clone(),
            region: config.region.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn key(&self) -> GroupKey {
        GroupKey {
            group_id: self.group_id.clone(),
            region: self.region.clone(),
        }
    }

    async fn call<P, T>(&self, request_type: RequestType, payload: &P) -> Result<Option<T>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let envelope = RequestEnvelope {
            api_key: &self.api_key,
            request_type,
            autoscalr_app_def: payload,
        };

        tracing::debug!(
            "AutoScalr {} request: group={} region={}",
            request_type,
            self.group_id,
            self.region
        );

        let result = post_and_classify(&self.client, &self.endpoint, &envelope).await;
        if let Err(e) = &result {
            tracing::debug!("AutoScalr {} request failed: {}", request_type, e);
        }
        apply_status_gate(result)
    }
}

#[async_trait]
impl CapacityApi for CapacityClient {
    async fn create(&self, definition: &ApplicationDefinition) -> Result<()> {
        self.call::<_, ApplicationDefinition>(RequestType::Create, definition)
            .await
            .map(|_| ())
    }

    async fn get(&self) -> Result<Option<ApplicationDefinition>> {
        let definition = self
            .call::<_, ApplicationDefinition>(RequestType::Get, &self.key())
            .await?;
        Ok(definition.filter(|d| !d.group_id.is_empty()))
    }

    async fn update(&self, target_vcpus: u32) -> Result<()> {
        let payload = CapacityUpdate {
            group_id: self.group_id.clone(),
            region: self.region.clone(),
            target_capacity: target_vcpus,
        };
        self.call::<_, ApplicationDefinition>(RequestType::Update, &payload)
            .await
            .map(|_| ())
    }

    async fn delete_nodes(&self, delta_vcpu: u32, instance_ids: Vec<String>) -> Result<()> {
        let payload = NodeRemoval {
            group_id: self.group_id.clone(),
            region: self.region.clone(),
            delta_vcpu,
            nodes_to_delete: instance_ids,
        };
        self.call::<_, ApplicationDefinition>(RequestType::DeleteAppNodes, &payload)
            .await
            .map(|_| ())
    }

    async fn delete(&self) -> Result<()> {
        self.call::<_, ApplicationDefinition>(RequestType::Delete, &self.key())
            .await
            .map(|_| ())
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(BridgeError::ClientBuild)
}

/// POST `body` as JSON and classify whatever comes back
pub(crate) async fn post_and_classify<B, T>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
) -> Result<Option<T>>
where
    B: Serialize + Sync + ?Sized,
    T: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(BridgeError::transport)?;

    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(BridgeError::transport)?;

    classify(status, &bytes)
}

/// Classify a received response.
///
/// Non-200 is an `HttpStatus` failure. A 200 whose body carries a non-empty
/// error envelope is a `Remote` failure. Otherwise the decoded payload is
/// returned, or `None` if the body is not a recognised shape.
pub fn classify<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<Option<T>> {
    if status != 200 {
        return Err(BridgeError::HttpStatus {
            status,
            message: format!("AutoScalr API returned: {}", status),
        });
    }

    match ApiReply::<T>::decode(body) {
        ApiReply::Success(payload) => Ok(Some(payload)),
        ApiReply::Failure(error) => Err(BridgeError::Remote {
            message: error.message,
            code: error.code,
        }),
        ApiReply::Unrecognized => Ok(None),
    }
}

/// Coarse second gate: any status above 400 reports the generic message.
///
/// Transport failures keep their kind even though they carry status 500.
pub fn apply_status_gate<T>(result: Result<T>) -> Result<T> {
    match result {
        Err(BridgeError::HttpStatus { status, .. }) if status > 400 => {
            Err(BridgeError::HttpStatus {
                status,
                message: format!("AutoScalr API returned status code: {}", status),
            })
        }
        other => other,
    }
}
