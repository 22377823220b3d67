//! AutoScalr API wire types
//!
//! Every request is a POST of a [`RequestEnvelope`] whose `request_type`
//! selects the operation and whose `autoscalr_app_def` carries a payload
//! narrowed to that operation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Application kind sent on create
pub const APP_TYPE_K8S: &str = "k8s";

/// Scale mode sent on create
pub const SCALE_MODE_FIXED: &str = "fixed";

/// Instance spin-up estimate sent on create, in seconds
pub const INSTANCE_SPIN_UP_SECONDS: u32 = 15;

/// The remote record describing one node group's scaling configuration
///
/// A missing or `null` field decodes to that field's zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDefinition {
    #[serde(rename = "aws_autoscaling_group_name", deserialize_with = "null_as_default")]
    pub group_id: String,
    #[serde(rename = "aws_region", deserialize_with = "null_as_default")]
    pub region: String,
    /// The service has always received this key as `AppType`
    #[serde(rename = "AppType", alias = "app_type", deserialize_with = "null_as_default")]
    pub app_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub instance_types: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub scale_mode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub max_spot_percent_total: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub max_spot_percent_one_market: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub target_spare_cpu_percent: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub cluster_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_spare_memory_percent: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_queue_size: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub instance_spin_up_seconds: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub max_minutes_to_target_queue_size: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub detailed_monitoring_enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub autoscalr_enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub os_family: String,
    #[serde(deserialize_with = "null_as_default")]
    pub max_hours_instance_age: u32,
    /// Target capacity in vCPUs
    #[serde(deserialize_with = "null_as_default")]
    pub target_capacity: u32,
}

/// Get / Delete payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupKey {
    #[serde(rename = "aws_autoscaling_group_name")]
    pub group_id: String,
    #[serde(rename = "aws_region")]
    pub region: String,
}

/// Update payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityUpdate {
    #[serde(rename = "aws_autoscaling_group_name")]
    pub group_id: String,
    #[serde(rename = "aws_region")]
    pub region: String,
    pub target_capacity: u32,
}

/// DeleteAppNodes payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRemoval {
    #[serde(rename = "aws_autoscaling_group_name")]
    pub group_id: String,
    #[serde(rename = "aws_region")]
    pub region: String,
    pub delta_vcpu: u32,
    pub nodes_to_delete: Vec<String>,
}

/// Request discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestType {
    Create,
    Get,
    Update,
    DeleteAppNodes,
    Delete,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Create => write!(f, "Create"),
            RequestType::Get => write!(f, "Get"),
            RequestType::Update => write!(f, "Update"),
            RequestType::DeleteAppNodes => write!(f, "DeleteAppNodes"),
            RequestType::Delete => write!(f, "Delete"),
        }
    }
}

/// Request body: API key, discriminator and payload
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a, P: Serialize> {
    pub api_key: &'a str,
    pub request_type: RequestType,
    pub autoscalr_app_def: &'a P,
}

/// Error shape the service may return inside an HTTP 200
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(rename = "errorMessage", default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: String,
}

/// Outcome of decoding a 200 response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply<T> {
    Success(T),
    Failure(ApiError),
    Unrecognized,
}

impl<T: DeserializeOwned> ApiReply<T> {
    /// Decode a body once, checking the narrower error shape first.
    ///
    /// An error envelope with an empty message does not count as a failure.
    pub fn decode(body: &[u8]) -> Self {
        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => return ApiReply::Unrecognized,
        };

        if let Ok(ApiErrorEnvelope { error: Some(error) }) = ApiErrorEnvelope::deserialize(&value)
        {
            if !error.message.is_empty() {
                return ApiReply::Failure(error);
            }
        }

        match T::deserialize(value) {
            Ok(payload) => ApiReply::Success(payload),
            Err(_) => ApiReply::Unrecognized,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
