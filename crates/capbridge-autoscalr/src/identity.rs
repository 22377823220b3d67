//! Provider id to AutoScalr instance id mapping

use crate::error::{BridgeError, Result};

/// Byte length of the scheme prefix (`aws:///`) stripped from provider ids
const SCHEME_PREFIX_LEN: usize = 7;

/// Extract the remote instance id from an orchestrator provider id.
///
/// `aws:///us-east-1a/i-0abc` becomes `i-0abc`. The fixed-length scheme
/// prefix is dropped and the last `/` segment of the rest is returned.
pub fn remote_instance_id(provider_id: &str) -> Result<String> {
    let malformed = || BridgeError::MalformedProviderId(provider_id.to_string());

    let path = provider_id.get(SCHEME_PREFIX_LEN..).ok_or_else(malformed)?;
    let (_, instance_id) = path.rsplit_once('/').ok_or_else(malformed)?;
    if instance_id.is_empty() {
        return Err(malformed());
    }

    Ok(instance_id.to_string())
}

/// Map a batch of provider ids, failing on the first malformed one
pub fn remote_instance_ids<'a>(provider_ids: impl IntoIterator<Item = &'a str>) -> Result<Vec<String>> {
    provider_ids.into_iter().map(remote_instance_id).collect()
}
