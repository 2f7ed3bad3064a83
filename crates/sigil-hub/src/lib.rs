//! Sigil Hub
//!
//! Write-path selection for profile and photo uploads to a storage hub.
//!
//! A hub configuration is authorized to write a URL only when the URL sits
//! under the hub's public read-prefix. Uploads try the identity-specific hub
//! first and fall back to the global one; when neither matches, the upload
//! fails with a configuration error instead of writing anywhere else.
//!
//! The HTTP transport lives elsewhere; this crate only decides *where* a
//! write may go.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filename of the profile record under a hub's read-prefix.
const PROFILE_FILENAME: &str = "profile.json";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HubError {
    #[error("No configured hub can write to {0}")]
    UnknownUploadTarget(String),
    #[error("Cannot determine photo location from profile location {0}")]
    UnexpectedProfileLocation(String),
}

/// One storage hub's addressing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Public read prefix, e.g. `https://hub.example.org/`
    pub url_prefix: String,
    /// Address component appended to the prefix for this wallet
    pub address: String,
}

impl HubConfig {
    /// The hub's full public read-prefix for this wallet.
    fn read_prefix(&self) -> String {
        format!("{}{}/", self.url_prefix, self.address)
    }
}

/// Where an upload should go: the chosen hub and the path relative to its
/// read-prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget<'a> {
    pub hub: &'a HubConfig,
    pub path: String,
}

/// The path of `url` relative to the hub's read-prefix, if the hub is
/// authorized to write it.
pub fn writable_path(url: &str, hub: &HubConfig) -> Option<String> {
    url.strip_prefix(&hub.read_prefix()).map(str::to_string)
}

/// Pick the hub that may write `url`: the identity-specific hub first, the
/// global hub second.
///
/// Fails with [`HubError::UnknownUploadTarget`] when neither matches; a
/// write must never be redirected to a location the configuration does not
/// claim.
pub fn select_write_hub<'a>(
    url: &str,
    identity_hub: &'a HubConfig,
    global_hub: &'a HubConfig,
) -> Result<WriteTarget<'a>, HubError> {
    for hub in [identity_hub, global_hub] {
        if let Some(path) = writable_path(url, hub) {
            return Ok(WriteTarget { hub, path });
        }
    }
    log::warn!("no hub config matches upload target {url}");
    Err(HubError::UnknownUploadTarget(url.to_string()))
}

/// The default profile location for a wallet address on a hub.
pub fn profile_location(hub: &HubConfig) -> String {
    format!("{}{}", hub.read_prefix(), PROFILE_FILENAME)
}

/// Derive the upload URL for the `photo_index`-th avatar from the profile's
/// own location.
///
/// The profile location must end in `profile.json`; photos live next to it.
pub fn photo_upload_url(profile_url: &str, photo_index: u32) -> Result<String, HubError> {
    let prefix = profile_url
        .strip_suffix(PROFILE_FILENAME)
        .ok_or_else(|| HubError::UnexpectedProfileLocation(profile_url.to_string()))?;
    Ok(format!("{prefix}avatar-{photo_index}"))
}
