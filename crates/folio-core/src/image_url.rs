//! Public image URLs.
//!
//! URLs have the shape the retrieval route serves:
//! `{public_base}{API_PREFIX}/{owner}/{folder}/{name}`.

use url::Url;

use crate::constants::API_PREFIX;
use crate::models::{FolderAddress, ImageAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    base: String,
}

impl ImageUrlBuilder {
    /// Build from the configured public base URL, which must be an absolute
    /// `http` or `https` URL without query or fragment.
    pub fn new(public_base_url: &str) -> Result<Self, anyhow::Error> {
        let parsed = Url::parse(public_base_url.trim())
            .map_err(|e| anyhow::anyhow!("Invalid public base URL '{}': {}", public_base_url, e))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "Public base URL must use http or https, got '{}'",
                parsed.scheme()
            ));
        }
        if parsed.host_str().is_none() {
            return Err(anyhow::anyhow!("Public base URL must include a host"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(anyhow::anyhow!(
                "Public base URL must not carry a query or fragment"
            ));
        }

        let root = parsed.as_str().trim_end_matches('/');
        Ok(Self {
            base: format!("{}{}", root, API_PREFIX),
        })
    }

    /// Base every image URL starts with.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn build(&self, address: &ImageAddress) -> String {
        format!("{}/{}", self.base, address.key())
    }

    pub fn folder_url(&self, address: &FolderAddress) -> String {
        format!("{}/{}", self.base, address.prefix())
    }
}
