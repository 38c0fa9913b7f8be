//! Client for the VA Lighthouse facilities API.
//!
//! Fetches one page of facilities per call and maps facility records into
//! [`NewResource`] rows. Paging policy lives in [`crate::ingest`].

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::IngestConfig;
use crate::models::{Category, NewResource};

/// One page of the facilities search response.
#[derive(Debug, Default, Deserialize)]
pub struct FacilitiesPage {
    #[serde(default)]
    pub data: Vec<Facility>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl FacilitiesPage {
    /// True when the response advertises another page.
    pub fn has_next(&self) -> bool {
        self.links
            .as_ref()
            .is_some_and(|links| links.next.is_some())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Facility {
    #[serde(default)]
    pub attributes: FacilityAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct FacilityAttributes {
    pub name: Option<String>,
    pub classification: Option<String>,
    pub website: Option<String>,
    pub phone: Option<Phone>,
    pub address: Option<FacilityAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Phone {
    pub main: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FacilityAddress {
    pub physical: Option<PhysicalAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhysicalAddress {
    pub address_1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl PhysicalAddress {
    /// `<street>, <city>, <ST> <zip>`, with stray separators trimmed from
    /// both ends when leading or trailing parts are missing.
    pub fn single_line(&self) -> String {
        let part = |p: &Option<String>| p.clone().unwrap_or_default();
        let line = format!(
            "{}, {}, {} {}",
            part(&self.address_1),
            part(&self.city),
            part(&self.state),
            part(&self.zip)
        );
        line.trim_matches(|c| c == ',' || c == ' ').to_string()
    }
}

impl Facility {
    /// Map a facility record onto a resource row of `category`.
    pub fn into_resource(self, category: Category) -> NewResource {
        let attrs = self.attributes;
        let address = attrs
            .address
            .and_then(|a| a.physical)
            .unwrap_or_default()
            .single_line();
        let phone = attrs
            .phone
            .and_then(|p| p.main)
            .unwrap_or_else(|| "N/A".to_string());

        NewResource {
            name: attrs.name.unwrap_or_else(|| "N/A".to_string()),
            category,
            description: format!(
                "Facility Type: {}",
                attrs.classification.as_deref().unwrap_or("N/A")
            ),
            website: Some(attrs.website.unwrap_or_default()),
            phone: Some(phone),
            address: Some(address),
        }
    }
}

/// What a single page request produced.
#[derive(Debug)]
pub enum PageFetch {
    Page(FacilitiesPage),
    /// The API answered with something other than `200 OK`.
    Status(StatusCode),
}

pub struct FacilitiesClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    per_page: u32,
}

impl FacilitiesClient {
    pub fn new(config: &IngestConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            per_page: config.per_page,
        })
    }

    /// Builds a client with the key read from `config.api_key_env`.
    ///
    /// A missing key is only a warning: the request is sent with an empty
    /// `apikey` header and the API decides.
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_else(|_| {
            tracing::warn!(
                env = %config.api_key_env,
                "facilities API key not set, sending an empty key"
            );
            String::new()
        });
        Self::new(config, api_key)
    }

    /// Request one page of facilities for `state` and `facility_type`.
    ///
    /// Transport and decoding failures are errors; a non-200 status is
    /// reported as [`PageFetch::Status`].
    pub async fn fetch_page(&self, state: &str, facility_type: &str, page: u32) -> Result<PageFetch> {
        let response = self
            .http
            .get(&self.api_url)
            .header("apikey", &self.api_key)
            .query(&[
                ("state", state.to_string()),
                ("type", facility_type.to_string()),
                ("page", page.to_string()),
                ("per_page", self.per_page.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(PageFetch::Status(status));
        }

        let page: FacilitiesPage = response
            .json()
            .await
            .context("Invalid facilities response")?;
        Ok(PageFetch::Page(page))
    }
}
