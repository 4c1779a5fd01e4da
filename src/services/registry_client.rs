use std::future::Future;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::{
    configuration::RegistrySettings,
    domain::company::{CompanyProfile, CompanySearchPage},
};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid registry url: {0}")]
    InvalidUrl(String),
    #[error("Request to registry failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Registry responded with status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLookup {
    Found(CompanyProfile),
    NotFound,
    TransportError(String),
}

/// The two registry lookups the scan needs. Neither of them fails: errors are
/// logged and folded into the return value.
pub trait CompanyRegistry {
    fn fetch_company_profile(
        &self,
        company_number: &str,
    ) -> impl Future<Output = ProfileLookup> + Send;

    fn search_by_classification_code(
        &self,
        code: &str,
        page_size: u32,
    ) -> impl Future<Output = CompanySearchPage> + Send;
}

pub struct RegistryClient {
    client: Client,
    base_url: Url,
    auth_header: String,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    sic_codes: &'a str,
    size: u32,
}

/// API key as the user name, empty password.
pub fn basic_auth_header(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", api_key)))
}

pub fn decode_basic_auth(header: &str) -> Option<String> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;

    // The password is always empty, so everything before the trailing ':' is the key.
    decoded.strip_suffix(':').map(String::from)
}

impl RegistryClient {
    pub fn new(settings: &RegistrySettings) -> Result<Self, RegistryError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", settings.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::InvalidUrl(settings.base_url.clone()));
        }

        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(RegistryClient {
            client,
            base_url,
            auth_header: basic_auth_header(&settings.api_key),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn try_fetch_company_profile(
        &self,
        company_number: &str,
    ) -> Result<Option<CompanyProfile>, RegistryError> {
        let url = self.endpoint(&["company", company_number])?;
        let res = self
            .client
            .get(url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(res.json::<CompanyProfile>().await?)),
            status => Err(RegistryError::Status(status)),
        }
    }

    async fn try_search_by_classification_code(
        &self,
        code: &str,
        page_size: u32,
    ) -> Result<CompanySearchPage, RegistryError> {
        let url = self.endpoint(&["advanced-search", "companies"])?;
        let res = self
            .client
            .get(url)
            .header(AUTHORIZATION, &self.auth_header)
            .query(&SearchQuery {
                sic_codes: code,
                size: page_size,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status));
        }

        Ok(res.json::<CompanySearchPage>().await?)
    }
}

impl CompanyRegistry for RegistryClient {
    async fn fetch_company_profile(&self, company_number: &str) -> ProfileLookup {
        let company_number = company_number.trim();
        if company_number.is_empty() {
            return ProfileLookup::NotFound;
        }

        match self.try_fetch_company_profile(company_number).await {
            Ok(Some(profile)) => ProfileLookup::Found(profile),
            Ok(None) => {
                log::warn!("Company {} not found in registry", company_number);
                ProfileLookup::NotFound
            }
            Err(e) => {
                log::error!(
                    "Error fetching company profile {}: {:?}",
                    company_number,
                    e
                );
                ProfileLookup::TransportError(e.to_string())
            }
        }
    }

    async fn search_by_classification_code(&self, code: &str, page_size: u32) -> CompanySearchPage {
        match self.try_search_by_classification_code(code, page_size).await {
            Ok(page) => {
                log::info!(
                    "Found {} companies ({} returned) for SIC code {}",
                    page.total,
                    page.items.len(),
                    code
                );
                page
            }
            Err(e) => {
                log::error!("Error searching companies for SIC code {}: {:?}", code, e);
                CompanySearchPage::empty()
            }
        }
    }
}
