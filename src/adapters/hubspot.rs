use crate::config::CrmSettings;
use crate::domain::model::ContactRecord;
use crate::domain::ports::CrmClient;
use crate::utils::error::{GiftEmailError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;

const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

#[derive(Serialize)]
struct ContactPayload<'a> {
    properties: &'a ContactRecord,
}

/// Creates contacts through the HubSpot CRM v3 API.
pub struct HubSpotClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HubSpotClient {
    pub fn new(settings: &CrmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(redact)?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn contacts_url(&self) -> String {
        format!("{}{}", self.base_url, CONTACTS_PATH)
    }
}

// The request URL carries the API key, so it must not reach error messages.
fn redact(error: reqwest::Error) -> GiftEmailError {
    GiftEmailError::HttpError(error.without_url())
}

#[async_trait]
impl CrmClient for HubSpotClient {
    async fn submit_contact(&self, contact: &ContactRecord) -> Result<()> {
        tracing::debug!("Submitting contact to {}", self.contacts_url());

        let response = self
            .client
            .post(self.contacts_url())
            .query(&[("hapikey", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .json(&ContactPayload {
                properties: contact,
            })
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        tracing::debug!("CRM response status: {}", status);

        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(GiftEmailError::CrmError {
            status: status.as_u16(),
            message,
        })
    }
}
