//! Calendar provider speaking the Google Calendar v3 event shape.

use crate::error::ProviderError;
use crate::REQUEST_TIMEOUT;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use claim_tracker_domain::value_objects::{EventRef, EventSpec};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// REST base queried when `CALENDAR_API_URL` is unset.
pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// External calendar holding one reminder event per active position.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Creates an event and returns its reference.
    async fn create_event(&self, spec: &EventSpec) -> Result<EventRef, ProviderError>;
    /// Replaces the content of an existing event.
    async fn update_event(&self, event_ref: &EventRef, spec: &EventSpec)
        -> Result<(), ProviderError>;
    /// Deletes an event.
    async fn delete_event(&self, event_ref: &EventRef) -> Result<(), ProviderError>;
    /// Reads an event back.
    async fn get_event(&self, event_ref: &EventRef) -> Result<EventSpec, ProviderError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime")]
    date_time: DateTime<Utc>,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct ReminderOverride {
    method: &'static str,
    minutes: u32,
}

#[derive(Debug, Serialize)]
struct Reminders {
    #[serde(rename = "useDefault")]
    use_default: bool,
    overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Serialize)]
struct EventBody {
    summary: String,
    location: String,
    description: String,
    start: EventTime,
    end: EventTime,
    reminders: Reminders,
}

impl EventBody {
    fn from_spec(spec: &EventSpec) -> Self {
        Self {
            summary: spec.summary.clone(),
            location: spec.location.clone(),
            description: spec.description.clone(),
            start: EventTime {
                date_time: spec.starts_at(),
                time_zone: "UTC".to_string(),
            },
            end: EventTime {
                date_time: spec.ends_at(),
                time_zone: "UTC".to_string(),
            },
            reminders: Reminders {
                use_default: false,
                overrides: vec![
                    ReminderOverride {
                        method: "email",
                        minutes: EventSpec::EMAIL_REMINDER_MINUTES,
                    },
                    ReminderOverride {
                        method: "popup",
                        minutes: EventSpec::POPUP_REMINDER_MINUTES,
                    },
                ],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventResource {
    id: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    description: Option<String>,
    start: Option<EventTime>,
}

/// Calendar client over a base URL plus bearer token.
///
/// Without a token every call returns [`ProviderError::Unconfigured`];
/// callers are expected to degrade instead of crash.
#[derive(Clone)]
pub struct RestCalendar {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestCalendar {
    /// Builds a client against `base_url` authenticating with `token`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::request)?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn token(&self) -> Result<&str, ProviderError> {
        self.token.as_deref().ok_or(ProviderError::Unconfigured)
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.base_url)
    }

    fn event_url(&self, event_ref: &EventRef) -> String {
        format!("{}/{}", self.events_url(), event_ref.as_str())
    }

    fn check_status(status: StatusCode) -> Result<(), ProviderError> {
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarProvider for RestCalendar {
    async fn create_event(&self, spec: &EventSpec) -> Result<EventRef, ProviderError> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(token)
            .json(&EventBody::from_spec(spec))
            .send()
            .await
            .map_err(ProviderError::request)?;
        Self::check_status(response.status())?;

        let created: EventResource = response.json().await.map_err(ProviderError::request)?;
        let id = created
            .id
            .ok_or_else(|| ProviderError::Malformed("created event carries no id".to_string()))?;
        debug!(event = %id, summary = %spec.summary, "calendar event created");
        Ok(EventRef(id))
    }

    async fn update_event(
        &self,
        event_ref: &EventRef,
        spec: &EventSpec,
    ) -> Result<(), ProviderError> {
        let token = self.token()?;
        let response = self
            .client
            .put(self.event_url(event_ref))
            .bearer_auth(token)
            .json(&EventBody::from_spec(spec))
            .send()
            .await
            .map_err(ProviderError::request)?;
        Self::check_status(response.status())?;
        debug!(event = %event_ref.as_str(), "calendar event updated");
        Ok(())
    }

    async fn delete_event(&self, event_ref: &EventRef) -> Result<(), ProviderError> {
        let token = self.token()?;
        let response = self
            .client
            .delete(self.event_url(event_ref))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ProviderError::request)?;
        Self::check_status(response.status())?;
        debug!(event = %event_ref.as_str(), "calendar event deleted");
        Ok(())
    }

    async fn get_event(&self, event_ref: &EventRef) -> Result<EventSpec, ProviderError> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.event_url(event_ref))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ProviderError::request)?;
        Self::check_status(response.status())?;

        let resource: EventResource = response.json().await.map_err(ProviderError::request)?;
        let start = resource
            .start
            .ok_or_else(|| ProviderError::Malformed("event carries no start time".to_string()))?;
        Ok(EventSpec {
            summary: resource.summary.unwrap_or_default(),
            description: resource.description.unwrap_or_default(),
            location: resource.location.unwrap_or_default(),
            date: start.date_time.date_naive(),
        })
    }
}
