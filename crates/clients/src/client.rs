use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuiserie_core::{ClientId, Entity, PostalAddress, ProjectId};

/// Client view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub last_name: String,
    /// Empty when the client is known by last name only.
    pub first_name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: PostalAddress,
    pub notes: Option<String>,
    /// Denormalised list of project ids. Not authoritative: query projects by
    /// client for the real set.
    pub project_ids: Vec<ProjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// "First Last", or just the last name when no first name is known.
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        if first.is_empty() {
            self.last_name.clone()
        } else {
            format!("{first} {}", self.last_name)
        }
    }

    /// Name to show in lists: the company when there is one, the person otherwise.
    pub fn display_name(&self) -> String {
        match self.company.as_deref().map(str::trim) {
            Some(company) if !company.is_empty() => company.to_string(),
            _ => self.full_name(),
        }
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub last_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: PostalAddress,
}

/// Partial update of a client. `None` leaves the field untouched.
///
/// `company: Some(None)` clears the company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub company: Option<Option<String>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<PostalAddress>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.last_name.is_none()
            && self.first_name.is_none()
            && self.company.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}
