//! Informational temple directory: committee, contacts, jatres, gallery.

use crate::error::TempleError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitteeRole {
    President,
    Secretary,
    Member,
}

impl CommitteeRole {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::President => "president",
            Self::Secretary => "secretary",
            Self::Member => "member",
        }
    }
}

impl std::str::FromStr for CommitteeRole {
    type Err = TempleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "president" => Ok(Self::President),
            "secretary" => Ok(Self::Secretary),
            "member" => Ok(Self::Member),
            other => Err(TempleError::InvalidInput(format!(
                "unknown committee role '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeMember {
    pub id: i64,
    pub name: String,
    pub role: CommitteeRole,
    pub mobile_number: String,
}

/// Committee member as shown publicly: no phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeMemberPublic {
    pub id: i64,
    pub name: String,
    pub role: CommitteeRole,
}

impl From<&CommitteeMember> for CommitteeMemberPublic {
    fn from(member: &CommitteeMember) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            role: member.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeMemberInput {
    pub name: String,
    pub role: CommitteeRole,
    pub mobile_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempleContact {
    pub id: i64,
    pub contact_type: String,
    pub contact_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInput {
    pub contact_type: String,
    pub contact_number: String,
}

/// Temple festival / event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jatre {
    pub id: i64,
    pub name: String,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub date: DateTime<Utc>,
    pub description: String,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JatreInput {
    pub name: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub activities: Vec<String>,
}

/// Gallery entry. The media itself lives in external blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub media_type: String,
    pub blob_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItemInput {
    pub title: String,
    pub description: String,
    pub media_type: String,
    pub blob_url: String,
}

/// Editable gallery fields; the blob reference is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItemUpdate {
    pub title: String,
    pub description: String,
    pub media_type: String,
}

/// Fail with `InvalidInput` when a required text field is blank.
pub fn require_text(field: &str, value: &str) -> Result<(), TempleError> {
    if value.trim().is_empty() {
        return Err(TempleError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl CommitteeMemberInput {
    pub fn validate(&self) -> Result<(), TempleError> {
        require_text("name", &self.name)
    }
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), TempleError> {
        require_text("contactType", &self.contact_type)?;
        require_text("contactNumber", &self.contact_number)
    }
}

impl JatreInput {
    pub fn validate(&self) -> Result<(), TempleError> {
        require_text("name", &self.name)
    }
}

impl GalleryItemInput {
    pub fn validate(&self) -> Result<(), TempleError> {
        require_text("title", &self.title)?;
        require_text("mediaType", &self.media_type)?;
        require_text("blobUrl", &self.blob_url)
    }
}

impl GalleryItemUpdate {
    pub fn validate(&self) -> Result<(), TempleError> {
        require_text("title", &self.title)?;
        require_text("mediaType", &self.media_type)
    }
}
