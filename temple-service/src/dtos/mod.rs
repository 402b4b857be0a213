//! Request and response bodies. Timestamps travel as integer nanoseconds
//! since the Unix epoch.

use crate::models::{
    CommitteeMemberInput, CommitteeRole, ContactInput, GalleryItemInput, GalleryItemUpdate,
    JatreInput, PaymentDetails, PaymentMode, UserRole,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of both submit and edit.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmationRequest {
    #[validate(length(max = 200, message = "Donor name is too long"))]
    pub donor_name: String,
    #[validate(length(max = 20, message = "Mobile number is too long"))]
    pub mobile_number: String,
    pub amount_paid: i64,
    pub payment_mode: PaymentMode,
    #[validate(length(max = 100, message = "Transaction id is too long"))]
    pub transaction_id: String,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub date: DateTime<Utc>,
}

impl From<PaymentConfirmationRequest> for PaymentDetails {
    fn from(req: PaymentConfirmationRequest) -> Self {
        Self {
            donor_name: req.donor_name,
            mobile_number: req.mobile_number,
            amount_paid: req.amount_paid,
            payment_mode: req.payment_mode,
            transaction_id: req.transaction_id,
            date: req.date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentSubmittedResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalanceRequest {
    pub new_balance: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeMemberRequest {
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: String,
    pub role: CommitteeRole,
    #[validate(length(max = 20, message = "Mobile number is too long"))]
    pub mobile_number: String,
}

impl From<CommitteeMemberRequest> for CommitteeMemberInput {
    fn from(req: CommitteeMemberRequest) -> Self {
        Self {
            name: req.name,
            role: req.role,
            mobile_number: req.mobile_number,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[validate(length(max = 100, message = "Contact type is too long"))]
    pub contact_type: String,
    #[validate(length(max = 50, message = "Contact number is too long"))]
    pub contact_number: String,
}

impl From<ContactRequest> for ContactInput {
    fn from(req: ContactRequest) -> Self {
        Self {
            contact_type: req.contact_type,
            contact_number: req.contact_number,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JatreRequest {
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: String,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub date: DateTime<Utc>,
    #[validate(length(max = 4000, message = "Description is too long"))]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl From<JatreRequest> for JatreInput {
    fn from(req: JatreRequest) -> Self {
        Self {
            name: req.name,
            date: req.date,
            description: req.description,
            activities: req.activities,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemRequest {
    #[validate(length(max = 200, message = "Title is too long"))]
    pub title: String,
    #[validate(length(max = 4000, message = "Description is too long"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 50, message = "Media type is too long"))]
    pub media_type: String,
    #[validate(url(message = "Blob URL must be a valid URL"))]
    pub blob_url: String,
}

impl From<GalleryItemRequest> for GalleryItemInput {
    fn from(req: GalleryItemRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            media_type: req.media_type,
            blob_url: req.blob_url,
        }
    }
}

/// Gallery edits cannot touch the blob reference.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemUpdateRequest {
    #[validate(length(max = 200, message = "Title is too long"))]
    pub title: String,
    #[validate(length(max = 4000, message = "Description is too long"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 50, message = "Media type is too long"))]
    pub media_type: String,
}

impl From<GalleryItemUpdateRequest> for GalleryItemUpdate {
    fn from(req: GalleryItemUpdateRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            media_type: req.media_type,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsAdminResponse {
    pub is_admin: bool,
}
