//! Temple directory endpoints: committee, contacts, jatres and gallery.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{
        CommitteeMemberRequest, ContactRequest, GalleryItemRequest, GalleryItemUpdateRequest,
        JatreRequest,
    },
    models::{
        Caller, CommitteeMember, CommitteeMemberPublic, GalleryItem, Jatre, TempleContact,
    },
    middleware::AdminCaller,
    startup::AppState,
};

// Committee

pub async fn list_committee(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommitteeMemberPublic>>, AppError> {
    Ok(Json(state.directory.committee().await?))
}

pub async fn list_committee_admin(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CommitteeMember>>, AppError> {
    Ok(Json(state.directory.committee_full(&caller).await?))
}

pub async fn add_committee_member(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Json(request): Json<CommitteeMemberRequest>,
) -> Result<(StatusCode, Json<CommitteeMember>), AppError> {
    request.validate()?;
    let member = state
        .directory
        .add_committee_member(&caller, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn edit_committee_member(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<i64>,
    Json(request): Json<CommitteeMemberRequest>,
) -> Result<Json<CommitteeMember>, AppError> {
    request.validate()?;
    let member = state
        .directory
        .edit_committee_member(&caller, id, request.into())
        .await?;
    Ok(Json(member))
}

pub async fn remove_committee_member(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.directory.remove_committee_member(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Contacts

pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<TempleContact>>, AppError> {
    Ok(Json(state.directory.contacts().await?))
}

pub async fn add_contact(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<TempleContact>), AppError> {
    request.validate()?;
    let contact = state.directory.add_contact(&caller, request.into()).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn edit_contact(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<i64>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<TempleContact>, AppError> {
    request.validate()?;
    let contact = state
        .directory
        .edit_contact(&caller, id, request.into())
        .await?;
    Ok(Json(contact))
}

pub async fn remove_contact(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.directory.remove_contact(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Jatres

pub async fn list_jatres(State(state): State<AppState>) -> Result<Json<Vec<Jatre>>, AppError> {
    Ok(Json(state.directory.jatres().await?))
}

pub async fn add_jatre(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Json(request): Json<JatreRequest>,
) -> Result<(StatusCode, Json<Jatre>), AppError> {
    request.validate()?;
    let jatre = state.directory.add_jatre(&caller, request.into()).await?;
    Ok((StatusCode::CREATED, Json(jatre)))
}

pub async fn edit_jatre(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<i64>,
    Json(request): Json<JatreRequest>,
) -> Result<Json<Jatre>, AppError> {
    request.validate()?;
    let jatre = state.directory.edit_jatre(&caller, id, request.into()).await?;
    Ok(Json(jatre))
}

pub async fn remove_jatre(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.directory.remove_jatre(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Gallery

pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryItem>>, AppError> {
    Ok(Json(state.directory.gallery().await?))
}

pub async fn add_gallery_item(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Json(request): Json<GalleryItemRequest>,
) -> Result<(StatusCode, Json<GalleryItem>), AppError> {
    request.validate()?;
    let item = state
        .directory
        .add_gallery_item(&caller, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn edit_gallery_item(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<i64>,
    Json(request): Json<GalleryItemUpdateRequest>,
) -> Result<Json<GalleryItem>, AppError> {
    request.validate()?;
    let item = state
        .directory
        .edit_gallery_item(&caller, id, request.into())
        .await?;
    Ok(Json(item))
}

pub async fn remove_gallery_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.directory.remove_gallery_item(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
