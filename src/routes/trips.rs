use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::CurrentUser, error::AppError, models::location::LocationType, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(trip_list).post(trip_create))
        .route(
            "/trips/:trip_id",
            get(trip_detail).put(trip_update).delete(trip_delete),
        )
        .route("/trips/:trip_id/dates/:location_type", get(date_choices))
        .route(
            "/trips/:trip_id/locations/:location_type",
            post(location_create),
        )
        .route(
            "/trips/:trip_id/locations/:location_type/:location_id",
            axum::routing::put(location_update).delete(location_delete),
        )
        .route(
            "/trips/:trip_id/members",
            get(member_roster).post(member_invite).delete(member_remove),
        )
        .route("/trips/:trip_id/members/check", get(member_check))
        .route("/trips/:trip_id/members/accept", post(member_accept))
        .route("/notifications", get(notifications))
}

#[derive(Deserialize)]
struct TripForm {
    title: String,
    start_date: NaiveDate,
    number_nights: i64,
}

async fn trip_list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let today = Utc::now().date_naive();
    let lists = state.trips.list_for(user.id, today).await?;
    Ok(Json(lists))
}

async fn trip_create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<TripForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = state
        .trips
        .create(
            user.id,
            &user.email,
            &form.title,
            form.start_date,
            form.number_nights,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn trip_detail(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_member(trip_id, user.id).await?;
    let detail = state.trips.detail(trip_id).await?;
    Ok(Json(detail))
}

async fn trip_update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
    Json(form): Json<TripForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_organizer(trip_id, user.id).await?;
    let trip = state
        .trips
        .update(trip_id, &form.title, form.start_date, form.number_nights)
        .await?;
    Ok(Json(trip))
}

async fn trip_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_organizer(trip_id, user.id).await?;
    state.trips.delete(trip_id).await?;
    Ok(Json(json!({})))
}

async fn date_choices(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, location_type)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_member(trip_id, user.id).await?;
    let kind = LocationType::from_token(&location_type)?;
    let choices = state.trips.date_choices(trip_id, kind).await?;
    Ok(Json(json!({ "choices": choices })))
}

#[derive(Deserialize)]
struct LocationForm {
    date: NaiveDate,
    details: Option<String>,
}

async fn location_create(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, location_type)): Path<(i64, String)>,
    Json(form): Json<LocationForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_member(trip_id, user.id).await?;
    let kind = LocationType::from_token(&location_type)?;
    let location = state
        .trips
        .add_location(trip_id, kind, form.date, form.details)
        .await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn location_update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, location_type, location_id)): Path<(i64, String, i64)>,
    Json(form): Json<LocationForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_member(trip_id, user.id).await?;
    let kind = LocationType::from_token(&location_type)?;
    let location = state
        .trips
        .update_location(trip_id, kind, location_id, form.date, form.details)
        .await?;
    Ok(Json(location))
}

async fn location_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((trip_id, location_type, location_id)): Path<(i64, String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_member(trip_id, user.id).await?;
    let kind = LocationType::from_token(&location_type)?;
    state
        .trips
        .delete_location(trip_id, kind, location_id)
        .await?;
    Ok(Json(json!({})))
}

async fn member_roster(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_member(trip_id, user.id).await?;
    let roster = state.members.roster(trip_id).await?;
    Ok(Json(roster))
}

#[derive(Deserialize)]
struct CheckQuery {
    email: String,
}

async fn member_check(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
    Query(query): Query<CheckQuery>,
) -> Result<impl IntoResponse, AppError> {
    current.require_user()?;
    let status = state.members.classify(trip_id, &query.email).await?;
    Ok(Json(json!({ "status": status.as_str() })))
}

#[derive(Deserialize)]
struct InviteForm {
    email: String,
}

async fn member_invite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
    Json(form): Json<InviteForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.require_organizer(trip_id, user.id).await?;
    let invited = state.members.invite(trip_id, &form.email).await?;
    Ok((StatusCode::CREATED, Json(invited)))
}

async fn member_accept(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.accept(trip_id, user.id).await?;
    Ok(Json(json!({})))
}

async fn member_remove(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    state.members.remove(trip_id, user.id).await?;
    Ok(Json(json!({})))
}

async fn notifications(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip_invites = state.members.pending_invites_for(user.id).await?;
    let item_notifications = state.members.item_notifications_for(user.id).await?;
    Ok(Json(json!({
        "trip_invites": trip_invites,
        "item_notifications": item_notifications,
    })))
}
