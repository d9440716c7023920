//! Drone routes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::payload::{self, BulkResponse, CodePayload, DRONE_FIELDS, Data, LoadResponse};
use crate::routes::Body;
use medlift_domain::{Drone, Medication};

pub async fn list(State(ctx): State<AppContext>) -> ApiResult<Json<Data<Vec<Drone>>>> {
    Ok(Json(Data::new(ctx.fleet.drones().await?)))
}

pub async fn create(
    State(ctx): State<AppContext>,
    body: Body<Value>,
) -> ApiResult<(StatusCode, Json<Data<Drone>>)> {
    let Json(body) = body?;
    let drone = payload::drone_from_map(&payload::object(body)?)?;
    let drone = ctx.fleet.register_drone(drone).await?;
    Ok((StatusCode::CREATED, Json(Data::new(drone))))
}

pub async fn create_bulk(
    State(ctx): State<AppContext>,
    body: Body<Value>,
) -> ApiResult<(StatusCode, Json<BulkResponse<Drone>>)> {
    let Json(body) = body?;
    let drones = payload::bulk(body, &DRONE_FIELDS, payload::drone_from_map)?;
    let (bulk_size, data) = ctx.fleet.register_drones(drones).await?;
    Ok((StatusCode::CREATED, Json(BulkResponse { bulk_size, data })))
}

/// Idle drones with at least 25% battery
pub async fn available(State(ctx): State<AppContext>) -> ApiResult<Json<Data<Vec<Drone>>>> {
    Ok(Json(Data::new(ctx.fleet.available_drones().await?)))
}

pub async fn fetch(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
) -> ApiResult<Json<Data<Drone>>> {
    Ok(Json(Data::new(ctx.fleet.drone(&sn).await?)))
}

pub async fn update(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
    body: Body<Value>,
) -> ApiResult<Json<Data<Drone>>> {
    let Json(body) = body?;
    let changes = payload::object(body)?;
    Ok(Json(Data::new(ctx.fleet.update_drone(&sn, &changes).await?)))
}

pub async fn remove(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
) -> ApiResult<Json<Data<bool>>> {
    ctx.fleet.delete_drone(&sn).await?;
    Ok(Json(Data::new(true)))
}

pub async fn battery(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
) -> ApiResult<Json<Data<i32>>> {
    Ok(Json(Data::new(ctx.fleet.battery_level(&sn).await?)))
}

/// Current load
pub async fn items(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
) -> ApiResult<Json<Data<Vec<Medication>>>> {
    Ok(Json(Data::new(ctx.fleet.load_of(&sn).await?)))
}

pub async fn load_item(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
    body: Body<CodePayload>,
) -> ApiResult<Json<Data<LoadResponse>>> {
    let Json(CodePayload { code }) = body?;
    let (outcome, medication) = ctx.fleet.load_medication(&sn, &code).await?;
    Ok(Json(Data::new(LoadResponse {
        outcome,
        medication,
    })))
}

pub async fn unload_item(
    State(ctx): State<AppContext>,
    Path(sn): Path<String>,
    body: Body<CodePayload>,
) -> ApiResult<Json<Data<Medication>>> {
    let Json(CodePayload { code }) = body?;
    Ok(Json(Data::new(
        ctx.fleet.unload_medication(&sn, &code).await?,
    )))
}
