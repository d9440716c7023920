//! Medication routes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::payload::{self, BulkResponse, Data, MEDICATION_FIELDS};
use crate::routes::Body;
use medlift_domain::Medication;

pub async fn list(State(ctx): State<AppContext>) -> ApiResult<Json<Data<Vec<Medication>>>> {
    Ok(Json(Data::new(ctx.fleet.medications().await?)))
}

pub async fn create(
    State(ctx): State<AppContext>,
    body: Body<Value>,
) -> ApiResult<(StatusCode, Json<Data<Medication>>)> {
    let Json(body) = body?;
    let medication = payload::medication_from_map(&payload::object(body)?)?;
    let medication = ctx.fleet.register_medication(medication).await?;
    Ok((StatusCode::CREATED, Json(Data::new(medication))))
}

pub async fn create_bulk(
    State(ctx): State<AppContext>,
    body: Body<Value>,
) -> ApiResult<(StatusCode, Json<BulkResponse<Medication>>)> {
    let Json(body) = body?;
    let medications = payload::bulk(body, &MEDICATION_FIELDS, payload::medication_from_map)?;
    let (bulk_size, data) = ctx.fleet.register_medications(medications).await?;
    Ok((StatusCode::CREATED, Json(BulkResponse { bulk_size, data })))
}

pub async fn fetch(
    State(ctx): State<AppContext>,
    Path(code): Path<String>,
) -> ApiResult<Json<Data<Medication>>> {
    Ok(Json(Data::new(ctx.fleet.medication(&code).await?)))
}

pub async fn update(
    State(ctx): State<AppContext>,
    Path(code): Path<String>,
    body: Body<Value>,
) -> ApiResult<Json<Data<Medication>>> {
    let Json(body) = body?;
    let changes = payload::object(body)?;
    Ok(Json(Data::new(
        ctx.fleet.update_medication(&code, &changes).await?,
    )))
}

pub async fn remove(
    State(ctx): State<AppContext>,
    Path(code): Path<String>,
) -> ApiResult<Json<Data<bool>>> {
    ctx.fleet.delete_medication(&code).await?;
    Ok(Json(Data::new(true)))
}
