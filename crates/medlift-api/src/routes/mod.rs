//! # REST Routes
//!
//! ```text
//! /health                     GET
//! {prefix}/drones             GET POST
//! {prefix}/drones/bulk        POST
//! {prefix}/drones/available   GET
//! {prefix}/drones/{sn}        GET PATCH DELETE
//! {prefix}/drones/{sn}/battery GET
//! {prefix}/drones/{sn}/items  GET POST DELETE
//! {prefix}/medications        GET POST
//! {prefix}/medications/bulk   POST
//! {prefix}/medications/{code} GET PATCH DELETE
//! ```

pub mod drones;
pub mod health;
pub mod medications;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::context::AppContext;

/// JSON request body with the rejection kept for [`crate::error::ApiError`]
pub(crate) type Body<T> = Result<Json<T>, JsonRejection>;

/// Routes mounted under the configured prefix
pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/drones", get(drones::list).post(drones::create))
        .route("/drones/bulk", post(drones::create_bulk))
        .route("/drones/available", get(drones::available))
        .route(
            "/drones/{sn}",
            get(drones::fetch).patch(drones::update).delete(drones::remove),
        )
        .route("/drones/{sn}/battery", get(drones::battery))
        .route(
            "/drones/{sn}/items",
            get(drones::items)
                .post(drones::load_item)
                .delete(drones::unload_item),
        )
        .route(
            "/medications",
            get(medications::list).post(medications::create),
        )
        .route("/medications/bulk", post(medications::create_bulk))
        .route(
            "/medications/{code}",
            get(medications::fetch)
                .patch(medications::update)
                .delete(medications::remove),
        )
}
