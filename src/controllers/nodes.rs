//! Per-node invocation endpoints.
//!
//! Every pipeline node is individually addressable with the same envelope:
//! `{ "input": <agent state>, "config": { "configurable": { ... } } }`,
//! answered with `{ "output": <agent state> }`. A malformed `input` (for
//! example a bare number instead of an object) is rejected with a 400 and
//! the deserializer's type error.

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::agent;
use crate::state::{AgentState, RunConfig};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub input: AgentState,
    #[serde(default)]
    pub config: RunConfig,
}

#[derive(Serialize)]
pub struct InvokeResponse {
    pub output: AgentState,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/nodes/get_current_user").route(web::post().to(get_current_user)),
    )
    .service(web::resource("/api/nodes/check_relevance").route(web::post().to(check_relevance)))
    .service(web::resource("/api/nodes/extract_product").route(web::post().to(extract_product)))
    .service(
        web::resource("/api/nodes/check_product_existence")
            .route(web::post().to(check_product_existence)),
    )
    .service(
        web::resource("/api/nodes/convert_nl_to_sql").route(web::post().to(convert_nl_to_sql)),
    );
}

fn ai_unavailable(error: String) -> HttpResponse {
    log::error!("[API] failed to build AI client: {}", error);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": error
    }))
}

async fn get_current_user(
    state: web::Data<AppState>,
    body: web::Json<InvokeRequest>,
) -> impl Responder {
    let ctx = match super::node_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => return ai_unavailable(e),
    };
    let body = body.into_inner();
    // The resolver itself prefers the config id and falls back to the one
    // embedded in the input, so no request rewriting is needed here.
    let output = agent::resolve_current_user(&ctx, body.input, &body.config);
    HttpResponse::Ok().json(InvokeResponse { output })
}

async fn check_relevance(
    state: web::Data<AppState>,
    body: web::Json<InvokeRequest>,
) -> impl Responder {
    let ctx = match super::node_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => return ai_unavailable(e),
    };
    let output = agent::check_relevance(&ctx, body.into_inner().input).await;
    HttpResponse::Ok().json(InvokeResponse { output })
}

async fn extract_product(
    state: web::Data<AppState>,
    body: web::Json<InvokeRequest>,
) -> impl Responder {
    let ctx = match super::node_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => return ai_unavailable(e),
    };
    let output = agent::extract_product_items(&ctx, body.into_inner().input).await;
    HttpResponse::Ok().json(InvokeResponse { output })
}

async fn check_product_existence(
    state: web::Data<AppState>,
    body: web::Json<InvokeRequest>,
) -> impl Responder {
    let ctx = match super::node_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => return ai_unavailable(e),
    };
    let output = agent::check_product_existence(&ctx, body.into_inner().input).await;
    HttpResponse::Ok().json(InvokeResponse { output })
}

async fn convert_nl_to_sql(
    state: web::Data<AppState>,
    body: web::Json<InvokeRequest>,
) -> impl Responder {
    let ctx = match super::node_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => return ai_unavailable(e),
    };
    let output = agent::convert_nl_to_sql(&ctx, body.into_inner().input).await;
    HttpResponse::Ok().json(InvokeResponse { output })
}
