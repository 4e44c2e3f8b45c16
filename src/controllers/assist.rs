//! The full-pipeline endpoint: one question in, one reply out.

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::agent;
use crate::state::{AgentState, Configurable, RunConfig};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    pub question: String,
    #[serde(default)]
    pub current_user_id: Option<i64>,
}

#[derive(Serialize)]
pub struct AssistResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AgentState>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/assist").route(web::post().to(assist)));
}

async fn assist(state: web::Data<AppState>, body: web::Json<AssistRequest>) -> impl Responder {
    let ctx = match super::node_context(&state) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("[API] failed to build AI client: {}", e);
            return HttpResponse::InternalServerError().json(AssistResponse {
                success: false,
                response: None,
                error: Some(e),
                state: None,
            });
        }
    };

    let body = body.into_inner();
    let turn_state = AgentState {
        question: body.question,
        ..Default::default()
    };
    let run_config = RunConfig {
        configurable: Configurable {
            current_user_id: body.current_user_id,
        },
    };

    let final_state = agent::run_turn(&ctx, turn_state, &run_config).await;
    HttpResponse::Ok().json(AssistResponse {
        success: true,
        response: Some(final_state.response.clone()),
        error: None,
        state: Some(final_state),
    })
}
