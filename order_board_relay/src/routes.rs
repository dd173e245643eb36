//! Request handler definitions
//!
//! The relay has one real route, the WebSocket endpoint at `/`. The others are there for operators.
use actix::Addr;
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use actix_web_actors::ws;
use log::*;
use serde_json::json;

use crate::{
    errors::ServerError,
    hub::{RelayHub, SessionCount},
    session::RelaySession,
};

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

#[get("/status")]
pub async fn status(hub: web::Data<Addr<RelayHub>>) -> Result<HttpResponse, ServerError> {
    let sessions = hub.send(SessionCount).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "sessions": sessions })))
}

/// Upgrades the request to a WebSocket and hands the connection to a new [`RelaySession`]
#[get("/")]
pub async fn relay_socket(
    req: HttpRequest,
    stream: web::Payload,
    hub: web::Data<Addr<RelayHub>>,
) -> Result<HttpResponse, ServerError> {
    let peer = req.connection_info().peer_addr().map(String::from);
    trace!("💻️ WebSocket upgrade request from {peer:?}");
    let session = RelaySession::new(hub.get_ref().clone(), peer);
    ws::start(session, &req, stream).map_err(|e| {
        debug!("💻️ WebSocket handshake failed. {e}");
        ServerError::HandshakeError(e.to_string())
    })
}
