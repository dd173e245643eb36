use actix::Actor;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use log::*;

use crate::{
    config::RelayConfig,
    errors::ServerError,
    hub::RelayHub,
    routes::{health, relay_socket, status},
};

pub async fn run_server(config: RelayConfig) -> Result<(), ServerError> {
    let srv = create_server_instance(config)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Binds the relay to the configured address and returns the server, ready to be awaited or spawned.
///
/// All workers share a single [`RelayHub`], so every session sees every other session, whichever worker accepted it.
pub fn create_server_instance(config: RelayConfig) -> Result<Server, ServerError> {
    let hub = RelayHub::default().start();
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("obr::access_log"))
            .app_data(web::Data::new(hub.clone()))
            .service(health)
            .service(status)
            .service(relay_socket)
    })
    .bind((config.host.as_str(), config.port))
    .map_err(|e| ServerError::InitializeError(format!("Could not bind to {}:{}. {e}", config.host, config.port)))?
    .run();
    info!("🚀️ Relay listening on ws://{}:{}/", config.host, config.port);
    Ok(srv)
}
