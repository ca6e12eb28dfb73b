use actix_web::{middleware, web, App, HttpServer};

use crate::config::ServerSettings;
use crate::domain::order::OrderCommandHandler;

/// Start the order API server and run until shutdown
pub async fn start_server(
    settings: &ServerSettings,
    handler: web::Data<OrderCommandHandler>,
) -> std::io::Result<()> {
    tracing::info!(
        "🚀 Starting order API on http://{}:{}/",
        settings.host,
        settings.port
    );

    let json_limit = settings.json_limit;

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(handler.clone())
            .app_data(super::json_config(json_limit))
            .configure(super::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
