// File: services/studyplan_backend/src/main.rs
use axum::{routing::get, Router};
use std::sync::Arc;
use studyplan_common::logging;
use studyplan_config::load_config;
use studyplan_gcal::routes as gcal_routes;
use studyplan_gcal::GcalState;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config()?);
    logging::init_from_name(&config.logging.level);

    let gcal_state = Arc::new(GcalState::from_config(config.clone()).await?);
    info!("Calendar provider: {:?}", config.gcal.provider);

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Studyplan API!" }))
        .merge(gcal_routes::routes(gcal_state));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use studyplan_gcal::doc::GcalApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Studyplan API",
                version = "0.1.0",
                description = "Calendar availability and study scheduling",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(GcalApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
