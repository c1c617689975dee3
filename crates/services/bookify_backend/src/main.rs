// File: services/bookify_backend/src/main.rs
use axum::{routing::get, Router};
use bookify_common::{create_client, DEFAULT_TIMEOUT_SECS};
use bookify_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[cfg(feature = "outlook")]
use bookify_outlook::{
    auth::GraphTokenProvider, handlers::OutlookState, notify::GraphMailer,
    routes as outlook_routes, service::GraphCalendarService,
};

#[tokio::main]
async fn main() {
    bookify_common::logging::init();
    let config = Arc::new(load_config().expect("Failed to load config"));

    let api_router = Router::new().route("/", get(|| async { "Welcome to Bookify API!" }));

    // Service objects are built once here and handed to the routers by
    // reference; nothing below reaches for ambient global state.
    #[cfg(feature = "outlook")]
    let api_router = if config.use_outlook {
        let outlook_config = config.outlook.as_ref().expect("Outlook config missing");
        let timeout = outlook_config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = create_client(timeout).expect("Failed to create HTTP client");
        let tokens = Arc::new(GraphTokenProvider::new(client.clone(), outlook_config));
        let calendar = Arc::new(GraphCalendarService::new(client.clone(), tokens.clone()));
        let mailer = config
            .notify
            .as_ref()
            .map(|notify| Arc::new(GraphMailer::new(client, tokens, notify.sender.clone())));
        let state = Arc::new(OutlookState {
            config: config.clone(),
            calendar,
            mailer,
        });
        api_router.merge(outlook_routes::routes(state))
    } else {
        info!("Outlook integration disabled by configuration");
        api_router
    };

    #[allow(unused_mut)] // with the openapi feature it needs to be mutable
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(all(feature = "openapi", feature = "outlook"))]
    {
        use bookify_outlook::doc::OutlookApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Bookify API",
                version = "0.1.0",
                description = "Appointment availability and booking API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(OutlookApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    // The booking form is served from a separate site, so cross-origin
    // requests are expected.
    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
