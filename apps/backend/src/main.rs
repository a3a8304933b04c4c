use actix_web::{web, App, HttpServer};
use fittrack::config::AppConfig;
use fittrack::infra::state::build_state;
use fittrack::middleware::{cors_middleware, RequestTrace, StructuredLogger, TraceSpan};
use fittrack::routes;
use fittrack::state::SecurityConfig;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "startup_failed=config");
            std::process::exit(1);
        }
    };

    let security = SecurityConfig::new(config.jwt_secret.clone()).with_ttl(config.token_ttl);

    // Reconciliation runs inside build(); nothing binds until it succeeds.
    let app_state = match build_state()
        .with_db(config.db_kind)
        .with_security(security)
        .with_nutrition_config(config.nutrition.clone())
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "startup_failed=state");
            std::process::exit(1);
        }
    };

    info!(host = %config.host, port = config.port, db_kind = %config.db_kind, "server_starting");

    let data = web::Data::new(app_state);
    let cors_origins = config.cors_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&cors_origins))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
