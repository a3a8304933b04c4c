use actix_web::web;

pub mod account;
pub mod auth;
pub mod food;
pub mod health;
pub mod progress;
pub mod workouts;

/// Every route the service exposes. Protected resources carry their own
/// `AuthGate`, so the same wiring serves `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);
    cfg.service(
        web::scope("/api")
            .configure(auth::configure_routes)
            .configure(account::configure_routes)
            .configure(food::configure_routes)
            .configure(workouts::configure_routes)
            .configure(progress::configure_routes),
    );
}
