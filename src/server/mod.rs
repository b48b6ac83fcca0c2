// HTTP server module

mod handlers;
mod middleware;
mod routes;

pub use routes::{create_router, AppState};
