// Application layer: HTTP routes wired to the lookup service.

pub mod routes;

pub use routes::{create_router, AppState};
