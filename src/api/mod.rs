pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, WEBHOOK_PATH};
pub use state::AppState;
