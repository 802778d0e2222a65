mod extract;
pub mod public;
pub mod routes;
mod server;
mod state;
mod templates;

pub use extract::SESSION_COOKIE;
pub use server::{app, serve};
pub use state::AppState;
