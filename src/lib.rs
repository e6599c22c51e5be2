// Report Card RAG - corpus tooling, agent definitions and admin UI for student report card analysis

pub mod agents;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod models;
pub mod routes;
pub mod tools;
pub mod types;
pub mod utils;
pub mod vertex;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
