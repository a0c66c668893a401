pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod states;
pub mod store;

#[cfg(test)]
mod tests;

pub use errors::{AppError, WriteError};
pub use models::{DocumentRef, Fields};
pub use services::write_service::WriteService;
pub use states::{ProcessState, StateTracker, StatesService};
pub use store::{DocumentStore, StoreError};
