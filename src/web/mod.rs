pub mod admins;
pub mod auth;
pub mod backup;
pub mod error;
pub mod extract;
pub mod forms;
pub mod responses;
pub mod router;
pub mod state;
pub mod uploads;
pub mod validation;

pub use state::AppState;
