pub mod handlers;
pub mod report;
pub mod state;

pub use handlers::{ApiError, router};
pub use state::{AppState, Sources};
