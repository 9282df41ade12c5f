pub mod error;
pub mod types;

pub use error::AppError;
pub use error::handler_404;
