pub mod checkpoint;
pub mod error;
pub mod movie;

pub use error::SupportError as Error;
