pub mod enums;
pub mod insights;
pub mod lab;
pub mod scan;

pub use enums::*;
pub use insights::*;
pub use lab::*;
pub use scan::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
