pub mod config;
pub mod form;
pub mod note;

pub use config::*;
pub use form::*;
pub use note::*;
