pub mod mention;
pub mod modal;
pub mod notify;
pub mod store;
