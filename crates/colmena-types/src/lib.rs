pub mod api;
pub mod catalog;
pub mod device;
pub mod models;
