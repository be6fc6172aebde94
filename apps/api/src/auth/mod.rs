pub mod handlers;
pub mod password;
pub mod service;
pub mod store;
pub mod token;
