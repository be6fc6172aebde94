pub mod account;
pub mod assessment;
