pub mod admin;
pub mod portfolio;
pub mod public;
pub mod trader;
