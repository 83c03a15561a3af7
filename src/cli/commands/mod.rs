pub mod certificate;
pub mod health;
pub mod migrate;
pub mod user;
