pub mod auth;
pub mod issue;
