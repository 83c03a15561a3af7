// handlers/public/mod.rs - endpoints that need no session
//
// Route prefix: none (/, /health, /auth/*, /certificates/verify/:code)

pub mod auth;
pub mod certificates;
pub mod root;

pub use auth::{login, logout};
pub use certificates::verify;
pub use root::{health, root};
