// handlers/protected/mod.rs - endpoints behind the session middleware
//
// Route prefix: /api/*
// Every role may read; creating, editing and deleting needs operator or admin.

pub mod auth;
pub mod boards;
pub mod certificates;
pub mod commissions;
pub mod institutions;
pub mod officers;
pub mod places;
pub mod reports;
pub mod roles;
