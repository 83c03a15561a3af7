// handlers/elevated/mod.rs - admin-only endpoints
//
// Route prefix: /api/users/*, /api/admin/*
// Layered with require_roles(Role::ADMINS) after the session middleware.

pub mod logs;
pub mod users;
