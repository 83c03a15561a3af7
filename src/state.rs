use std::sync::Arc;

use sqlx::PgPool;

use crate::mailer::Mailer;
use crate::services::{AccountLookup, UserService};

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub mailer: Arc<dyn Mailer>,
    pub accounts: Arc<dyn AccountLookup>,
}

impl AppState {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            accounts: Arc::new(UserService::new(pool.clone())),
            pool,
            mailer,
        }
    }

    pub fn with_accounts(mut self, accounts: Arc<dyn AccountLookup>) -> Self {
        self.accounts = accounts;
        self
    }
}
