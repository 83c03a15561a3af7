//! Fixtures for service tests that need a real database.
//!
//! `TestContext::connect` returns `None` when `DATABASE_URL` is unset or the
//! server cannot be reached, and callers return early. Every fixture gets a
//! unique suffix so tests can share one database and run in parallel.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::{
    Board, BoardInput, BoardType, NewUser, OfficerInput, OfficerPosition, Place, PlaceInput, PlaceKind, User,
};
use crate::database::DatabaseManager;
use crate::services::{BoardService, PlaceService, UserService};

/// Department, province and municipality created together
pub struct TestPlaces {
    pub department: Place,
    pub province: Place,
    pub municipality: Place,
}

pub struct TestContext {
    pub pool: PgPool,
}

impl TestContext {
    pub async fn connect() -> Option<Self> {
        let _ = dotenvy::dotenv();
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = match PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("skipping database test, cannot connect: {}", e);
                return None;
            }
        };
        DatabaseManager::migrate(&pool).await.expect("migrations apply to the test database");
        Some(Self { pool })
    }

    pub fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
    }

    pub async fn user(&self, role: Role) -> User {
        let (user, _) = UserService::new(self.pool.clone())
            .create(NewUser {
                name: "Usuario de Prueba".into(),
                email: format!("{}@example.org", Self::unique("prueba")),
                role,
                password: Some("Clave2024segura".into()),
            })
            .await
            .expect("create user");
        user
    }

    pub async fn place(&self, kind: PlaceKind, parent_id: Option<Uuid>) -> Place {
        PlaceService::new(self.pool.clone())
            .create(PlaceInput {
                name: Self::unique(kind.as_str()),
                kind,
                code: None,
                parent_id,
            })
            .await
            .expect("create place")
    }

    pub async fn places(&self) -> TestPlaces {
        let department = self.place(PlaceKind::Department, None).await;
        let province = self.place(PlaceKind::Province, Some(department.id)).await;
        let municipality = self.place(PlaceKind::Municipality, Some(province.id)).await;
        TestPlaces { department, province, municipality }
    }

    pub fn board_input(place_id: Uuid) -> BoardInput {
        BoardInput {
            name: Self::unique("JAC"),
            board_type: BoardType::Communal,
            registration_number: Self::unique("REG"),
            resolution_number: None,
            registered_on: None,
            address: None,
            email: None,
            phone: None,
            place_id,
            institution_id: None,
            period_start: None,
            period_end: None,
        }
    }

    pub async fn board(&self, place_id: Uuid) -> Board {
        BoardService::new(self.pool.clone())
            .create(Self::board_input(place_id))
            .await
            .expect("create board")
    }

    pub fn officer_input(document_number: &str, position: OfficerPosition) -> OfficerInput {
        OfficerInput {
            full_name: format!("Dignatario {}", document_number),
            document_number: document_number.into(),
            position,
            commission_id: None,
            phone: None,
            email: None,
            period_start: None,
            period_end: None,
            active: true,
        }
    }
}
