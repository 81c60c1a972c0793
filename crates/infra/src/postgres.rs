//! Postgres-backed stores (feature `postgres`).
//!
//! Enums are stored as TEXT and parsed through the domain `FromStr` impls so
//! the database never holds a status the code cannot represent. The
//! conditional status update is a single `UPDATE … WHERE status = expected`,
//! which is what closes the concurrent double-approval window.
//!
//! sqlx errors map to the domain taxonomy: unique violation (`23505`) →
//! `Conflict`, everything else → `Storage`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use mealbridge_core::{
    AdminAction, AuditLog, DomainError, DomainResult, Identity, NewUser, Profile, Role, User,
    UserDirectory, UserId, UserStatus,
};

const UNIQUE_VIOLATION: &str = "23505";

/// Create the schema if it does not exist yet.
pub async fn migrate(pool: &PgPool) -> DomainResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT,
            national_id TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            postal_code TEXT,
            latitude DOUBLE PRECISION,
            longitude DOUBLE PRECISION,
            role TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            approved_at TIMESTAMPTZ
        )
        "#,
        "CREATE INDEX IF NOT EXISTS users_created_at_idx ON users (created_at DESC)",
        r#"
        CREATE TABLE IF NOT EXISTS admin_actions (
            id UUID PRIMARY KEY,
            admin_id UUID NOT NULL,
            target_user_id UUID NOT NULL,
            action TEXT NOT NULL,
            details TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS admin_actions_target_idx
            ON admin_actions (target_user_id, created_at DESC)
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(storage_error)?;
    }

    Ok(())
}

fn storage_error(e: sqlx::Error) -> DomainError {
    DomainError::storage(e.to_string())
}

fn map_insert_error(e: sqlx::Error) -> DomainError {
    let is_unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false);

    if is_unique_violation {
        DomainError::conflict("user with this email already exists")
    } else {
        storage_error(e)
    }
}

fn user_from_row(row: &PgRow) -> DomainResult<User> {
    let role: String = row.try_get("role").map_err(storage_error)?;
    let status: String = row.try_get("status").map_err(storage_error)?;

    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage_error)?),
        email: row.try_get("email").map_err(storage_error)?,
        password_hash: row.try_get("password_hash").map_err(storage_error)?,
        first_name: row.try_get("first_name").map_err(storage_error)?,
        last_name: row.try_get("last_name").map_err(storage_error)?,
        profile: Profile {
            phone: row.try_get("phone").map_err(storage_error)?,
            national_id: row.try_get("national_id").map_err(storage_error)?,
            address: row.try_get("address").map_err(storage_error)?,
            city: row.try_get("city").map_err(storage_error)?,
            state: row.try_get("state").map_err(storage_error)?,
            postal_code: row.try_get("postal_code").map_err(storage_error)?,
            latitude: row.try_get("latitude").map_err(storage_error)?,
            longitude: row.try_get("longitude").map_err(storage_error)?,
        },
        role: role.parse()?,
        status: status.parse()?,
        created_at: row.try_get("created_at").map_err(storage_error)?,
        updated_at: row.try_get("updated_at").map_err(storage_error)?,
        approved_at: row.try_get("approved_at").map_err(storage_error)?,
    })
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, national_id, \
     address, city, state, postal_code, latitude, longitude, role, status, \
     created_at, updated_at, approved_at";

/// Postgres user store.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn create(&self, input: NewUser) -> DomainResult<User> {
        let id = UserId::new();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name,
                phone, national_id, address, city, state, postal_code,
                latitude, longitude, role, status,
                created_at, updated_at, approved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.profile.phone)
        .bind(&input.profile.national_id)
        .bind(&input.profile.address)
        .bind(&input.profile.city)
        .bind(&input.profile.state)
        .bind(&input.profile.postal_code)
        .bind(input.profile.latitude)
        .bind(input.profile.longitude)
        .bind(input.role.as_str())
        .bind(input.status.as_str())
        .bind(now)
        .bind(now)
        .bind(input.approved_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(User {
            id,
            email: input.email,
            password_hash: input.password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            profile: input.profile,
            role: input.role,
            status: input.status,
            created_at: now,
            updated_at: now,
            approved_at: input.approved_at,
        })
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_identity(&self, id: UserId) -> DomainResult<Option<Identity>> {
        let row = sqlx::query(
            "SELECT id, email, first_name, last_name, role, status FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else { return Ok(None) };

        let role: String = row.try_get("role").map_err(storage_error)?;
        let status: String = row.try_get("status").map_err(storage_error)?;

        Ok(Some(Identity {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(storage_error)?),
            email: row.try_get("email").map_err(storage_error)?,
            first_name: row.try_get("first_name").map_err(storage_error)?,
            last_name: row.try_get("last_name").map_err(storage_error)?,
            role: role.parse()?,
            status: status.parse()?,
        }))
    }

    async fn list_newest_first(&self) -> DomainResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn role_exists(&self, role: Role) -> DomainResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE role = $1) AS present")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        row.try_get("present").map_err(storage_error)
    }

    async fn transition_status(
        &self,
        id: UserId,
        expected: UserStatus,
        new_status: UserStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> DomainResult<User> {
        // Compare-and-swap: the WHERE clause re-checks the precondition inside
        // the write itself.
        let row = sqlx::query(&format!(
            "UPDATE users SET status = $3, approved_at = $4, updated_at = $5 \
             WHERE id = $1 AND status = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(new_status.as_str())
        .bind(approved_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(row) => user_from_row(&row),
            None => match self.find_by_id(id).await? {
                Some(user) => Err(DomainError::invalid_transition(format!(
                    "status is {}, expected {}",
                    user.status, expected
                ))),
                None => Err(DomainError::not_found("user")),
            },
        }
    }
}

/// Postgres audit trail.
#[derive(Clone)]
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn append(&self, action: AdminAction) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO admin_actions (id, admin_id, target_user_id, action, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(action.id.as_uuid())
        .bind(action.admin_id.as_uuid())
        .bind(action.target_user_id.as_uuid())
        .bind(&action.action)
        .bind(&action.details)
        .bind(action.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn for_target(&self, target: UserId) -> DomainResult<Vec<AdminAction>> {
        let rows = sqlx::query(
            "SELECT id, admin_id, target_user_id, action, details, created_at \
             FROM admin_actions WHERE target_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(target.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(AdminAction {
                    id: mealbridge_core::AdminActionId::from_uuid(
                        row.try_get::<Uuid, _>("id").map_err(storage_error)?,
                    ),
                    admin_id: UserId::from_uuid(
                        row.try_get::<Uuid, _>("admin_id").map_err(storage_error)?,
                    ),
                    target_user_id: UserId::from_uuid(
                        row.try_get::<Uuid, _>("target_user_id")
                            .map_err(storage_error)?,
                    ),
                    action: row.try_get("action").map_err(storage_error)?,
                    details: row.try_get("details").map_err(storage_error)?,
                    created_at: row.try_get("created_at").map_err(storage_error)?,
                })
            })
            .collect()
    }
}
