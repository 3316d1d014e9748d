//! Account Repository Capability
//!
//! Persistence behind the [`AccountRepository`] trait. The default
//! implementation targets Postgres via sqlx and keeps the storage schema
//! flat (nullable columns); conversion to the lifecycle sum type happens
//! at this boundary.
//!
//! The trait promises per-record read-then-write semantics only. No
//! multi-statement transaction or compare-and-swap is provided; two
//! concurrent writers racing on the same account's reset code is an
//! accepted last-write-wins race.

use crate::error::AuthError;
use crate::models::{Account, AccountChanges, AccountStatus, AuthProvider, NewAccount, PendingReset};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Account persistence.
///
/// Finder names encode the predicate conjunctions the identity service
/// needs; "live" means not soft-deleted.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Account with this email that is not soft-deleted, any activation state.
    async fn find_live_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Soft-deleted account with this email.
    async fn find_deleted_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Active, not soft-deleted account with this email.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Inactive but not soft-deleted account with this email.
    async fn find_inactive_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Account matching email and activation code, regardless of state.
    async fn find_by_activation_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<Account>, AuthError>;

    /// Active, not soft-deleted account matching email and reset code.
    async fn find_active_by_reset_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<Account>, AuthError>;

    /// Insert a new account and return it with its assigned id.
    async fn insert(&self, account: NewAccount) -> Result<Account, AuthError>;

    /// Apply a partial update to an existing account and return the result.
    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<Account, AuthError>;
}

// ============================================
// Storage Row
// ============================================

/// Flat account row as stored in Postgres.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub provider: AuthProvider,
    pub is_active: bool,
    pub activation_code: Option<String>,
    pub reset_code: Option<String>,
    pub reset_expire: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        // Deletion wins over any other lifecycle marker.
        let status = if let Some(deleted_at) = row.deleted_at {
            AccountStatus::SoftDeleted { deleted_at }
        } else if row.is_active {
            AccountStatus::Active
        } else {
            AccountStatus::PendingActivation {
                activation_code: row.activation_code,
            }
        };

        // A reset code persisted without an expiry is treated as already
        // expired: consuming it still clears it and reports expiry.
        let pending_reset = row.reset_code.map(|code| PendingReset {
            code,
            expires_at: row.reset_expire.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        });

        Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            firstname: row.firstname,
            lastname: row.lastname,
            provider: row.provider,
            status,
            pending_reset,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Decompose a lifecycle status into its storage columns.
fn status_columns(
    status: &AccountStatus,
) -> (bool, Option<String>, Option<DateTime<Utc>>) {
    match status {
        AccountStatus::Active => (true, None, None),
        AccountStatus::PendingActivation { activation_code } => {
            (false, activation_code.clone(), None)
        }
        AccountStatus::SoftDeleted { deleted_at } => (false, None, Some(*deleted_at)),
    }
}

// ============================================
// Postgres Implementation
// ============================================

/// Postgres-backed account repository.
pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply the account schema migrations.
    pub async fn migrate(db: &PgPool) -> Result<(), AuthError> {
        tracing::info!("Running account schema migrations");

        sqlx::query(
            r#"
            DO $$ BEGIN
                CREATE TYPE auth_provider AS ENUM ('default', 'google', 'facebook');
            EXCEPTION
                WHEN duplicate_object THEN null;
            END $$;
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                firstname VARCHAR(100) NOT NULL,
                lastname VARCHAR(100) NOT NULL,
                provider auth_provider NOT NULL DEFAULT 'default',
                is_active BOOLEAN NOT NULL DEFAULT FALSE,
                activation_code VARCHAR(16),
                reset_code VARCHAR(16),
                reset_expire TIMESTAMPTZ,
                deleted_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        // Email uniqueness holds among live accounts only; soft-deleted
        // rows may share an email with a live successor.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_live_email
             ON accounts(email) WHERE deleted_at IS NULL;",
        )
        .execute(db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email);")
            .execute(db)
            .await?;

        tracing::info!("Account schema migrations completed");
        Ok(())
    }

    async fn find_one(
        &self,
        query: &str,
        email: &str,
        code: Option<&str>,
    ) -> Result<Option<Account>, AuthError> {
        let mut q = sqlx::query_as::<_, AccountRow>(query).bind(email);
        if let Some(code) = code {
            q = q.bind(code);
        }
        let row = q.fetch_optional(&self.db).await?;
        Ok(row.map(Account::from))
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_live_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        self.find_one(
            "SELECT * FROM accounts WHERE email = $1 AND deleted_at IS NULL",
            email,
            None,
        )
        .await
    }

    async fn find_deleted_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        self.find_one(
            "SELECT * FROM accounts WHERE email = $1 AND deleted_at IS NOT NULL",
            email,
            None,
        )
        .await
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        self.find_one(
            "SELECT * FROM accounts
             WHERE email = $1 AND is_active = TRUE AND deleted_at IS NULL",
            email,
            None,
        )
        .await
    }

    async fn find_inactive_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        self.find_one(
            "SELECT * FROM accounts
             WHERE email = $1 AND is_active = FALSE AND deleted_at IS NULL",
            email,
            None,
        )
        .await
    }

    async fn find_by_activation_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<Account>, AuthError> {
        self.find_one(
            "SELECT * FROM accounts WHERE email = $1 AND activation_code = $2",
            email,
            Some(code),
        )
        .await
    }

    async fn find_active_by_reset_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<Account>, AuthError> {
        self.find_one(
            "SELECT * FROM accounts
             WHERE email = $1 AND reset_code = $2
               AND is_active = TRUE AND deleted_at IS NULL",
            email,
            Some(code),
        )
        .await
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AuthError> {
        let (is_active, activation_code, deleted_at) = status_columns(&account.status);

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts
                (email, password_hash, firstname, lastname, provider,
                 is_active, activation_code, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.firstname)
        .bind(&account.lastname)
        .bind(account.provider)
        .bind(is_active)
        .bind(&activation_code)
        .bind(deleted_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<Account, AuthError> {
        // Read-then-write: fetch, apply the change set in memory, write the
        // full mutable column set back.
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut account = Account::from(row);
        changes.apply(&mut account, Utc::now());

        let (is_active, activation_code, deleted_at) = status_columns(&account.status);
        let (reset_code, reset_expire) = match &account.pending_reset {
            Some(reset) => (Some(reset.code.clone()), Some(reset.expires_at)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts SET
                firstname = $2,
                lastname = $3,
                password_hash = $4,
                provider = $5,
                is_active = $6,
                activation_code = $7,
                reset_code = $8,
                reset_expire = $9,
                deleted_at = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&account.firstname)
        .bind(&account.lastname)
        .bind(&account.password_hash)
        .bind(account.provider)
        .bind(is_active)
        .bind(&activation_code)
        .bind(&reset_code)
        .bind(reset_expire)
        .bind(deleted_at)
        .bind(account.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }
}
