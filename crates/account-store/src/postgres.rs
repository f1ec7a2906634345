use async_trait::async_trait;
use common::{BusinessId, IdentityId};
use domain::{BrandingConfig, BusinessProfile, NewIdentity, Settings, Subscription};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ConflictField, Result, StoreError};
use crate::repository::AccountRepository;

/// PostgreSQL-backed account repository.
///
/// Unique constraints on `business_profiles.slug` and
/// `business_profiles.email` are the system-wide source of truth for
/// uniqueness; violations are mapped to
/// [`StoreError::UniquenessConflict`] by constraint name, never by
/// message text. Passwords are hashed in-database with pgcrypto.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Creates a new PostgreSQL account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

fn map_business_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("business_profiles_slug_key") => {
                return StoreError::UniquenessConflict {
                    field: ConflictField::Slug,
                };
            }
            Some("business_profiles_email_key") => {
                return StoreError::UniquenessConflict {
                    field: ConflictField::Email,
                };
            }
            _ => {}
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create_identity(&self, identity: NewIdentity) -> Result<IdentityId> {
        let id = IdentityId::new();

        sqlx::query(
            r#"
            INSERT INTO identities (id, email, password_hash, display_name, business_name)
            VALUES ($1, $2, crypt($3, gen_salt('bf')), $4, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&identity.email)
        .bind(&identity.password)
        .bind(&identity.display_name)
        .bind(&identity.business_name)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("identities_email_key")
            {
                return StoreError::IdentityRejected(format!(
                    "email {} already registered",
                    identity.email
                ));
            }
            StoreError::Database(e)
        })?;

        Ok(id)
    }

    async fn delete_identity(&self, id: IdentityId) -> Result<()> {
        sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM business_profiles WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_has_business(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM business_profiles WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create_business_profile(&self, profile: BusinessProfile) -> Result<BusinessId> {
        sqlx::query(
            r#"
            INSERT INTO business_profiles
                (id, name, slug, owner_id, email, description, category,
                 website_url, phone, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.name)
        .bind(&profile.slug)
        .bind(profile.owner_id.as_uuid())
        .bind(&profile.email)
        .bind(&profile.description)
        .bind(&profile.category)
        .bind(&profile.website_url)
        .bind(&profile.phone)
        .bind(profile.is_active)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_business_insert_error)?;

        Ok(profile.id)
    }

    async fn delete_business_profile(&self, id: BusinessId) -> Result<()> {
        // Dependent rows go with it via ON DELETE CASCADE.
        sqlx::query("DELETE FROM business_profiles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, business_id, plan, status, trial_ends_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.business_id.as_uuid())
        .bind(&subscription.plan)
        .bind(subscription.status.as_str())
        .bind(subscription.trial_ends_at)
        .execute(&self.pool)
        .await?;

        Ok(subscription.id)
    }

    async fn create_settings(&self, settings: Settings) -> Result<Uuid> {
        let messages = serde_json::to_value(&settings.default_messages)?;

        sqlx::query(
            r#"
            INSERT INTO settings
                (id, business_id, communication_channels_enabled, ai_replies_enabled,
                 business_hours, default_messages, language, ai_personality)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(settings.id)
        .bind(settings.business_id.as_uuid())
        .bind(settings.communication_channels_enabled)
        .bind(settings.ai_replies_enabled)
        .bind(&settings.business_hours)
        .bind(messages)
        .bind(&settings.language)
        .bind(&settings.ai_personality)
        .execute(&self.pool)
        .await?;

        Ok(settings.id)
    }

    async fn create_branding(&self, branding: BrandingConfig) -> Result<Uuid> {
        let colors = serde_json::to_value(&branding.colors)?;

        sqlx::query(
            r#"
            INSERT INTO branding_configs (id, business_id, colors, font_family, logo_url)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(branding.id)
        .bind(branding.business_id.as_uuid())
        .bind(colors)
        .bind(&branding.font_family)
        .bind(&branding.logo_url)
        .execute(&self.pool)
        .await?;

        Ok(branding.id)
    }
}
