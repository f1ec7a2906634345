//! Entities created by the provisioning workflow.
//!
//! All five entities are created once, at signup. The business profile
//! is the aggregate root; subscription, settings, and branding hang off
//! its id. None of them are mutated by this subsystem after creation.

use chrono::{DateTime, Duration, Utc};
use common::{BusinessId, IdentityId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signup::SignupRequest;

/// Trial length granted to the free plan.
pub const TRIAL_PERIOD_DAYS: i64 = 14;

/// Request to create an identity record with the identity provider.
///
/// The password is forwarded verbatim; hashing is owned by the
/// provider, never by this subsystem.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub business_name: String,
}

impl NewIdentity {
    /// Builds the identity-creation request from a signup request,
    /// carrying owner and business names as profile metadata.
    pub fn from_signup(request: &SignupRequest) -> Self {
        Self {
            email: request.email.trim().to_string(),
            password: request.password.clone(),
            display_name: request.owner_name.trim().to_string(),
            business_name: request.business_name.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewIdentity")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("business_name", &self.business_name)
            .finish()
    }
}

/// An identity record as seen by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub display_name: String,
}

/// The aggregate root created at signup.
///
/// `slug` and `email` are unique system-wide; `slug` is immutable once
/// assigned. `owner_id` must reference an existing identity at creation
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: BusinessId,
    pub name: String,
    pub slug: String,
    pub owner_id: IdentityId,
    pub email: String,
    pub description: String,
    pub category: String,
    pub website_url: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    /// Builds a new active profile from the signup request, with a
    /// pre-generated id and an already-allocated slug.
    pub fn from_signup(
        id: BusinessId,
        slug: String,
        owner_id: IdentityId,
        request: &SignupRequest,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: request.business_name.trim().to_string(),
            slug,
            owner_id,
            email: request.email.trim().to_string(),
            description: request.business_description.clone(),
            category: request.category.clone(),
            website_url: request.website_url.clone(),
            phone: request.phone.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Pending,
    Active,
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns the status name as stored in the repository.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subscription record attached to a business profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub business_id: BusinessId,
    pub plan: String,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Builds the initial subscription for a plan.
    ///
    /// The free plan starts a trial ending [`TRIAL_PERIOD_DAYS`] out;
    /// paid plans start pending until billing activates them elsewhere.
    pub fn for_plan(business_id: BusinessId, plan_id: &str) -> Self {
        let (status, trial_ends_at) = if plan_id == "free" {
            (
                SubscriptionStatus::Trial,
                Some(Utc::now() + Duration::days(TRIAL_PERIOD_DAYS)),
            )
        } else {
            (SubscriptionStatus::Pending, None)
        };

        Self {
            id: Uuid::new_v4(),
            business_id,
            plan: plan_id.to_string(),
            status,
            trial_ends_at,
        }
    }
}

/// Canned reply texts used before the owner customizes anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultMessages {
    pub greeting: String,
    pub away: String,
}

impl Default for DefaultMessages {
    fn default() -> Self {
        Self {
            greeting: "Hi! Thanks for reaching out. How can we help you today?".to_string(),
            away: "We're currently closed. Leave us a message and we'll get back to you."
                .to_string(),
        }
    }
}

/// Per-business operational settings, one-to-one with the profile.
///
/// Optional at the consistency level: absence is tolerated and creation
/// is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub id: Uuid,
    pub business_id: BusinessId,
    pub communication_channels_enabled: bool,
    pub ai_replies_enabled: bool,
    pub business_hours: String,
    pub default_messages: DefaultMessages,
    pub language: String,
    pub ai_personality: String,
}

impl Settings {
    /// Fixed defaults applied at signup: channels disabled, AI replies
    /// enabled, English, professional tone, placeholder hours.
    pub fn defaults(business_id: BusinessId) -> Self {
        Self {
            id: Uuid::new_v4(),
            business_id,
            communication_channels_enabled: false,
            ai_replies_enabled: true,
            business_hours: "Mon-Sun 09:00-22:00".to_string(),
            default_messages: DefaultMessages::default(),
            language: "en".to_string(),
            ai_personality: "professional".to_string(),
        }
    }
}

/// Brand color palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandPalette {
    pub primary: String,
    pub secondary: String,
    pub background: String,
}

impl Default for BrandPalette {
    fn default() -> Self {
        Self {
            primary: "#1f2937".to_string(),
            secondary: "#f59e0b".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

/// Branding configuration, one-to-one with the profile. Best-effort at
/// signup, same tolerance as [`Settings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    pub id: Uuid,
    pub business_id: BusinessId,
    pub colors: BrandPalette,
    pub font_family: String,
    pub logo_url: Option<String>,
}

impl BrandingConfig {
    /// Fixed default palette and font applied at signup.
    pub fn defaults(business_id: BusinessId) -> Self {
        Self {
            id: Uuid::new_v4(),
            business_id,
            colors: BrandPalette::default(),
            font_family: "Inter".to_string(),
            logo_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::SignupRequest;

    fn request() -> SignupRequest {
        SignupRequest {
            business_name: "Joe's Pizza".to_string(),
            business_description: "Wood-fired pizza".to_string(),
            website_url: Some("https://joes.example".to_string()),
            owner_name: "Joe".to_string(),
            email: "joe@x.com".to_string(),
            phone: None,
            password: "p@ssW0rd1".to_string(),
            category: "restaurant".to_string(),
            plan_id: "free".to_string(),
        }
    }

    #[test]
    fn new_identity_redacts_password_in_debug() {
        let identity = NewIdentity::from_signup(&request());
        let debug = format!("{identity:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("p@ssW0rd1"));
    }

    #[test]
    fn business_profile_is_active_on_creation() {
        let profile = BusinessProfile::from_signup(
            BusinessId::new(),
            "joes-pizza".to_string(),
            IdentityId::new(),
            &request(),
        );
        assert!(profile.is_active);
        assert_eq!(profile.slug, "joes-pizza");
        assert_eq!(profile.email, "joe@x.com");
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn free_plan_starts_trial_with_end_date() {
        let before = Utc::now();
        let sub = Subscription::for_plan(BusinessId::new(), "free");
        let after = Utc::now();

        assert_eq!(sub.status, SubscriptionStatus::Trial);
        let ends = sub.trial_ends_at.unwrap();
        assert!(ends >= before + Duration::days(TRIAL_PERIOD_DAYS));
        assert!(ends <= after + Duration::days(TRIAL_PERIOD_DAYS));
    }

    #[test]
    fn paid_plan_starts_pending_without_trial() {
        let sub = Subscription::for_plan(BusinessId::new(), "pro");
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert!(sub.trial_ends_at.is_none());
        assert_eq!(sub.plan, "pro");
    }

    #[test]
    fn settings_defaults_match_signup_policy() {
        let settings = Settings::defaults(BusinessId::new());
        assert!(!settings.communication_channels_enabled);
        assert!(settings.ai_replies_enabled);
        assert_eq!(settings.language, "en");
        assert_eq!(settings.ai_personality, "professional");
    }

    #[test]
    fn branding_defaults_have_no_logo() {
        let branding = BrandingConfig::defaults(BusinessId::new());
        assert!(branding.logo_url.is_none());
        assert_eq!(branding.font_family, "Inter");
    }

    #[test]
    fn subscription_status_serializes_snake_case() {
        let json = serde_json::to_string(&SubscriptionStatus::Trial).unwrap();
        assert_eq!(json, "\"trial\"");
    }
}
