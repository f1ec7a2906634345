//! Domain model for business account signup.
//!
//! Contains the signup request with its validation rules, the five
//! entities provisioned at signup (identity, business profile,
//! subscription, settings, branding), and slug normalization.

pub mod business;
pub mod error;
pub mod signup;
pub mod slug;

pub use business::{
    BrandPalette, BrandingConfig, BusinessProfile, DefaultMessages, Identity, NewIdentity,
    Settings, Subscription, SubscriptionStatus, TRIAL_PERIOD_DAYS,
};
pub use error::ValidationError;
pub use signup::SignupRequest;
pub use slug::slugify;
