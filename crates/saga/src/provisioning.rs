//! Account provisioning saga constants.

/// The saga type identifier for account provisioning.
pub const SAGA_TYPE: &str = "AccountProvisioning";

/// Step name: create the identity record.
pub const STEP_CREATE_IDENTITY: &str = "create_identity";

/// Step name: create the business profile with its allocated slug.
pub const STEP_CREATE_BUSINESS: &str = "create_business_profile";

/// Step name: create the initial subscription (best-effort).
pub const STEP_CREATE_SUBSCRIPTION: &str = "create_subscription";

/// Step name: create default settings (best-effort).
pub const STEP_CREATE_SETTINGS: &str = "create_settings";

/// Step name: create default branding (best-effort).
pub const STEP_CREATE_BRANDING: &str = "create_branding";
