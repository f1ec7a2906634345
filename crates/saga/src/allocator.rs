//! Slug allocation with collision resolution.

use account_store::AccountRepository;
use chrono::Utc;
use common::BusinessId;
use domain::slugify;

/// Upper bound on numeric-suffix probes before the timestamp fallback.
pub const MAX_SUFFIX_PROBES: u32 = 100;

/// Turns a business name into a unique, URL-safe slug.
///
/// The allocator only *observes* availability through `slug_exists`; it
/// never reserves anything. Two concurrent callers can both see the
/// same slug as free — the unique constraint behind the business
/// profile insert is the real arbiter, and the coordinator's
/// retry-with-salt path resolves that race after the fact.
pub struct SlugAllocator<'a, R: AccountRepository> {
    repo: &'a R,
}

impl<'a, R: AccountRepository> SlugAllocator<'a, R> {
    /// Creates an allocator over the given repository.
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Allocates a slug for `business_name`.
    ///
    /// The normalized candidate is returned as-is when free. On
    /// collision, a pre-generated `business_id` supplies a composite
    /// `candidate-{id first segment}` that almost never collides,
    /// skipping the probe scan. Failing that, probes `candidate-1`,
    /// `candidate-2`, ... up to [`MAX_SUFFIX_PROBES`], then falls back
    /// to a millisecond timestamp suffix returned without a further
    /// existence check.
    pub async fn allocate(&self, business_name: &str, business_id: Option<BusinessId>) -> String {
        let candidate = slugify(business_name);

        if !self.taken(&candidate).await {
            return candidate;
        }

        if let Some(id) = business_id {
            let composite = format!("{candidate}-{}", id.short_token());
            if !self.taken(&composite).await {
                return composite;
            }
        }

        for n in 1..=MAX_SUFFIX_PROBES {
            let suffixed = format!("{candidate}-{n}");
            if !self.taken(&suffixed).await {
                return suffixed;
            }
        }

        // Best-effort terminal fallback: current time is assumed unique
        // enough at this volume.
        tracing::warn!(
            candidate,
            probes = MAX_SUFFIX_PROBES,
            "slug probe budget exhausted, falling back to timestamp suffix"
        );
        format!("{candidate}-{}", Utc::now().timestamp_millis())
    }

    /// A failing lookup must not block signup: errors are logged and
    /// the slug is treated as available. The insert constraint catches
    /// any collision this lets through.
    async fn taken(&self, slug: &str) -> bool {
        match self.repo.slug_exists(slug).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(slug, error = %e, "slug lookup failed, treating as available");
                false
            }
        }
    }
}
