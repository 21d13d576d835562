//! Engine configuration.
//!
//! All parameters default to the values the scoring scheme was designed around, so most
//! deployments only set `log_events`:
//! - [`VOTE_UNIT`]: 432.0 score points per net approval vote. One day is 86 400 seconds, so 200
//!   approval votes keep a post at the head of the recency-weighted ranking for one extra day.
//! - [`VOTING_WINDOW`]: one week from a target's creation, after which votes are rejected.
//! - [`INTERSECTION_CACHE_TTL`]: 60 seconds, bounding how stale a community-scoped ranking may
//!   be.

use std::time::Duration;

use typed_builder::TypedBuilder;

/// Score increment per one unit of vote transition.
pub const VOTE_UNIT: f64 = 432.0;

/// How long a target stays open for voting after creation.
pub const VOTING_WINDOW: Duration = Duration::from_secs(7 * 24 * 3600);

/// How long a computed community intersection may be served before being recomputed.
pub const INTERSECTION_CACHE_TTL: Duration = Duration::from_secs(60);

/// Stores the user-defined parameters of the engine.
///
/// ## Log Events
///
/// The engine logs through the [log](https://docs.rs/log/latest/log/) crate. To get these
/// messages printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. Every setter has a default; call
    `.build()` directly for the standard scoring scheme.
"))]
pub struct Configuration {
    #[builder(default = VOTE_UNIT, setter(doc = "Set the score increment per vote unit. Defaults to 432."))]
    pub vote_unit: f64,
    #[builder(default = VOTING_WINDOW, setter(doc = "Set how long after creation a target accepts votes. Defaults to one week."))]
    pub voting_window: Duration,
    #[builder(default = INTERSECTION_CACHE_TTL, setter(doc = "Set the TTL of cached community intersections. Zero disables caching. Defaults to 60 seconds."))]
    pub intersection_cache_ttl: Duration,
    #[builder(default = false, setter(doc = "Enable CSV event logging? Defaults to false."))]
    pub log_events: bool,
}
