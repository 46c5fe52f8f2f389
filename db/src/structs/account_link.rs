use chrono::{DateTime, Utc};
use serenity::model::id::UserId;

/// A discord user linked to an iracing account. The customer id is resolved
/// once at link time via the lookup endpoint and cached here; it stays NULL
/// if the name could not be resolved.
#[derive(Debug, Clone)]
pub struct AccountLink {
    pub user: u64,
    pub username: String,
    pub customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl AccountLink {
    #[inline(always)]
    pub const fn user_id(&self) -> UserId {
        UserId(self.user)
    }
}
