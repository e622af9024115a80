use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// A listening-service user (`users` dimension).
///
/// `level` is the subscription tier as written by the event log, usually
/// `"free"` or `"paid"`. The first row seen for a user wins; later events
/// with a different level do not update it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
}
