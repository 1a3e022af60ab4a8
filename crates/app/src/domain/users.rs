//! Users
//!
//! Accounts live outside this crate; records here only ever refer to a user by id.

use crate::ids::TypedId;

/// Marker for user identifiers.
#[derive(Debug)]
pub struct UserRecord;

/// User ID
pub type UserId = TypedId<UserRecord>;
