//! Ownership predicates.
//!
//! Every mutating handler runs one of these checks after authentication and
//! after fetching the resource's current owner from storage, and strictly
//! before any write. Defining the rule once here (instead of re-deriving it
//! in each handler) keeps the comparison and its error mapping in one
//! unit-tested place.

use crate::errors::ApiError;

/// ensure_owner
///
/// Permits the operation only when the authenticated principal is the
/// recorded owner of the resource.
pub fn ensure_owner(requester_id: i64, owner_id: i64, denial: &'static str) -> Result<(), ApiError> {
    if requester_id == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(denial))
    }
}

/// ensure_not_self
///
/// The inverse guard used by follow/unfollow: a principal may not target
/// itself. Same validate-before-mutate placement as `ensure_owner`.
pub fn ensure_not_self(
    requester_id: i64,
    target_id: i64,
    denial: &'static str,
) -> Result<(), ApiError> {
    if requester_id == target_id {
        Err(ApiError::Forbidden(denial))
    } else {
        Ok(())
    }
}
