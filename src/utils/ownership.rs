// src/utils/ownership.rs

use uuid::Uuid;

use crate::error::AppError;

/// A row whose mutation rights belong to a single user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;

    /// Human name used in the 403 message ("topic", "comment").
    fn kind(&self) -> &'static str;
}

/// Owner-only actions, named the way they appear in the 403 message.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// The single authorization policy: the actor must be the resource's owner.
pub fn ensure_owner<R: Owned>(actor_id: Uuid, resource: &R, action: Action) -> Result<(), AppError> {
    if resource.owner_id() == actor_id {
        return Ok(());
    }

    tracing::debug!(
        actor = %actor_id,
        owner = %resource.owner_id(),
        "Ownership check failed for {} {}",
        action.verb(),
        resource.kind()
    );

    Err(AppError::Forbidden(format!(
        "You are not allowed to {} this {}",
        action.verb(),
        resource.kind()
    )))
}
