//! Database access, one module per table.
//!
//! Functions take a `&PgPool` and return `sqlx::Error`; handlers decide what
//! a missing row means.

pub mod comments;
pub mod likes;
pub mod ranking;
pub mod topics;
pub mod users;

/// Author columns shared by the topic and comment projections.
pub(crate) const AUTHOR_COLUMNS: &str = "u.id AS author_id, u.first_name AS author_first_name, \
     u.last_name AS author_last_name, u.email AS author_email, u.image AS author_image";
