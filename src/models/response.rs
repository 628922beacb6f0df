// src/models/response.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::pagination::Pagination;

/// `{ message, data }` envelope used by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<Empty> {
    /// A message with an empty `data` object.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, Empty {})
    }
}

/// List envelope: `{ message, data: [...], pagination }`.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub message: String,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            message: String::new(),
            data,
            pagination,
        }
    }
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct Empty {}

/// `data` of create endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct Created {
    pub id: uuid::Uuid,
}
