//! JSON response envelope shared by every API route.
//!
//! All responses have the shape `{ "success": bool, "data": ..., "message": ... }`
//! so the storefront SPA can handle them uniformly. Errors use the same shape
//! with an `error` field instead of `data` (see [`crate::error::AppError`]).

use serde::Serialize;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload in the success envelope.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Wrap a payload with a human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope that carries only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: i64,
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Build pagination metadata from a page request and the total row count.
    #[must_use]
    pub fn new(page: u32, per_page: u32, total_items: i64) -> Self {
        let per = u64::from(per_page.max(1));
        let total = u64::try_from(total_items).unwrap_or(0);
        let total_pages = u32::try_from(total.div_ceil(per)).unwrap_or(u32::MAX);
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: per_page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Success envelope for paginated lists.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub const fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_counts_pages() {
        let p = Pagination::new(1, 12, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn pagination_last_page() {
        let p = Pagination::new(3, 12, 25);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn pagination_empty_result() {
        let p = Pagination::new(1, 12, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
    }

    #[test]
    fn pagination_exact_multiple() {
        let p = Pagination::new(2, 12, 24);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn pagination_negative_total_treated_as_empty() {
        let p = Pagination::new(1, 12, -5);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let p = Pagination::new(2, 12, 40);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["itemsPerPage"], 12);
        assert_eq!(json["hasPrevPage"], true);
    }
}
