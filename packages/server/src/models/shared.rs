use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Common page/per_page query parameters for list endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PageQuery {
    /// Clamp to sane bounds: page >= 1, 1 <= per_page <= 100.
    pub fn clamped(&self) -> (u64, u64) {
        let page = Ord::max(self.page.unwrap_or(1), 1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page)
    }
}

/// Validate a non-negative counter field.
pub fn validate_non_negative(value: i64, name: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::Validation(format!("{name} must be >= 0")));
    }
    Ok(())
}
