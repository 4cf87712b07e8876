//! List-query types shared by the catalog and order surfaces.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse from a query-parameter value. Unknown values sort ascending.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// Sortable fields of the product catalog.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    #[default]
    Id,
    Name,
    Description,
    Value,
    Weight,
    Image,
}

impl ProductSortField {
    /// Parse from a query-parameter value. Unknown fields sort by id.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "name" => Self::Name,
            "description" => Self::Description,
            "value" => Self::Value,
            "weight" => Self::Weight,
            "image" => Self::Image,
            _ => Self::Id,
        }
    }
}

/// Sortable fields of a user's order history.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortField {
    #[default]
    Id,
    ProductName,
    Status,
    CreatedAt,
    ArrivedAt,
}

impl OrderSortField {
    /// Parse from a query-parameter value. Unknown fields sort by id.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "product_name" => Self::ProductName,
            "shipped_status" => Self::Status,
            "created_at" => Self::CreatedAt,
            "arrived_at" => Self::ArrivedAt,
            _ => Self::Id,
        }
    }
}

/// How a search term matches against text fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Substring match anywhere in the field.
    #[default]
    Partial,
    /// Match at the start of the field only.
    Prefix,
}

/// A page request over a sortable, searchable collection.
///
/// `F` is the sort-field enum of the collection being listed. The page
/// returned is `[offset, offset + limit)` of the stable sort by
/// `(sort, order)`, with ties broken by original position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery<F> {
    pub sort: F,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
    /// Empty means no filtering.
    pub search: String,
    pub mode: SearchMode,
}

impl<F: Default> Default for ListQuery<F> {
    fn default() -> Self {
        Self {
            sort: F::default(),
            order: SortOrder::default(),
            offset: 0,
            limit: 20,
            search: String::new(),
            mode: SearchMode::default(),
        }
    }
}

impl<F> ListQuery<F> {
    /// Whether the query carries a search term.
    #[must_use]
    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }
}
