use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ProductError;

pub const TITLE_MAX_LEN: usize = 250;

/// A persisted product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.title, description),
            None => write!(f, "{}: None", self.title),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
}

impl NewProduct {
    /// Blank descriptions are stored as absent.
    pub fn from_form(form: &ProductForm) -> Result<Self, Vec<ProductError>> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(vec![ProductError::EmptyTitle]);
        }
        let len = title.chars().count();
        if len > TITLE_MAX_LEN {
            return Err(vec![ProductError::TitleTooLong(len)]);
        }

        let description = form
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            title: title.to_string(),
            description,
        })
    }
}

/// Narrows the product list: case-insensitive title search and exact id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub id: Option<i64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let id_ok = self.id.map_or(true, |id| product.id == id);
        let search_ok = self.search.as_deref().map_or(true, |needle| {
            product.title.to_lowercase().contains(&needle.to_lowercase())
        });
        id_ok && search_ok
    }
}
