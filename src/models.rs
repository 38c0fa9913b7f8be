//! Core data models used throughout Patriot Pathways.
//!
//! These types represent the resource rows written by the ingestion job and
//! read back by the directory listings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Support domain a resource belongs to.
///
/// The [`label`](Category::label) is what gets stored in the `category`
/// column, so the ingestion job and the listing queries must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Healthcare,
    Employment,
    Housing,
    #[serde(rename = "Mental Health")]
    MentalHealth,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Healthcare,
        Category::Employment,
        Category::Housing,
        Category::MentalHealth,
    ];

    /// Label stored in the database and shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Category::Healthcare => "Healthcare",
            Category::Employment => "Employment",
            Category::Housing => "Housing",
            Category::MentalHealth => "Mental Health",
        }
    }

    /// URL path segment used by `GET /{state}/{category}`.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Healthcare => "healthcare",
            Category::Employment => "employment",
            Category::Housing => "housing",
            Category::MentalHealth => "mental-health",
        }
    }

    /// Resolve a URL slug, ignoring ASCII case.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resource row as stored in SQLite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A resource that has not been inserted yet (no id assigned).
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
