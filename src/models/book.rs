//! Book (catalog entry) model and related types

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A catalog entry with its copy counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Caller-supplied identifier (ISBN or internal code)
    pub id: String,
    pub title: String,
    pub author: String,
    pub categories: Vec<String>,
    pub total_copies: u32,
    /// Always within `0..=total_copies`
    pub available_copies: u32,
}

impl Book {
    /// Case-insensitive substring match against title, author or any category
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.author.to_lowercase().contains(needle_lowercase)
            || self
                .categories
                .iter()
                .any(|c| c.to_lowercase().contains(needle_lowercase))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.to_lowercase() == category.to_lowercase())
    }
}

/// Add book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Book id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Either a list or a comma-separated string
    #[serde(default, deserialize_with = "deserialize_categories")]
    #[schema(value_type = Vec<String>)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub total_copies: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesInput {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = match Option::<CategoriesInput>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(CategoriesInput::List(list)) => list,
        Some(CategoriesInput::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(raw
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect())
}

/// Catalog listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Text matched against title, author and categories
    pub search: Option<String>,
    /// Exact category label (case-insensitive)
    pub category: Option<String>,
}
