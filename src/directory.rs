//! State-filtered resource listings.
//!
//! Backs `GET /{state_code}/{category_name}` and the `pathways list` command.
//!
//! A resource belongs to a state only through its free-text address: the
//! listing keeps rows whose address contains `", <ST> "`. Rows with a missing
//! or oddly formatted address never show up under any state.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::models::{Category, Resource};
use crate::states;

/// Label shown when the category slug is not one of the four known ones.
pub const CATEGORY_NOT_FOUND: &str = "Category Not Found";

/// Result of a category-for-state lookup, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category_label: String,
    pub state_name: String,
    pub resources: Vec<Resource>,
}

/// The substring an address must contain to count as being in `state_code`.
pub fn address_pattern(state_code: &str) -> String {
    format!(", {} ", state_code.to_uppercase())
}

/// Resolve the display labels and load the matching resources.
///
/// Unknown categories are not an error: they produce an empty listing
/// labelled [`CATEGORY_NOT_FOUND`] without touching the store. Unknown state
/// codes still run the query, which cannot match anything real.
pub async fn list_category(
    pool: &SqlitePool,
    state_code: &str,
    category_name: &str,
) -> Result<CategoryListing> {
    let state_name = states::state_name(state_code)
        .unwrap_or(states::UNKNOWN_STATE_LABEL)
        .to_string();

    let Some(category) = Category::from_slug(category_name) else {
        return Ok(CategoryListing {
            category_label: CATEGORY_NOT_FOUND.to_string(),
            state_name,
            resources: Vec::new(),
        });
    };

    let resources = resources_in_state(pool, category, state_code).await?;

    Ok(CategoryListing {
        category_label: category.label().to_string(),
        state_name,
        resources,
    })
}

/// All resources of `category` whose address names `state_code`, by name.
pub async fn resources_in_state(
    pool: &SqlitePool,
    category: Category,
    state_code: &str,
) -> Result<Vec<Resource>> {
    // instr() keeps the match literal; LIKE would treat `_` and `%` in a
    // user-supplied state code as wildcards.
    let rows = sqlx::query(
        r#"
        SELECT id, name, category, description, website, phone, address
        FROM resource
        WHERE category = ? AND instr(address, ?) > 0
        ORDER BY name ASC, id ASC
        "#,
    )
    .bind(category.label())
    .bind(address_pattern(state_code))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Resource {
            id: row.get("id"),
            name: row.get("name"),
            category: row.get("category"),
            description: row.get("description"),
            website: row.get("website"),
            phone: row.get("phone"),
            address: row.get("address"),
        })
        .collect())
}

/// Total number of stored resources.
pub async fn count_resources(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resource")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// CLI entry point: prints one category listing.
pub async fn run_list(config: &Config, state_code: &str, category_name: &str) -> Result<()> {
    let pool = db::connect(&config.db).await?;
    let listing = list_category(&pool, state_code, category_name).await?;
    pool.close().await;

    println!("{} in {}", listing.category_label, listing.state_name);
    if listing.resources.is_empty() {
        println!("No resources found.");
        return Ok(());
    }

    for resource in &listing.resources {
        println!();
        println!("{}", resource.name);
        println!("  {}", resource.description);
        if let Some(ref address) = resource.address {
            println!("  address: {}", address);
        }
        if let Some(ref phone) = resource.phone {
            println!("  phone:   {}", phone);
        }
        if let Some(website) = resource.website.as_deref().filter(|w| !w.is_empty()) {
            println!("  website: {}", website);
        }
    }
    println!();
    println!("{} resource(s)", listing.resources.len());

    Ok(())
}
