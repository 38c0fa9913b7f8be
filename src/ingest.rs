//! Ingestion job: repopulates the `resource` table from the facilities API.
//!
//! A run deletes every existing row, then walks each configured state and
//! facility-type mapping in order, paging through the API until a page comes
//! back empty or without a `next` link. Rows for one (state, type) pair are
//! committed together once its pages are exhausted.
//!
//! A failed page (non-200, transport error, bad JSON) is logged and ends only
//! the current pair; rows from its earlier pages are kept and the run moves
//! on. Database errors abort the run.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use std::time::Duration;

use crate::config::{Config, FacilityMapping, IngestConfig};
use crate::db;
use crate::directory;
use crate::facilities::{FacilitiesClient, PageFetch};
use crate::migrate;
use crate::models::{Category, NewResource};
use crate::states;

/// Outcome of one (state, facility type) pair.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub state: String,
    pub facility_type: String,
    pub category: Category,
    /// Pages that returned `200 OK`.
    pub pages: u32,
    pub rows: u64,
    /// Why paging stopped early, if it did.
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub deleted: u64,
    pub pairs: Vec<PairReport>,
}

impl IngestReport {
    pub fn total_rows(&self) -> u64 {
        self.pairs.iter().map(|p| p.rows).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PairReport> {
        self.pairs.iter().filter(|p| p.failure.is_some())
    }
}

/// CLI entry point for `pathways ingest`.
///
/// `only_states` narrows the run to the given codes; empty means the
/// configured list (all 50 by default).
pub async fn run_ingest(config: &Config, only_states: Vec<String>) -> Result<()> {
    let mut ingest_config = config.ingest.clone();
    if !only_states.is_empty() {
        for code in &only_states {
            if states::state_name(code).is_none() {
                bail!("Unknown state code: '{}'", code);
            }
        }
        ingest_config.states = only_states;
    }

    let pool = db::connect(&config.db).await?;
    migrate::ensure_schema(&pool).await?;

    let client = FacilitiesClient::from_config(&ingest_config)?;
    let report = ingest_resources(&pool, &client, &ingest_config).await?;
    let stored = directory::count_resources(&pool).await?;
    pool.close().await;

    println!("ingest");
    println!("  cleared rows: {}", report.deleted);
    println!("  pairs fetched: {}", report.pairs.len());
    println!("  rows inserted: {}", report.total_rows());
    let failures: Vec<&PairReport> = report.failures().collect();
    if !failures.is_empty() {
        println!("  failed pairs: {}", failures.len());
        for pair in failures {
            println!(
                "    {} [{}]: {}",
                pair.state,
                pair.category,
                pair.failure.as_deref().unwrap_or_default()
            );
        }
    }
    println!("  resources stored: {}", stored);
    println!("ok");

    Ok(())
}

/// Replace the table contents with a fresh pull from the facilities API.
pub async fn ingest_resources(
    pool: &SqlitePool,
    client: &FacilitiesClient,
    config: &IngestConfig,
) -> Result<IngestReport> {
    let deleted = clear_resources(pool).await?;
    tracing::info!(deleted, "cleared existing resources");

    let delay = Duration::from_millis(config.request_delay_ms);
    let mut report = IngestReport {
        deleted,
        pairs: Vec::new(),
    };

    for state in config.state_list() {
        tracing::info!(%state, "processing state");
        for mapping in &config.mappings {
            let pair = ingest_pair(pool, client, &state, mapping, delay).await?;
            report.pairs.push(pair);
        }
    }

    Ok(report)
}

async fn ingest_pair(
    pool: &SqlitePool,
    client: &FacilitiesClient,
    state: &str,
    mapping: &FacilityMapping,
    delay: Duration,
) -> Result<PairReport> {
    let mut pair = PairReport {
        state: state.to_string(),
        facility_type: mapping.facility_type.clone(),
        category: mapping.category,
        pages: 0,
        rows: 0,
        failure: None,
    };
    let mut batch: Vec<NewResource> = Vec::new();
    let mut page_number: u32 = 1;

    loop {
        tokio::time::sleep(delay).await;

        let page = match client
            .fetch_page(state, &mapping.facility_type, page_number)
            .await
        {
            Ok(PageFetch::Page(page)) => page,
            Ok(PageFetch::Status(status)) => {
                tracing::warn!(
                    %state,
                    category = %mapping.category,
                    status = status.as_u16(),
                    page = page_number,
                    "facilities request failed"
                );
                pair.failure = Some(format!("status {} on page {}", status, page_number));
                break;
            }
            Err(e) => {
                tracing::warn!(
                    %state,
                    category = %mapping.category,
                    error = %format!("{:#}", e),
                    page = page_number,
                    "facilities request failed"
                );
                pair.failure = Some(format!("{:#} on page {}", e, page_number));
                break;
            }
        };

        pair.pages += 1;
        if page.data.is_empty() {
            break;
        }

        let has_next = page.has_next();
        batch.extend(
            page.data
                .into_iter()
                .map(|facility| facility.into_resource(mapping.category)),
        );

        if !has_next {
            break;
        }
        page_number += 1;
    }

    pair.rows = insert_resources(pool, &batch).await?;
    tracing::info!(
        %state,
        category = %mapping.category,
        facilities = pair.rows,
        "finished fetching"
    );

    Ok(pair)
}

/// Delete every resource row. Returns the number of rows removed.
pub async fn clear_resources(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM resource").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Insert `resources` in a single transaction.
pub async fn insert_resources(pool: &SqlitePool, resources: &[NewResource]) -> Result<u64> {
    let mut tx = pool.begin().await?;

    for resource in resources {
        sqlx::query(
            "INSERT INTO resource (name, category, description, website, phone, address) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&resource.name)
        .bind(resource.category.label())
        .bind(&resource.description)
        .bind(&resource.website)
        .bind(&resource.phone)
        .bind(&resource.address)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(resources.len() as u64)
}
