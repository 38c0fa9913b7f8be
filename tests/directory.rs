//! Listing semantics for `GET /{state}/{category}` against a real SQLite file.

use patriot_pathways::config::Config;
use patriot_pathways::directory::{list_category, CATEGORY_NOT_FOUND};
use patriot_pathways::ingest::insert_resources;
use patriot_pathways::models::{Category, NewResource};
use patriot_pathways::{db, migrate};
use sqlx::SqlitePool;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Config {
    let config_content = format!(
        r#"[db]
path = "{}"
"#,
        tmp.path().join("resources.db").display()
    );
    toml::from_str(&config_content).unwrap()
}

fn resource(name: &str, category: Category, address: Option<&str>) -> NewResource {
    NewResource {
        name: name.to_string(),
        category,
        description: "Facility Type: test".to_string(),
        website: Some(String::new()),
        phone: Some("N/A".to_string()),
        address: address.map(str::to_string),
    }
}

async fn seeded_pool(tmp: &TempDir) -> SqlitePool {
    let cfg = test_config(tmp);
    migrate::run_migrations(&cfg).await.unwrap();
    let pool = db::connect(&cfg.db).await.unwrap();

    insert_resources(
        &pool,
        &[
            resource("Waco VA Clinic", Category::Healthcare, Some("4800 Memorial Drive, Waco, TX 76711")),
            resource("Austin VA Clinic", Category::Healthcare, Some("7901 Metropolis Drive, Austin, TX 78744")),
            resource("Dallas Vet Center", Category::MentalHealth, Some("10501 N Central Expy, Dallas, TX 75231")),
            resource("Albuquerque VA", Category::Healthcare, Some("1501 San Pedro Drive SE, Albuquerque, NM 87108")),
            // "TX" appears, but not as ", TX "
            resource("Texarkana Annex", Category::Healthcare, Some("1 TX Road, Texarkana, AR 71854")),
            resource("No Address Clinic", Category::Healthcare, None),
            resource("Blank Address Clinic", Category::Healthcare, Some("")),
        ],
    )
    .await
    .unwrap();

    pool
}

#[tokio::test]
async fn test_listing_filters_by_category_and_state_sorted_by_name() {
    let tmp = TempDir::new().unwrap();
    let pool = seeded_pool(&tmp).await;

    let listing = list_category(&pool, "TX", "healthcare").await.unwrap();
    assert_eq!(listing.category_label, "Healthcare");
    assert_eq!(listing.state_name, "Texas");

    let names: Vec<&str> = listing.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Austin VA Clinic", "Waco VA Clinic"]);
    assert!(listing
        .resources
        .iter()
        .all(|r| r.category == "Healthcare"));
}

#[tokio::test]
async fn test_listing_is_case_insensitive_on_path_segments() {
    let tmp = TempDir::new().unwrap();
    let pool = seeded_pool(&tmp).await;

    let listing = list_category(&pool, "tx", "Mental-Health").await.unwrap();
    assert_eq!(listing.category_label, "Mental Health");
    assert_eq!(listing.state_name, "Texas");
    assert_eq!(listing.resources.len(), 1);
    assert_eq!(listing.resources[0].name, "Dallas Vet Center");
}

#[tokio::test]
async fn test_unknown_category_is_empty_and_labelled() {
    let tmp = TempDir::new().unwrap();
    let pool = seeded_pool(&tmp).await;

    for state in ["TX", "NM", "ZZ"] {
        let listing = list_category(&pool, state, "veterinary").await.unwrap();
        assert_eq!(listing.category_label, CATEGORY_NOT_FOUND);
        assert!(listing.resources.is_empty());
    }
}

#[tokio::test]
async fn test_unknown_state_falls_back_and_is_empty() {
    let tmp = TempDir::new().unwrap();
    let pool = seeded_pool(&tmp).await;

    let listing = list_category(&pool, "ZZ", "healthcare").await.unwrap();
    assert_eq!(listing.state_name, "the selected state");
    assert_eq!(listing.category_label, "Healthcare");
    assert!(listing.resources.is_empty());
}

#[tokio::test]
async fn test_wildcard_characters_do_not_match() {
    let tmp = TempDir::new().unwrap();
    let pool = seeded_pool(&tmp).await;

    let listing = list_category(&pool, "T_", "healthcare").await.unwrap();
    assert!(listing.resources.is_empty());

    let listing = list_category(&pool, "%", "healthcare").await.unwrap();
    assert!(listing.resources.is_empty());
}

#[tokio::test]
async fn test_state_with_no_resources_in_category() {
    let tmp = TempDir::new().unwrap();
    let pool = seeded_pool(&tmp).await;

    let listing = list_category(&pool, "NM", "housing").await.unwrap();
    assert_eq!(listing.state_name, "New Mexico");
    assert_eq!(listing.category_label, "Housing");
    assert!(listing.resources.is_empty());

    let listing = list_category(&pool, "NM", "healthcare").await.unwrap();
    assert_eq!(listing.resources.len(), 1);
    assert_eq!(listing.resources[0].name, "Albuquerque VA");
}
