//! # Patriot Pathways
//!
//! A state-by-state directory of veteran support resources with an AI
//! smart search.
//!
//! Patriot Pathways keeps one SQLite table of resources (healthcare,
//! employment, housing, mental health), filled by an offline ingestion job
//! that pages through the VA facilities API. A small web server lists those
//! resources by state and category and forwards free-text questions to a
//! hosted chat-completion model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ VA facilities│──▶│ Ingestion job│──▶│  SQLite  │
//! │     API      │   │ (pathways    │   │ resource │
//! └──────────────┘   │   ingest)    │   └────┬─────┘
//!                    └──────────────┘        │
//!                                            ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Chat model   │◀──│ Smart search │◀──│   HTTP   │
//! │     API      │   │   adapter    │   │  server  │
//! └──────────────┘   └──────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pathways init                 # create database
//! pathways ingest               # pull all 50 states from the facilities API
//! pathways list TX healthcare   # print one listing
//! pathways serve                # start the web server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Resource and category types |
//! | [`states`] | The 50 supported states |
//! | [`directory`] | State/category listings |
//! | [`facilities`] | Facilities API client and record mapping |
//! | [`ingest`] | Full-replace ingestion job |
//! | [`smart_search`] | Chat-completion search adapter |
//! | [`views`] | HTML views |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod config;
pub mod db;
pub mod directory;
pub mod facilities;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod server;
pub mod smart_search;
pub mod states;
pub mod views;
