//! Football participation records and ranked "quiz" queries over them.
//!
//! # Examples
//!
//! Ranking goal scorers at one club with [`core::store::MemoryStore`]:
//! ```
//! use footyquiz::{
//!     core::{contract::EntityWriter, store::MemoryStore},
//!     engine::{generate_quiz, QuizConfig},
//!     entity::StatsRecord,
//!     types::{QuizCategory, QuizMode, Role},
//! };
//!
//! let mut store = MemoryStore::new();
//! let club = store.get_or_create_club("Arsenal").expect("club");
//! let season = store.get_or_create_season("2003/2004").expect("season");
//! let henry = store.create_person("Thierry", "Henry").expect("person");
//! let pcs = store
//!     .get_or_create_participation(henry.id, club.id, season.id, Role::Player)
//!     .expect("participation");
//! store
//!     .upsert_stats(pcs.id, StatsRecord { appearances: 37, goals: 30, assists: 6 })
//!     .expect("stats");
//!
//! let config = QuizConfig::new(QuizMode::Club, QuizCategory::Goals).club(club.id);
//! let result = generate_quiz(&store, &config).expect("quiz");
//! assert_eq!(result.max_answers, 1);
//! assert_eq!(result.answers[0].total(), Some(30));
//! ```
//!
//! Serving quizzes over HTTP from a SQLite file:
//! ```no_run
//! use footyquiz::{
//!     http::build_router,
//!     persist::sqlite::SqliteStore,
//!     runtime::{spawn_quiz_service, ServiceConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = SqliteStore::open("footyquiz.db").expect("open sqlite");
//! let service = spawn_quiz_service(store, ServiceConfig::default());
//! let app = build_router(service);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await.expect("bind");
//! axum::serve(listener, app).await.expect("serve");
//! # }
//! ```
#![forbid(unsafe_code)]

/// Server configuration.
pub mod config;
/// Store contracts and the in-memory store.
pub mod core;
/// Quiz aggregation engine.
pub mod engine;
/// Club, season, person and participation records.
pub mod entity;
/// HTTP routes.
pub mod http;
/// CSV ingestion.
pub mod ingest;
/// SQLite-backed store.
pub mod persist;
/// Single-owner async service and handle.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
