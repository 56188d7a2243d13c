//! spacefind - find wiki pages by approximate title.
//!
//! Titles typed by people (or language models) rarely match the stored
//! title exactly. spacefind resolves such a title to one page of a space by
//! trying exact slug and normalized-key matches, then a weighted fuzzy
//! score, then the wiki's own full-text search.
//!
//! # Quick start
//!
//! ```no_run
//! use spacefind::{
//!     ConfluenceClient,
//!     FuzzyResolver,
//!     StoreConfig,
//!     StoreOverrides,
//! };
//!
//! let config = StoreConfig::resolve(&StoreOverrides::default()).unwrap();
//! let client = ConfluenceClient::new(config).unwrap();
//!
//! let resolution = FuzzyResolver::new(&client)
//!     .resolve("ENG", "quaterly review")
//!     .unwrap();
//! if let Some(doc) = resolution.document() {
//!     println!("{} ({})", doc.title, doc.id);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod confluence;
pub mod error;
pub mod mcp;
pub mod normalize;
pub mod overlap;
pub mod paginate;
pub mod rank;
pub mod resolve;
pub mod scoring;
pub mod similarity;
pub mod space;
pub mod store;
pub mod summary;
pub mod tools;

pub use config::{StoreConfig, StoreOverrides};
pub use confluence::ConfluenceClient;
pub use error::{Error, Result};
pub use normalize::NormalizedTitle;
pub use paginate::DocumentPaginator;
pub use rank::{ScoredCandidate, TopKRanker};
pub use resolve::{FuzzyResolver, MatchKind, Resolution, ResolvedDocument};
pub use scoring::{MatchScorer, MatchWeights};
pub use store::{Document, DocumentStoreClient, Page, PageStore};
pub use tools::PageTools;
