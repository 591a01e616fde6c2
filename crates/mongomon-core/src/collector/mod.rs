//! MongoDB status collection.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 StatusSource                 │ (trait)
//! │  - server_status()  -> serverStatus document │
//! │  - replica_role()   -> Primary/Secondary/..  │
//! └──────────────┬────────────────────┬──────────┘
//!                │                    │
//!       ┌────────▼────────┐  ┌────────▼────────┐
//!       │ MongoStatusSource│ │ MockStatusSource│
//!       │ (live server)   │  │ (testing)       │
//!       └────────┬────────┘  └────────┬────────┘
//!                └─────────┬──────────┘
//!                   ┌──────▼──────┐
//!                   │  extract()  │ -> MetricSample
//!                   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use mongomon_core::collector::{MockStatusSource, StatusSource, extract};
//! use mongomon_core::model::ReplicaRole;
//!
//! let mut source = MockStatusSource::typical_primary();
//! let status = source.server_status().unwrap();
//! let role = source.replica_role().unwrap();
//! let sample = extract(&status, role).unwrap();
//! assert_eq!(sample.role, ReplicaRole::Primary);
//! ```

mod extract;
pub mod mock;
mod mongo;
pub mod traits;

pub use extract::extract;
pub use mock::MockStatusSource;
pub use mongo::{MongoStatusSource, normalize_uri};
pub use traits::{CollectError, StatusSource};
