//! Anti-brute-force admission gate.
//!
//! Composes three independent leaky-bucket rate limiters (login, password,
//! ip) with an allow-list and a deny-list of IP subnets into a single
//! `check_auth` decision, the way an external authentication service would
//! consult it on every login attempt.
//!
//! # Quick Start
//!
//! ```ignore
//! use abf_gate::{AdmissionService, KeyedBucketStore, StoreConfig, InMemorySubnetList};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = StoreConfig {
//!         capacity: 10,
//!         ttl: Duration::from_secs(300),
//!         sweep_interval: Duration::from_secs(30),
//!     };
//!     let service = AdmissionService::new(
//!         KeyedBucketStore::new(cfg),
//!         KeyedBucketStore::new(cfg),
//!         KeyedBucketStore::new(cfg),
//!         InMemorySubnetList::new(),
//!         InMemorySubnetList::new(),
//!     );
//!
//!     let ok = service.check_auth("alice", "hunter2", "203.0.113.7").await.unwrap();
//!     println!("admitted: {ok}");
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `memory` (default): in-memory `SubnetList` backed by `dashmap`
//! - `postgres`: reference `SubnetList` backed by a Postgres connection pool

pub mod bucket;
pub mod config;
pub mod control;
pub mod error;
pub mod service;
pub mod store;
pub mod subnet;

pub use bucket::Bucket;
pub use config::{AppConfig, LimiterConfig, Limiters, ListenConfig, SubnetStoreSettings};
pub use control::ControlApi;
pub use error::{AdmissionError, ConfigError, Result, ValidationError};
pub use service::AdmissionService;
pub use store::{KeyedBucketStore, StoreConfig};
pub use subnet::SubnetList;

#[cfg(feature = "memory")]
pub use subnet::InMemorySubnetList;

#[cfg(feature = "postgres")]
pub use subnet::{PostgresSubnetList, SubnetStoreConfig};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bucket::Bucket;
    pub use crate::control::ControlApi;
    pub use crate::error::{AdmissionError, Result, ValidationError};
    pub use crate::service::AdmissionService;
    pub use crate::store::{KeyedBucketStore, StoreConfig};
    pub use crate::subnet::SubnetList;

    #[cfg(feature = "memory")]
    pub use crate::subnet::InMemorySubnetList;

    #[cfg(feature = "postgres")]
    pub use crate::subnet::{PostgresSubnetList, SubnetStoreConfig};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use std::time::Duration;

    fn store_config(capacity: u32) -> StoreConfig {
        StoreConfig {
            capacity,
            ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_admission_flow() {
        let service = AdmissionService::new(
            KeyedBucketStore::new(store_config(3)),
            KeyedBucketStore::new(store_config(3)),
            KeyedBucketStore::new(store_config(3)),
            InMemorySubnetList::new(),
            InMemorySubnetList::new(),
        );

        for i in 1..=3 {
            assert!(
                service.check_auth("alice", "hunter2", "203.0.113.7").await.unwrap(),
                "attempt {i} should be admitted"
            );
        }
        assert!(!service.check_auth("alice", "hunter2", "203.0.113.7").await.unwrap());

        service.reset_bucket("alice", "").await.unwrap();
        assert!(service.check_auth("alice", "hunter2", "203.0.113.7").await.unwrap());
    }
}
