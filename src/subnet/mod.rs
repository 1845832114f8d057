//! Subnet-membership contract: allow/deny CIDR sets.
//!
//! A [`SubnetList`] is polymorphic over its storage medium; the core depends
//! only on this trait. `add` is idempotent, `contains` returns true iff any
//! stored prefix contains the candidate address.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{Result, ValidationError};

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "memory")]
pub use memory::InMemorySubnetList;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresSubnetList, SubnetStoreConfig};

/// Parse a CIDR prefix string, rejecting anything that doesn't parse.
pub fn parse_cidr(cidr: &str) -> std::result::Result<IpNet, ValidationError> {
    cidr.parse::<IpNet>().map_err(|_| ValidationError::InvalidCidr)
}

/// A set of IP subnets, queried by membership and mutated by CIDR string.
///
/// Implementations validate their own storage; callers are expected to have
/// already validated the CIDR syntax (see [`parse_cidr`]) before calling in.
pub trait SubnetList: Send + Sync {
    /// Add `cidr` to the set. Idempotent on duplicates.
    fn add(&self, cidr: IpNet) -> impl Future<Output = Result<()>> + Send;

    /// Remove `cidr` from the set. Removing a missing entry is a no-op success.
    fn remove(&self, cidr: IpNet) -> impl Future<Output = Result<()>> + Send;

    /// True iff some stored prefix contains `ip`.
    fn contains(&self, ip: IpAddr) -> impl Future<Output = Result<bool>> + Send;

    /// Enumerate all stored prefixes as canonical CIDR strings.
    fn list(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}
