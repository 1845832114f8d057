//! In-memory reference [`SubnetList`] implementation.

use std::net::IpAddr;

use dashmap::DashMap;
use ipnet::IpNet;

use crate::error::Result;
use crate::subnet::SubnetList;

/// A concurrent map of canonical CIDR string → parsed prefix.
#[derive(Debug, Default)]
pub struct InMemorySubnetList {
    prefixes: DashMap<String, IpNet>,
}

impl InMemorySubnetList {
    /// Create an empty subnet list.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubnetList for InMemorySubnetList {
    async fn add(&self, cidr: IpNet) -> Result<()> {
        self.prefixes.insert(cidr.to_string(), cidr);
        Ok(())
    }

    async fn remove(&self, cidr: IpNet) -> Result<()> {
        self.prefixes.remove(&cidr.to_string());
        Ok(())
    }

    async fn contains(&self, ip: IpAddr) -> Result<bool> {
        Ok(self.prefixes.iter().any(|entry| entry.value().contains(&ip)))
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.prefixes.iter().map(|entry| entry.key().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    fn addr(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let list = InMemorySubnetList::new();
        list.add(net("203.0.113.0/24")).await.unwrap();
        list.add(net("203.0.113.0/24")).await.unwrap();
        assert_eq!(list.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_contains_v4_and_v6() {
        let list = InMemorySubnetList::new();
        list.add(net("203.0.113.0/24")).await.unwrap();
        list.add(net("2001:db8::/32")).await.unwrap();

        assert!(list.contains(addr("203.0.113.7")).await.unwrap());
        assert!(!list.contains(addr("198.51.100.1")).await.unwrap());
        assert!(list.contains(addr("2001:db8::1")).await.unwrap());
        assert!(!list.contains(addr("2001:db9::1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_entry_is_noop() {
        let list = InMemorySubnetList::new();
        list.remove(net("203.0.113.0/24")).await.unwrap();
        assert!(list.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_existing_entry() {
        let list = InMemorySubnetList::new();
        list.add(net("203.0.113.0/24")).await.unwrap();
        list.remove(net("203.0.113.0/24")).await.unwrap();
        assert!(!list.contains(addr("203.0.113.7")).await.unwrap());
    }
}
