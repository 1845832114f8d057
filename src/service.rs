//! The admission decision pipeline.
//!
//! [`AdmissionService`] composes three [`KeyedBucketStore`]s and two
//! [`SubnetList`]s into the single `check_auth` decision described in §4.4:
//! validate, allow-list, deny-list, then login/password/ip limiters in that
//! fixed order, short-circuiting on the first definitive answer.

use std::net::IpAddr;
use std::sync::Arc;

use crate::error::{AdmissionError, Result, ValidationError};
use crate::store::KeyedBucketStore;
use crate::subnet::{parse_cidr, SubnetList};

/// Composes the three limiter scopes and two subnet lists into one decision.
///
/// Stateless aside from its injected dependencies — no state beyond the
/// buckets' and subnet lists' own.
pub struct AdmissionService<A, D> {
    login_store: Arc<KeyedBucketStore>,
    password_store: Arc<KeyedBucketStore>,
    ip_store: Arc<KeyedBucketStore>,
    allow_list: A,
    deny_list: D,
}

impl<A, D> AdmissionService<A, D>
where
    A: SubnetList,
    D: SubnetList,
{
    /// Build a service from its three limiter stores and two subnet lists.
    pub fn new(
        login_store: Arc<KeyedBucketStore>,
        password_store: Arc<KeyedBucketStore>,
        ip_store: Arc<KeyedBucketStore>,
        allow_list: A,
        deny_list: D,
    ) -> Self {
        Self {
            login_store,
            password_store,
            ip_store,
            allow_list,
            deny_list,
        }
    }

    /// Decide whether `(login, password, ip)` is admitted. See §4.4.
    pub async fn check_auth(&self, login: &str, password: &str, ip: &str) -> Result<bool> {
        if login.is_empty() {
            return Err(ValidationError::EmptyLogin.into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        if ip.is_empty() {
            return Err(ValidationError::EmptyIp.into());
        }
        let addr: IpAddr = ip.parse().map_err(|_| ValidationError::InvalidIp)?;

        tracing::trace!(login, ip, "check_auth: validated");

        if self
            .allow_list
            .contains(addr)
            .await
            .map_err(|e| AdmissionError::internal("allow-list check failed", e))?
        {
            tracing::trace!(ip, "check_auth: allow-list hit");
            return Ok(true);
        }

        if self
            .deny_list
            .contains(addr)
            .await
            .map_err(|e| AdmissionError::internal("deny-list check failed", e))?
        {
            tracing::warn!(ip, "check_auth: deny-list hit");
            return Ok(false);
        }

        if !self.login_store.allow(login) {
            tracing::trace!(login, "check_auth: login limiter denied");
            return Ok(false);
        }
        if !self.password_store.allow(password) {
            tracing::trace!("check_auth: password limiter denied");
            return Ok(false);
        }
        if !self.ip_store.allow(ip) {
            tracing::trace!(ip, "check_auth: ip limiter denied");
            return Ok(false);
        }

        Ok(true)
    }

    /// Reset the login limiter iff `login` is non-empty, and the ip limiter
    /// iff `ip` is non-empty. The password limiter is never reset here.
    pub async fn reset_bucket(&self, login: &str, ip: &str) -> Result<()> {
        if !login.is_empty() {
            self.login_store.reset(login);
        }
        if !ip.is_empty() {
            self.ip_store.reset(ip);
        }
        Ok(())
    }

    /// Add `cidr` to the allow-list after syntactic validation.
    pub async fn add_to_allow_list(&self, cidr: &str) -> Result<()> {
        let net = parse_cidr(cidr)?;
        self.allow_list
            .add(net)
            .await
            .map_err(|e| AdmissionError::internal("allow-list add failed", e))
    }

    /// Remove `cidr` from the allow-list after syntactic validation.
    pub async fn remove_from_allow_list(&self, cidr: &str) -> Result<()> {
        let net = parse_cidr(cidr)?;
        self.allow_list
            .remove(net)
            .await
            .map_err(|e| AdmissionError::internal("allow-list remove failed", e))
    }

    /// Add `cidr` to the deny-list after syntactic validation.
    pub async fn add_to_deny_list(&self, cidr: &str) -> Result<()> {
        let net = parse_cidr(cidr)?;
        self.deny_list
            .add(net)
            .await
            .map_err(|e| AdmissionError::internal("deny-list add failed", e))
    }

    /// Remove `cidr` from the deny-list after syntactic validation.
    pub async fn remove_from_deny_list(&self, cidr: &str) -> Result<()> {
        let net = parse_cidr(cidr)?;
        self.deny_list
            .remove(net)
            .await
            .map_err(|e| AdmissionError::internal("deny-list remove failed", e))
    }

    /// Enumerate the allow-list.
    pub async fn get_allow_list(&self) -> Result<Vec<String>> {
        self.allow_list
            .list()
            .await
            .map_err(|e| AdmissionError::internal("allow-list enumeration failed", e))
    }

    /// Enumerate the deny-list.
    pub async fn get_deny_list(&self) -> Result<Vec<String>> {
        self.deny_list
            .list()
            .await
            .map_err(|e| AdmissionError::internal("deny-list enumeration failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use crate::subnet::InMemorySubnetList;
    use std::time::Duration;

    fn store(capacity: u32) -> Arc<KeyedBucketStore> {
        KeyedBucketStore::new(StoreConfig {
            capacity,
            ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
        })
    }

    fn service(
        login_cap: u32,
        password_cap: u32,
        ip_cap: u32,
    ) -> AdmissionService<InMemorySubnetList, InMemorySubnetList> {
        AdmissionService::new(
            store(login_cap),
            store(password_cap),
            store(ip_cap),
            InMemorySubnetList::new(),
            InMemorySubnetList::new(),
        )
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_fields() {
        let svc = service(10, 10, 10);
        assert_eq!(
            svc.check_auth("", "pw", "203.0.113.7").await.unwrap_err().to_string(),
            AdmissionError::InvalidArgument(ValidationError::EmptyLogin).to_string()
        );
        assert_eq!(
            svc.check_auth("user", "", "203.0.113.7").await.unwrap_err().to_string(),
            AdmissionError::InvalidArgument(ValidationError::EmptyPassword).to_string()
        );
        assert_eq!(
            svc.check_auth("user", "pw", "").await.unwrap_err().to_string(),
            AdmissionError::InvalidArgument(ValidationError::EmptyIp).to_string()
        );
        assert_eq!(
            svc.check_auth("user", "pw", "not-an-ip").await.unwrap_err().to_string(),
            AdmissionError::InvalidArgument(ValidationError::InvalidIp).to_string()
        );
    }

    #[tokio::test]
    async fn test_login_scoped_brute_force() {
        let svc = service(2, 10, 10);
        assert!(svc.check_auth("alice", "pw1", "203.0.113.1").await.unwrap());
        assert!(svc.check_auth("alice", "pw2", "203.0.113.2").await.unwrap());
        assert!(!svc.check_auth("alice", "pw3", "203.0.113.3").await.unwrap());
        // Different login, unaffected.
        assert!(svc.check_auth("bob", "pw1", "203.0.113.4").await.unwrap());
    }

    #[tokio::test]
    async fn test_allow_list_overrides_limiter() {
        let svc = service(1, 10, 10);
        svc.add_to_allow_list("203.0.113.0/24").await.unwrap();
        for _ in 0..20 {
            assert!(svc.check_auth("alice", "pw", "203.0.113.7").await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_deny_list_precedence_and_no_token_consumption() {
        let svc = service(10, 10, 10);
        svc.add_to_deny_list("203.0.113.0/24").await.unwrap();

        assert!(!svc.check_auth("alice", "pw", "203.0.113.7").await.unwrap());

        // No limiter tokens were consumed: alice from a different IP still
        // succeeds 10 times.
        for _ in 0..10 {
            assert!(svc.check_auth("alice", "pw", "198.51.100.1").await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_denied_attempt_still_charges_earlier_scopes() {
        let svc = service(1, 1, 10);
        assert!(svc.check_auth("alice", "pw", "203.0.113.1").await.unwrap());
        // login bucket now full; this attempt is denied at the login step,
        // but it must NOT have touched the password bucket.
        assert!(!svc.check_auth("alice", "other-pw", "203.0.113.2").await.unwrap());

        // password bucket for "other-pw" should still be fresh.
        assert!(svc.check_auth("bob", "other-pw", "203.0.113.3").await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_bucket_never_resets_password() {
        let svc = service(1, 1, 10);
        assert!(svc.check_auth("alice", "pw", "203.0.113.1").await.unwrap());
        assert!(!svc.check_auth("alice", "pw", "203.0.113.2").await.unwrap());

        svc.reset_bucket("alice", "").await.unwrap();

        // login is reset, but the password bucket (shared key "pw") is still full.
        assert!(!svc.check_auth("alice", "pw", "203.0.113.3").await.unwrap());
    }

    #[tokio::test]
    async fn test_enumerate_lists() {
        let svc = service(10, 10, 10);
        svc.add_to_allow_list("203.0.113.0/24").await.unwrap();
        svc.add_to_deny_list("198.51.100.0/24").await.unwrap();

        assert_eq!(svc.get_allow_list().await.unwrap(), vec!["203.0.113.0/24"]);
        assert_eq!(svc.get_deny_list().await.unwrap(), vec!["198.51.100.0/24"]);
    }

    #[tokio::test]
    async fn test_subnet_mutation_rejects_bad_cidr() {
        let svc = service(10, 10, 10);
        assert_eq!(
            svc.add_to_allow_list("garbage").await.unwrap_err().to_string(),
            AdmissionError::InvalidArgument(ValidationError::InvalidCidr).to_string()
        );
    }
}
