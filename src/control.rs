//! Transport-agnostic operation surface (§6).
//!
//! A binding to an RPC framework would implement its wire types in terms of
//! this trait. Every operation accepts a [`CancellationToken`] so a caller
//! can abandon a pending store or subnet-store lock acquisition promptly.

use tokio_util::sync::CancellationToken;

use crate::error::{AdmissionError, Result};
use crate::service::AdmissionService;
use crate::subnet::SubnetList;

/// The operation surface a transport layer binds to.
pub trait ControlApi: Send + Sync {
    fn check_auth(
        &self,
        login: &str,
        password: &str,
        ip: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn reset_bucket(
        &self,
        login: &str,
        ip: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    fn add_to_allow_list(
        &self,
        cidr: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    fn remove_from_allow_list(
        &self,
        cidr: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    fn add_to_deny_list(
        &self,
        cidr: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    fn remove_from_deny_list(
        &self,
        cidr: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;

    fn get_allow_list(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn get_deny_list(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Race `fut` against `cancel`, surfacing [`AdmissionError::Cancelled`] if the
/// token fires first.
async fn or_cancelled<T>(
    cancel: CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = cancel.cancelled() => Err(AdmissionError::Cancelled),
        res = fut => res,
    }
}

impl<A, D> ControlApi for AdmissionService<A, D>
where
    A: SubnetList,
    D: SubnetList,
{
    async fn check_auth(
        &self,
        login: &str,
        password: &str,
        ip: &str,
        cancel: CancellationToken,
    ) -> Result<bool> {
        or_cancelled(cancel, self.check_auth(login, password, ip)).await
    }

    async fn reset_bucket(&self, login: &str, ip: &str, cancel: CancellationToken) -> Result<()> {
        or_cancelled(cancel, self.reset_bucket(login, ip)).await
    }

    async fn add_to_allow_list(&self, cidr: &str, cancel: CancellationToken) -> Result<()> {
        or_cancelled(cancel, self.add_to_allow_list(cidr)).await
    }

    async fn remove_from_allow_list(&self, cidr: &str, cancel: CancellationToken) -> Result<()> {
        or_cancelled(cancel, self.remove_from_allow_list(cidr)).await
    }

    async fn add_to_deny_list(&self, cidr: &str, cancel: CancellationToken) -> Result<()> {
        or_cancelled(cancel, self.add_to_deny_list(cidr)).await
    }

    async fn remove_from_deny_list(&self, cidr: &str, cancel: CancellationToken) -> Result<()> {
        or_cancelled(cancel, self.remove_from_deny_list(cidr)).await
    }

    async fn get_allow_list(&self, cancel: CancellationToken) -> Result<Vec<String>> {
        or_cancelled(cancel, self.get_allow_list()).await
    }

    async fn get_deny_list(&self, cancel: CancellationToken) -> Result<Vec<String>> {
        or_cancelled(cancel, self.get_deny_list()).await
    }
}
