//! Postgres-backed reference [`SubnetList`] implementation.
//!
//! Proves the trait is implementable against durable storage, the way the
//! original system kept its allow/deny tables in Postgres. Not required by
//! the core; the in-memory implementation is the default.

use std::net::IpAddr;

use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use ipnet::IpNet;
use tokio_postgres::NoTls;

use crate::error::{AdmissionError, Result};
use crate::subnet::SubnetList;

/// Opaque connection parameters for the durable subnet-store backend.
#[derive(Debug, Clone)]
pub struct SubnetStoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub sslmode: String,
    /// Which list this pool backs (`allow` or `deny`); selects the table.
    pub table: String,
}

/// A [`SubnetList`] backed by a single Postgres table (`cidr TEXT PRIMARY KEY`).
///
/// This schema is illustrative, not a contract the core depends on.
pub struct PostgresSubnetList {
    pool: Pool,
    table: String,
}

impl PostgresSubnetList {
    /// Connect using the given configuration.
    pub async fn new(config: SubnetStoreConfig) -> Result<Self> {
        let mut pool_config = PoolConfig::new();
        pool_config.host = Some(config.host.clone());
        pool_config.port = Some(config.port);
        pool_config.dbname = Some(config.database.clone());
        pool_config.user = Some(config.username.clone());
        pool_config.password = Some(config.password.clone());

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| AdmissionError::internal("subnet store pool creation failed", e))?;

        // Verify the table exists / is reachable before returning a usable store.
        let conn = pool
            .get()
            .await
            .map_err(|e| AdmissionError::internal("subnet store connection failed", e))?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (cidr TEXT PRIMARY KEY)",
                config.table
            ),
            &[],
        )
        .await
        .map_err(|e| AdmissionError::internal("subnet store table setup failed", e))?;

        Ok(Self { pool, table: config.table })
    }

    async fn conn(&self) -> Result<deadpool_postgres::Client> {
        self.pool
            .get()
            .await
            .map_err(|e| AdmissionError::internal("subnet store pool exhausted", e))
    }
}

impl SubnetList for PostgresSubnetList {
    async fn add(&self, cidr: IpNet) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            &format!(
                "INSERT INTO {} (cidr) VALUES ($1) ON CONFLICT (cidr) DO NOTHING",
                self.table
            ),
            &[&cidr.to_string()],
        )
        .await
        .map_err(|e| AdmissionError::internal("subnet store insert failed", e))?;
        Ok(())
    }

    async fn remove(&self, cidr: IpNet) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            &format!("DELETE FROM {} WHERE cidr = $1", self.table),
            &[&cidr.to_string()],
        )
        .await
        .map_err(|e| AdmissionError::internal("subnet store delete failed", e))?;
        Ok(())
    }

    async fn contains(&self, ip: IpAddr) -> Result<bool> {
        let conn = self.conn().await?;
        let rows = conn
            .query(&format!("SELECT cidr FROM {}", self.table), &[])
            .await
            .map_err(|e| AdmissionError::internal("subnet store scan failed", e))?;

        for row in rows {
            let cidr: String = row.get(0);
            if let Ok(net) = cidr.parse::<IpNet>() {
                if net.contains(&ip) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(&format!("SELECT cidr FROM {}", self.table), &[])
            .await
            .map_err(|e| AdmissionError::internal("subnet store scan failed", e))?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}
