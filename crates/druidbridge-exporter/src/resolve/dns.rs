use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use druidbridge_core::protocol::host::HostToken;

use crate::obs::ExporterMetrics;

/// Address -> host name. `None` means the lookup failed.
#[async_trait]
pub trait ReverseLookup: Send + Sync {
    async fn lookup(&self, address: &str) -> Option<String>;
}

/// Reverse lookup through the system resolver (`getnameinfo`), run on the
/// blocking pool.
pub struct SystemLookup;

#[async_trait]
impl ReverseLookup for SystemLookup {
    async fn lookup(&self, address: &str) -> Option<String> {
        let ip: IpAddr = address.parse().ok()?;
        match tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await {
            Ok(Ok(name)) => {
                let name = name.trim_end_matches('.');
                if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(%address, error = %e, "reverse lookup failed");
                None
            }
            Err(e) => {
                tracing::warn!(%address, error = %e, "reverse lookup task failed");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    name: String,
    expires_at: Instant,
}

/// Caching reverse resolver.
///
/// Hits within the TTL never touch the network. Failures are not cached, so a
/// transient resolver error does not stick. Concurrent misses for one address
/// may both look it up; the later insert wins.
pub struct HostResolver {
    lookup: Arc<dyn ReverseLookup>,
    ttl: Duration,
    cache: DashMap<String, CacheEntry>,
    metrics: Arc<ExporterMetrics>,
}

impl HostResolver {
    pub fn new(lookup: Arc<dyn ReverseLookup>, ttl: Duration, metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            lookup,
            ttl,
            cache: DashMap::new(),
            metrics,
        }
    }

    /// Resolve the address part of `address[:port]` and put the port back.
    pub async fn resolve(&self, token: &str) -> String {
        let host = HostToken::parse(token);
        if host.address.is_empty() {
            return token.to_string();
        }
        let resolved = self.resolve_address(host.address).await;
        host.rejoin(&resolved)
    }

    async fn resolve_address(&self, address: &str) -> String {
        let now = Instant::now();
        if let Some(e) = self.cache.get(address) {
            if e.expires_at > now {
                self.metrics.dns_lookups.inc(&[("result", "hit")]);
                return e.name.clone();
            }
        }
        // lazy expiry
        self.cache.remove_if(address, |_, e| e.expires_at <= now);

        match self.lookup.lookup(address).await {
            Some(name) => {
                self.metrics.dns_lookups.inc(&[("result", "resolved")]);
                self.cache.insert(
                    address.to_string(),
                    CacheEntry {
                        name: name.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
                name
            }
            None => {
                self.metrics.dns_lookups.inc(&[("result", "failed")]);
                address.to_string()
            }
        }
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.cache.len();
        self.cache.retain(|_, e| e.expires_at > now);
        before.saturating_sub(self.cache.len())
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
