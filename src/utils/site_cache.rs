use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

use crate::model::site::{Site, SiteId};
use crate::state::Directory;

/// Reference sites by id, fronting the directory on the attendance hot path.
pub static SITE_CACHE: Lazy<Cache<SiteId, Site>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL, refreshed seed wins eventually
        .build()
});

/// Remember a single site
pub async fn remember(site: &Site) {
    SITE_CACHE.insert(site.id, site.clone()).await;
}

/// Cache-first site lookup; falls back to the directory and backfills.
pub async fn lookup(site_id: SiteId, directory: &Directory) -> Option<Site> {
    if let Some(site) = SITE_CACHE.get(&site_id).await {
        return Some(site);
    }

    let site = directory.sites().get(site_id).cloned()?;
    SITE_CACHE.insert(site_id, site.clone()).await;
    Some(site)
}

/// Batch remember sites
async fn batch_remember(sites: &[Site]) {
    let futures: Vec<_> = sites.iter().map(remember).collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load the whole directory into the cache at startup.
pub async fn warmup_site_cache(directory: &Directory) {
    let sites: Vec<Site> = directory.sites().iter().cloned().collect();
    let total = sites.len();
    batch_remember(&sites).await;

    log::info!("Site cache warmup complete: {} sites", total);
}
