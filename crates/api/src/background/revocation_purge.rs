//! Periodic cleanup of expired logout blacklist entries.
//!
//! Expired entries are already ignored on lookup; this job only keeps the
//! table from growing without bound.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::revocation::Revocations;

/// Run the purge loop every `interval` until `cancel` is triggered.
pub async fn run(revocations: Arc<Revocations>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Revocation purge job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Revocation purge job stopping");
                break;
            }
            _ = ticker.tick() => {
                match revocations.purge_expired().await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, "Revocation purge: removed expired entries");
                    }
                    Ok(_) => {
                        tracing::debug!("Revocation purge: nothing to remove");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Revocation purge: cleanup failed");
                    }
                }
            }
        }
    }
}
