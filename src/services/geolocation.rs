use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;
use tracing::debug;

use crate::domain::geo::Coordinate;
use crate::error::{Result, TaskMapError};

/// One-shot access to the device position.
#[automock]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate>;
}

/// A provider that always reports the same point, e.g. a `--lat/--lng` override.
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate> {
        Ok(self.0)
    }
}

/// A device without positioning support.
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinate> {
        Err(TaskMapError::Geolocation {
            reason: "positioning not supported".to_string(),
        })
    }
}

/// Ask the provider once. Denial, timeout or garbage all quietly yield `fallback`.
pub async fn resolve_location(
    provider: &dyn LocationProvider,
    timeout: Duration,
    fallback: Coordinate,
) -> Coordinate {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(position)) if position.is_valid() => position,
        Ok(Ok(position)) => {
            debug!(%position, "Ignoring out-of-range device position");
            fallback
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Geolocation failed, using fallback");
            fallback
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "Geolocation timed out, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::DEFAULT_LOCATION;

    struct SlowLocation;

    #[async_trait]
    impl LocationProvider for SlowLocation {
        async fn current_position(&self) -> Result<Coordinate> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinate::new(1.0, 1.0))
        }
    }

    #[tokio::test]
    async fn test_success() {
        let here = Coordinate::new(56.95, 24.1);
        let resolved = resolve_location(&FixedLocation(here), Duration::from_secs(1), DEFAULT_LOCATION).await;
        assert_eq!(resolved, here);
    }

    #[tokio::test]
    async fn test_denied_falls_back() {
        let mut provider = MockLocationProvider::new();
        provider.expect_current_position().times(1).returning(|| {
            Err(TaskMapError::Geolocation {
                reason: "permission denied".into(),
            })
        });

        let resolved = resolve_location(&provider, Duration::from_secs(1), DEFAULT_LOCATION).await;
        assert_eq!(resolved, DEFAULT_LOCATION);
    }

    #[tokio::test]
    async fn test_unsupported_falls_back() {
        let resolved = resolve_location(&NoLocation, Duration::from_secs(1), DEFAULT_LOCATION).await;
        assert_eq!(resolved, DEFAULT_LOCATION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let resolved = resolve_location(&SlowLocation, Duration::from_secs(10), DEFAULT_LOCATION).await;
        assert_eq!(resolved, DEFAULT_LOCATION);
    }

    #[tokio::test]
    async fn test_invalid_position_falls_back() {
        let resolved = resolve_location(
            &FixedLocation(Coordinate::new(f64::NAN, 0.0)),
            Duration::from_secs(1),
            DEFAULT_LOCATION,
        )
        .await;
        assert_eq!(resolved, DEFAULT_LOCATION);
    }
}
