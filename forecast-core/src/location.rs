use std::fmt::{self, Debug};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::error::LocationError;

/// How long to wait for a device fix before giving up. The platform layer
/// itself imposes no deadline, so an unresolvable fix would otherwise hang
/// forever.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(10);

/// A location the forecast API accepts: either device coordinates or a
/// free-text place name from the search prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    Name(String),
}

impl LocationQuery {
    pub fn from_name(name: impl Into<String>) -> Self {
        LocationQuery::Name(name.into())
    }

    /// Interpret user input: a `lat,lon` pair of decimal numbers becomes a
    /// coordinate query, anything else is forwarded verbatim as a name.
    pub fn parse(input: &str) -> Self {
        if let Some((lat, lon)) = input.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                return LocationQuery::Coordinates { lat, lon };
            }
        }
        LocationQuery::Name(input.to_string())
    }

    /// The `q=` value sent to the API.
    pub fn as_query(&self) -> String {
        match self {
            LocationQuery::Coordinates { lat, lon } => format!("{lat},{lon}"),
            LocationQuery::Name(name) => name.clone(),
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query())
    }
}

/// Seam over the platform's location services: permission state, the
/// "location enabled" capability, and a single high-accuracy fix.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// Whether the user has granted the location permission.
    fn permission_granted(&self) -> bool;

    /// Whether the location capability is switched on.
    fn is_enabled(&self) -> bool;

    /// Request one high-accuracy fix, completing with `(lat, lon)`.
    async fn current_fix(&self) -> Result<(f64, f64), LocationError>;
}

/// Turns the device's permission/capability state and provider into a single
/// best-effort [`LocationQuery`], with a deadline on the fix.
#[derive(Debug)]
pub struct LocationResolver<P> {
    provider: P,
    fix_timeout: Duration,
    // At most one device fix request in flight; overlapping callers wait for
    // the lock rather than spawning a second platform request.
    in_flight: Mutex<()>,
}

impl<P: LocationProvider> LocationResolver<P> {
    pub fn new(provider: P) -> Self {
        Self::with_timeout(provider, DEFAULT_FIX_TIMEOUT)
    }

    pub fn with_timeout(provider: P, fix_timeout: Duration) -> Self {
        Self {
            provider,
            fix_timeout,
            in_flight: Mutex::new(()),
        }
    }

    /// Resolve a query from the device's location services.
    ///
    /// Fails with [`LocationError::PermissionDenied`] or
    /// [`LocationError::Disabled`] before any fix is requested, and with
    /// [`LocationError::Timeout`] if no fix arrives within the deadline.
    pub async fn resolve_from_device(&self) -> Result<LocationQuery, LocationError> {
        if !self.provider.permission_granted() {
            return Err(LocationError::PermissionDenied);
        }
        if !self.provider.is_enabled() {
            return Err(LocationError::Disabled);
        }

        let _guard = self.in_flight.lock().await;

        let (lat, lon) = timeout(self.fix_timeout, self.provider.current_fix())
            .await
            .map_err(|_| LocationError::Timeout(self.fix_timeout))??;

        debug!("device fix resolved to {lat},{lon}");
        Ok(LocationQuery::Coordinates { lat, lon })
    }

    /// Resolve from user text input. Pass-through by design: empty or
    /// malformed names are forwarded unchanged and fail at the HTTP layer.
    pub fn resolve_from_name(&self, name: &str) -> LocationQuery {
        LocationQuery::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FakeProvider {
        granted: bool,
        enabled: bool,
        fix: Option<(f64, f64)>,
    }

    impl FakeProvider {
        fn ready(lat: f64, lon: f64) -> Self {
            Self {
                granted: true,
                enabled: true,
                fix: Some((lat, lon)),
            }
        }
    }

    #[async_trait]
    impl LocationProvider for FakeProvider {
        fn permission_granted(&self) -> bool {
            self.granted
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn current_fix(&self) -> Result<(f64, f64), LocationError> {
            match self.fix {
                Some(fix) => Ok(fix),
                // A fix that never arrives.
                None => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn device_fix_becomes_coordinate_query() {
        let resolver = LocationResolver::new(FakeProvider::ready(55.75, 37.62));
        let query = resolver.resolve_from_device().await.unwrap();
        assert_eq!(query.as_query(), "55.75,37.62");
    }

    #[tokio::test]
    async fn denied_permission_fails_before_requesting_a_fix() {
        let provider = FakeProvider {
            granted: false,
            enabled: true,
            fix: None,
        };
        let err = LocationResolver::new(provider)
            .resolve_from_device()
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn disabled_capability_is_reported() {
        let provider = FakeProvider {
            granted: true,
            enabled: false,
            fix: Some((1.0, 2.0)),
        };
        let err = LocationResolver::new(provider)
            .resolve_from_device()
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::Disabled));
    }

    #[tokio::test(start_paused = true)]
    async fn unresolvable_fix_times_out() {
        let provider = FakeProvider {
            granted: true,
            enabled: true,
            fix: None,
        };
        let resolver = LocationResolver::with_timeout(provider, Duration::from_secs(5));
        let err = resolver.resolve_from_device().await.unwrap_err();
        assert!(matches!(err, LocationError::Timeout(_)));
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LocationProvider for CountingProvider {
        fn permission_granted(&self) -> bool {
            true
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn current_fix(&self) -> Result<(f64, f64), LocationError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok((55.75, 37.62))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_device_requests_run_one_at_a_time() {
        let provider = CountingProvider::default();
        let max_active = provider.max_active.clone();
        let resolver = Arc::new(LocationResolver::new(provider));

        let first = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve_from_device().await })
        };
        let second = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve_from_device().await })
        };

        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn name_resolution_is_a_pass_through() {
        let resolver = LocationResolver::new(FakeProvider::ready(0.0, 0.0));
        assert_eq!(resolver.resolve_from_name("").as_query(), "");
        assert_eq!(
            resolver.resolve_from_name("  Moscow ").as_query(),
            "  Moscow "
        );
    }

    #[test]
    fn parse_recognizes_coordinate_literals() {
        assert_eq!(
            LocationQuery::parse("55.75,37.62"),
            LocationQuery::Coordinates {
                lat: 55.75,
                lon: 37.62
            }
        );
        assert_eq!(
            LocationQuery::parse("Moscow"),
            LocationQuery::Name("Moscow".to_string())
        );
        // A comma alone does not make coordinates.
        assert_eq!(
            LocationQuery::parse("Washington, DC"),
            LocationQuery::Name("Washington, DC".to_string())
        );
    }
}
