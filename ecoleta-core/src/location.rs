//! One-shot device geolocation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::model::Coordinate;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a device position could not be obtained.
pub enum LocationError {
    /// The user refused the location permission.
    #[error("Location permission denied")]
    PermissionDenied,
    /// Permission was granted but no fix could be taken.
    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of a runtime permission request.
pub enum PermissionStatus {
    /// Location access allowed.
    Granted,
    /// Location access refused.
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Requested precision of a position fix.
pub enum Accuracy {
    /// Best precision the device can offer.
    Highest,
}

#[async_trait]
/// Device services needed to locate the user.
pub trait LocationDevice: Send + Sync {
    /// Ask the user for location permission.
    async fn request_permission(&self) -> PermissionStatus;

    /// Take a single position fix.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Unavailable`] when no fix can be taken.
    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinate, LocationError>;
}

/// Wraps a [`LocationDevice`] into a permission request followed by one fix.
#[derive(Clone)]
pub struct GeolocationProvider {
    device: Arc<dyn LocationDevice>,
}

impl GeolocationProvider {
    /// Create a provider for the given device.
    #[must_use]
    pub fn new(device: Arc<dyn LocationDevice>) -> Self {
        Self { device }
    }

    /// Request permission and, if granted, a single high-accuracy fix.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::PermissionDenied`] when the user refuses access and
    /// the device error when the fix fails. Nothing is retried.
    pub async fn acquire(&self) -> Result<Coordinate, LocationError> {
        if self.device.request_permission().await == PermissionStatus::Denied {
            debug!("location permission denied");
            return Err(LocationError::PermissionDenied);
        }

        let coordinate = self.device.current_position(Accuracy::Highest).await?;
        debug!(%coordinate, "position fix acquired");
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FakeDevice {
        permission: PermissionStatus,
        fix: Result<Coordinate, LocationError>,
        requested: Mutex<Vec<Accuracy>>,
    }

    impl FakeDevice {
        fn new(permission: PermissionStatus, fix: Result<Coordinate, LocationError>) -> Self {
            Self {
                permission,
                fix,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LocationDevice for FakeDevice {
        async fn request_permission(&self) -> PermissionStatus {
            self.permission
        }

        async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinate, LocationError> {
            self.requested.lock().unwrap().push(accuracy);
            self.fix.clone()
        }
    }

    #[tokio::test]
    async fn granted_permission_takes_one_highest_accuracy_fix() {
        let device = Arc::new(FakeDevice::new(
            PermissionStatus::Granted,
            Ok(Coordinate::new(-23.5, -46.6)),
        ));
        let provider = GeolocationProvider::new(device.clone());

        let coordinate = provider.acquire().await.unwrap();
        assert_eq!(coordinate, Coordinate::new(-23.5, -46.6));
        assert_eq!(*device.requested.lock().unwrap(), vec![Accuracy::Highest]);
    }

    #[tokio::test]
    async fn denied_permission_skips_the_fix() {
        let device = Arc::new(FakeDevice::new(
            PermissionStatus::Denied,
            Ok(Coordinate::new(1.0, 1.0)),
        ));
        let provider = GeolocationProvider::new(device.clone());

        assert_eq!(provider.acquire().await, Err(LocationError::PermissionDenied));
        assert!(device.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fix_failure_is_surfaced() {
        let device = Arc::new(FakeDevice::new(
            PermissionStatus::Granted,
            Err(LocationError::Unavailable("no satellites".into())),
        ));
        let provider = GeolocationProvider::new(device);

        match provider.acquire().await {
            Err(LocationError::Unavailable(msg)) => assert!(msg.contains("satellites")),
            other => panic!("Expected Unavailable, got {other:?}"),
        }
    }
}
