use async_trait::async_trait;
use ecoleta_core::{
    location::{Accuracy, LocationDevice, LocationError, PermissionStatus},
    model::Coordinate,
};

/// Location device backed by a position given on the command line.
///
/// A terminal has no location sensor, so the configured position stands in for
/// the fix. Without one the permission is reported as refused.
pub(crate) struct ConfiguredDevice {
    position: Option<Coordinate>,
}

impl ConfiguredDevice {
    pub(crate) fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationDevice for ConfiguredDevice {
    async fn request_permission(&self) -> PermissionStatus {
        if self.position.is_some() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinate, LocationError> {
        self.position
            .ok_or_else(|| LocationError::Unavailable("no position configured".into()))
    }
}
