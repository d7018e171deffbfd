//! Remote area/volume measurement.
//!
//! The local kernel is the authority for every figure shown to the user.
//! A remote calculation service may be consulted as a cross-check; its
//! answer is advisory and a disagreement is only flagged. Requests are
//! bounded by a fixed timeout and never retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitekit_core::{
    ConnectivityError, EventBus, MeasurementEvent, Position, SceneEvent, ShapeId,
};

use crate::model::{Shape, ShapeMetrics};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1500);
pub const DEFAULT_DIVERGENCE_TOLERANCE: f64 = 0.01;

/// Figures returned by a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteMeasurement {
    pub area: f64,
    pub volume: Option<f64>,
}

#[async_trait]
pub trait MeasurementDelegate: Send + Sync {
    async fn compute_area_and_volume(
        &self,
        points: &[Position],
        height: Option<f64>,
    ) -> Result<RemoteMeasurement, ConnectivityError>;
}

/// Everything needed to measure a shape, detached from the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRequest {
    pub shape: ShapeId,
    pub points: Vec<Position>,
    pub height: Option<f64>,
    pub local: ShapeMetrics,
}

impl MeasurementRequest {
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            shape: shape.id(),
            points: shape.vertices().to_vec(),
            height: shape.height(),
            local: shape.metrics(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementReport {
    Available {
        local: ShapeMetrics,
        remote: RemoteMeasurement,
        /// The remote figures differ from the local ones beyond tolerance.
        diverged: bool,
    },
    /// The service could not be used; local figures still stand.
    Unavailable {
        local: ShapeMetrics,
        reason: String,
    },
}

impl MeasurementReport {
    /// Local figures, present in every report
    pub fn local(&self) -> &ShapeMetrics {
        match self {
            MeasurementReport::Available { local, .. } | MeasurementReport::Unavailable { local, .. } => {
                local
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MeasurementReport::Available { .. })
    }
}

pub struct MeasurementService {
    delegate: Option<Arc<dyn MeasurementDelegate>>,
    timeout: Duration,
    divergence_tolerance: f64,
    bus: Option<Arc<EventBus>>,
}

impl std::fmt::Debug for MeasurementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementService")
            .field("enabled", &self.delegate.is_some())
            .field("timeout", &self.timeout)
            .field("divergence_tolerance", &self.divergence_tolerance)
            .finish()
    }
}

impl Default for MeasurementService {
    fn default() -> Self {
        Self::disabled()
    }
}

impl MeasurementService {
    pub fn new(delegate: Arc<dyn MeasurementDelegate>) -> Self {
        Self {
            delegate: Some(delegate),
            ..Self::disabled()
        }
    }

    /// A service that reports every request as unavailable
    pub fn disabled() -> Self {
        Self {
            delegate: None,
            timeout: DEFAULT_TIMEOUT,
            divergence_tolerance: DEFAULT_DIVERGENCE_TOLERANCE,
            bus: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_divergence_tolerance(mut self, tolerance: f64) -> Self {
        self.divergence_tolerance = tolerance.abs();
        self
    }

    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.delegate.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the remote service to measure, within the timeout.
    pub async fn measure(&self, request: MeasurementRequest) -> MeasurementReport {
        let result = match &self.delegate {
            None => Err(ConnectivityError::Unreachable {
                reason: "measurement service disabled".to_string(),
            }),
            Some(delegate) => {
                let call = delegate.compute_area_and_volume(&request.points, request.height);
                match tokio::time::timeout(self.timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(ConnectivityError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }),
                }
            }
        };

        let report = match result {
            Ok(remote) => {
                let diverged = diverges(&request.local, &remote, self.divergence_tolerance);
                if diverged {
                    tracing::warn!(
                        "Remote measurement of {} diverges: local {:.3} m², remote {:.3} m²",
                        request.shape,
                        request.local.area,
                        remote.area
                    );
                }
                MeasurementReport::Available {
                    local: request.local,
                    remote,
                    diverged,
                }
            }
            Err(error) => {
                tracing::warn!("Measurement of {} unavailable: {}", request.shape, error);
                MeasurementReport::Unavailable {
                    local: request.local,
                    reason: error.to_string(),
                }
            }
        };

        self.publish(request.shape, &report);
        report
    }

    fn publish(&self, shape: ShapeId, report: &MeasurementReport) {
        let Some(bus) = &self.bus else {
            return;
        };
        let event = match report {
            MeasurementReport::Available { local, diverged, .. } => MeasurementEvent::Completed {
                shape,
                area: local.area,
                volume: local.volume,
                diverged: *diverged,
            },
            MeasurementReport::Unavailable { reason, .. } => MeasurementEvent::Unavailable {
                shape,
                reason: reason.clone(),
            },
        };
        bus.publish(SceneEvent::Measurement(event));
    }
}

fn relative_difference(local: f64, remote: f64) -> f64 {
    let scale = local.abs().max(remote.abs());
    if scale <= f64::EPSILON {
        0.0
    } else {
        (local - remote).abs() / scale
    }
}

fn diverges(local: &ShapeMetrics, remote: &RemoteMeasurement, tolerance: f64) -> bool {
    if !remote.area.is_finite() || relative_difference(local.area, remote.area) > tolerance {
        return true;
    }
    match (local.volume, remote.volume) {
        (Some(l), Some(r)) => relative_difference(l, r) > tolerance,
        _ => false,
    }
}
