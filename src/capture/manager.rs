//! Camera session lifecycle and the bounded photo queue

use super::device::{CameraDevice, CameraSession};
use super::encoder::encode_frame;
use super::models::{CameraConstraints, Capture};
use crate::config::CameraConfig;
use crate::error::{Result, WizardError};
use crate::metrics::WIZARD_METRICS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Owns the camera session and the capture queue
pub struct MediaCaptureManager {
    device: Arc<dyn CameraDevice>,
    config: CameraConfig,
    session: tokio::sync::Mutex<Option<CameraSession>>,
    captures: Mutex<Vec<Capture>>,
    is_open: AtomicBool,
}

impl MediaCaptureManager {
    pub fn new(device: Arc<dyn CameraDevice>, config: CameraConfig) -> Self {
        Self {
            device,
            config,
            session: tokio::sync::Mutex::new(None),
            captures: Mutex::new(Vec::new()),
            is_open: AtomicBool::new(false),
        }
    }

    fn queue(&self) -> MutexGuard<'_, Vec<Capture>> {
        self.captures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_photos(&self) -> usize {
        self.config.photo_limit()
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    pub fn captures(&self) -> Vec<Capture> {
        self.queue().clone()
    }

    /// Data URIs in capture order
    pub fn previews(&self) -> Vec<String> {
        self.queue().iter().map(|c| c.image_data.clone()).collect()
    }

    /// Open the camera, preferring the configured facing mode.
    ///
    /// Any session that is still open is released first. On failure no
    /// session is left behind.
    pub async fn start_camera(&self) -> Result<()> {
        let max = self.max_photos();
        if self.len() >= max {
            warn!("Capture limit of {} reached, not opening camera", max);
            WIZARD_METRICS.record_camera_session("limit");
            return Err(WizardError::CaptureLimitExceeded { max });
        }

        let mut slot = self.session.lock().await;
        if slot.take().is_some() {
            debug!("Released previous camera session");
        }
        self.is_open.store(false, Ordering::Release);

        let constraints = CameraConstraints {
            facing_mode: self.config.facing_mode,
        };
        match self.device.open(constraints).await {
            Ok(stream) => {
                let (width, height) = stream.native_resolution();
                *slot = Some(CameraSession::new(stream));
                self.is_open.store(true, Ordering::Release);
                info!("Camera opened at {}x{}", width, height);
                WIZARD_METRICS.record_camera_session("opened");
                Ok(())
            }
            Err(e) => {
                error!("Error accessing camera: {}", e);
                WIZARD_METRICS.record_camera_session("unavailable");
                Err(WizardError::CameraUnavailable(e.to_string()))
            }
        }
    }

    /// Take one photo from the open session, then close it.
    ///
    /// Returns the index of the new capture, or `None` when there was no
    /// session or the frame could not be captured. The session is closed in
    /// every case.
    pub async fn capture_photo(&self) -> Option<usize> {
        let mut slot = self.session.lock().await;
        let Some(session) = slot.take() else {
            debug!("Capture requested without an open camera");
            return None;
        };

        let stream = session.stream();
        let encoded = stream
            .read_frame()
            .map_err(|e| e.to_string())
            .and_then(|frame| {
                encode_frame(&frame, stream.native_resolution(), self.config.jpeg_quality)
                    .map(|uri| (uri, frame.geotag))
                    .map_err(|e| e.to_string())
            });

        drop(session);
        self.is_open.store(false, Ordering::Release);

        let (image_data, geotag) = match encoded {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Photo capture failed: {}", e);
                WIZARD_METRICS.record_capture("failed");
                return None;
            }
        };

        let mut queue = self.queue();
        if queue.len() >= self.max_photos() {
            warn!("Capture queue full, discarding photo");
            WIZARD_METRICS.record_capture("rejected");
            return None;
        }
        queue.push(Capture::new(image_data, geotag));
        WIZARD_METRICS.record_capture("stored");
        debug!("Stored capture {} of {}", queue.len(), self.max_photos());
        Some(queue.len() - 1)
    }

    /// Release the camera. Safe to call when nothing is open.
    pub async fn stop_camera(&self) {
        let mut slot = self.session.lock().await;
        if slot.take().is_some() {
            info!("Camera closed");
        }
        self.is_open.store(false, Ordering::Release);
    }

    /// Remove the capture at `index`; later captures shift down.
    ///
    /// An invalid index is a caller bug: it panics in debug builds and is
    /// reported as `IndexOutOfRange` with the queue untouched otherwise.
    pub fn remove_photo(&self, index: usize) -> Result<Capture> {
        let mut queue = self.queue();
        if index >= queue.len() {
            error!("Photo index {} out of range ({} captures)", index, queue.len());
            debug_assert!(
                index < queue.len(),
                "photo index {} out of range ({} captures)",
                index,
                queue.len()
            );
            return Err(WizardError::IndexOutOfRange {
                index,
                len: queue.len(),
            });
        }
        Ok(queue.remove(index))
    }

    /// Drop every capture. Only for starting a fresh report.
    pub fn clear(&self) {
        self.queue().clear();
    }
}
