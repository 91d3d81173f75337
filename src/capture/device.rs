//! Camera device seam and the scoped camera session

use super::models::{CameraConstraints, VideoFrame};
use crate::error::DeviceError;
use async_trait::async_trait;
use tracing::debug;

/// Device camera
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request a live video stream. May suspend on a permission prompt.
    async fn open(&self, constraints: CameraConstraints)
        -> Result<Box<dyn CameraStream>, DeviceError>;
}

/// Live video stream handle
pub trait CameraStream: Send + Sync {
    /// Width and height of the live video
    fn native_resolution(&self) -> (u32, u32);

    /// Sample the current frame
    fn read_frame(&self) -> Result<VideoFrame, DeviceError>;

    /// Stop every track of the stream
    fn stop(&self);
}

/// An open camera session. Dropping it stops the stream exactly once.
pub struct CameraSession {
    stream: Box<dyn CameraStream>,
    released: bool,
}

impl CameraSession {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    pub fn stream(&self) -> &dyn CameraStream {
        self.stream.as_ref()
    }

    fn stop_tracks(&mut self) {
        if !self.released {
            self.stream.stop();
            self.released = true;
            debug!("Camera tracks stopped");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingStream(Arc<AtomicUsize>);

    impl CameraStream for CountingStream {
        fn native_resolution(&self) -> (u32, u32) {
            (2, 2)
        }

        fn read_frame(&self) -> Result<VideoFrame, DeviceError> {
            Err(DeviceError::FrameUnavailable("test".into()))
        }

        fn stop(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_drop_stops_exactly_once() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut session = CameraSession::new(Box::new(CountingStream(stops.clone())));
        session.stop_tracks();
        drop(session);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
