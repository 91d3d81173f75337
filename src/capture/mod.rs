//! Camera capture: device session lifecycle and the bounded photo queue

pub mod device;
pub mod encoder;
pub mod manager;
pub mod models;

pub use device::{CameraDevice, CameraSession, CameraStream};
pub use encoder::{encode_frame, EncodeError};
pub use manager::MediaCaptureManager;
pub use models::{CameraConstraints, Capture, VideoFrame};
