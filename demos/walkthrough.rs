//! Example: drive the complaint wizard end to end with headless devices
//!
//! Uses a synthetic camera and a fixed GPS position; the address lookup goes
//! to the configured geocoding service (see `civic.toml` / `GEOCODER_URL`).

use async_trait::async_trait;
use civic_report::capture::{CameraConstraints, CameraDevice, CameraStream, VideoFrame};
use civic_report::location::{
    ChannelViewport, Coordinates, GeolocationProvider, MapCommand, NominatimClient,
    PositionOptions,
};
use civic_report::metrics::WIZARD_METRICS;
use civic_report::observability::init_tracing;
use civic_report::{AdvanceOutcome, AppConfig, DeviceError, Field, WizardController};
use std::sync::Arc;
use tracing::info;

struct SyntheticCamera;

struct GradientStream;

impl CameraStream for GradientStream {
    fn native_resolution(&self) -> (u32, u32) {
        (320, 240)
    }

    fn read_frame(&self) -> Result<VideoFrame, DeviceError> {
        let (width, height) = (160, 120);
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&[(x * 255 / width) as u8, (y * 255 / height) as u8, 96, 255]);
            }
        }
        Ok(VideoFrame {
            width,
            height,
            rgba,
            geotag: None,
        })
    }

    fn stop(&self) {}
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn open(
        &self,
        _constraints: CameraConstraints,
    ) -> Result<Box<dyn CameraStream>, DeviceError> {
        Ok(Box::new(GradientStream))
    }
}

struct FixedGps(Coordinates);

#[async_trait]
impl GeolocationProvider for FixedGps {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates, DeviceError> {
        Ok(self.0)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    let (viewport, mut map_rx) = ChannelViewport::new();
    let renderer = tokio::spawn(async move {
        while let Some(command) = map_rx.recv().await {
            match command {
                MapCommand::FlyTo(target) => info!(
                    "map: fly to ({:.4}, {:.4}) zoom {} over {}s",
                    target.center.lat, target.center.lng, target.zoom, target.duration_secs
                ),
                MapCommand::ClearTarget => info!("map: clear target"),
                MapCommand::SetMarker(marker) => info!("map: marker {:?}", marker),
            }
        }
    });

    let geocoder = NominatimClient::new(config.geocoder.clone())?;
    let wizard = WizardController::from_config(
        &config,
        Arc::new(SyntheticCamera),
        Arc::new(FixedGps(Coordinates::new(18.5204, 73.8567))),
        Arc::new(geocoder),
        Arc::new(viewport),
    );

    wizard.start_camera().await?;
    wizard.capture_photo().await;
    wizard.advance();

    if let Err(e) = wizard.detect_location().await {
        println!("{}", e.notice());
        wizard.update_field(Field::Ward, "Ward 12");
        wizard.update_field(Field::Address, "45/A, Tech Park Avenue");
    }
    wizard.advance();

    wizard.update_field(Field::Category, "Roads");
    wizard.update_field(Field::Description, "Deep pothole in the left lane");
    wizard.advance();

    match wizard.advance() {
        AdvanceOutcome::Submitted(receipt) => {
            println!("Report submitted! Ticket ID #{}", receipt.complaint_id);
            println!("{}", serde_json::to_string_pretty(&receipt.record.form)?);
        }
        other => println!("Wizard did not submit: {:?}", other),
    }

    wizard.teardown().await;
    drop(wizard);
    renderer.await?;

    print!("{}", WIZARD_METRICS.gather_text()?);
    Ok(())
}
