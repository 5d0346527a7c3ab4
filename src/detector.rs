use crate::alarm::{process_frame, AlarmState};
use crate::behavior::Behavior;
use crate::config::DetectorConfig;
use crate::model::{select_top, YoloModel};
use crate::tone::AlarmTone;
use log::{info, warn};
use opencv::core::{Point, Rect, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};
use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

const WINDOW_NAME: &str = "Slacking Detector";
const BORDER_THICKNESS: i32 = 20;

fn behavior_color(behavior: Behavior) -> Scalar {
    if behavior.is_slacking() {
        Scalar::new(0.0, 0.0, 255.0, 0.0) // red
    } else {
        Scalar::new(0.0, 255.0, 0.0, 0.0) // green
    }
}

/// Runs the detector until `q` is pressed or the camera stops delivering
/// frames. `r` resets the alarm and the slacking counter.
pub fn run(config: &DetectorConfig) -> Result<(), Box<dyn Error>> {
    let model = YoloModel::new(Path::new(&config.model_path), config.confidence_threshold)?;
    info!("Model loaded from {}", config.model_path);

    let mut cap = videoio::VideoCapture::new(config.camera_index, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        return Err("Could not open webcam".into());
    }

    let mut alarm = AlarmState::new(
        config.slacking_frame_threshold,
        Duration::from_secs(config.alarm_duration_secs),
    );
    let mut tone = AlarmTone::new(
        config.tone_frequency_hz,
        Duration::from_millis(config.tone_duration_ms),
    );

    loop {
        let mut frame = Mat::default();
        if !cap.read(&mut frame)? || frame.empty() {
            warn!("Could not read frame, stopping");
            break;
        }

        let detections = model.detect(&frame)?;
        let top = select_top(&detections);

        let mut is_slacking = false;
        let mut current_status = "No Detection";
        if let Some(top) = top {
            let color = behavior_color(top.behavior);
            imgproc::rectangle(&mut frame, top.rect, color, 2, imgproc::LINE_8, 0)?;
            current_status = top.behavior.display_label();
            imgproc::put_text(
                &mut frame,
                current_status,
                Point::new(top.rect.x, top.rect.y - 10),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.9,
                color,
                2,
                imgproc::LINE_8,
                false,
            )?;
            is_slacking = top.behavior.is_slacking();
        }

        process_frame(&mut alarm, &mut tone, is_slacking, Instant::now());

        let alarm_status = if alarm.is_active() {
            "Go back to work!!"
        } else {
            "Everything is fine :)"
        };
        let status_color = if alarm.is_active() {
            Scalar::new(0.0, 0.0, 255.0, 0.0)
        } else {
            Scalar::new(255.0, 255.0, 255.0, 0.0)
        };
        imgproc::put_text(
            &mut frame,
            &format!("Status: {}", current_status),
            Point::new(10, 30),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            Scalar::new(255.0, 255.0, 255.0, 0.0),
            2,
            imgproc::LINE_8,
            false,
        )?;
        imgproc::put_text(
            &mut frame,
            alarm_status,
            Point::new(10, 60),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            status_color,
            2,
            imgproc::LINE_8,
            false,
        )?;

        if alarm.is_active() {
            let border = Rect::new(0, 0, frame.cols(), frame.rows());
            imgproc::rectangle(&mut frame, border, Scalar::new(0.0, 0.0, 255.0, 0.0), BORDER_THICKNESS, imgproc::LINE_8, 0)?;
        }

        highgui::imshow(WINDOW_NAME, &frame)?;

        let key = highgui::wait_key(1)? & 0xFF;
        if key == i32::from(b'q') {
            break;
        } else if key == i32::from(b'r') {
            alarm.reset();
        }
    }

    highgui::destroy_all_windows()?;
    Ok(())
}
