use crate::behavior::Behavior;
use crate::save::{ensure_behavior_dir, image_filename, next_index};
use log::{error, info};
use opencv::core::{Point, Scalar, Vector};
use opencv::prelude::*;
use opencv::{highgui, imgcodecs, imgproc, videoio};
use std::error::Error;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Capturing,
    Paused,
    Done,
}

/// Applies one key poll result: `q` quits from either state, `p` toggles
/// pause. Anything else (including no key) leaves the state alone.
pub fn apply_key(state: CaptureState, key: i32) -> CaptureState {
    match (state, key & 0xFF) {
        (_, k) if k == i32::from(b'q') => CaptureState::Done,
        (CaptureState::Capturing, k) if k == i32::from(b'p') => CaptureState::Paused,
        (CaptureState::Paused, k) if k == i32::from(b'p') => CaptureState::Capturing,
        (s, _) => s,
    }
}

pub struct CollectOptions {
    pub behavior: Behavior,
    pub camera_index: i32,
    pub num_images: u32,
    pub delay_secs: f32,
}

/// Captures frames into `{base_dir}/{behavior}` until the requested count is
/// reached or the user quits. Returns the number of images written.
pub fn collect(opts: &CollectOptions, base_dir: &Path) -> Result<u32, Box<dyn Error>> {
    let behavior = opts.behavior;
    let behavior_dir = ensure_behavior_dir(base_dir, behavior)?;
    let start_index = next_index(&behavior_dir, behavior)?;
    info!("Starting collection from index: {}", start_index);

    let mut cap = videoio::VideoCapture::new(opts.camera_index, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        return Err(format!("Could not open webcam for {}", behavior).into());
    }

    println!("Collecting data for: {}", behavior);
    println!("Press 'q' to quit, 'p' to pause/resume");
    println!("Images will be saved to: {}", behavior_dir.display());
    println!("Delay between captures: {} seconds", opts.delay_secs);

    let window_name = format!("Collecting {}", behavior);
    let mut count = 0;
    let mut state = CaptureState::Capturing;
    let mut last_display: Option<Mat> = None;

    while count < opts.num_images && state != CaptureState::Done {
        if state == CaptureState::Capturing {
            let mut frame = Mat::default();
            if !cap.read(&mut frame)? || frame.empty() {
                error!("Could not read frame");
                break;
            }

            // status overlay goes on a copy, the saved file is the raw frame
            let mut display = frame.try_clone()?;
            let status = format!("Collecting {} - {}/{}", behavior, count + 1, opts.num_images);
            imgproc::put_text(
                &mut display,
                &status,
                Point::new(10, 30),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.7,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                imgproc::LINE_8,
                false,
            )?;
            highgui::imshow(&window_name, &display)?;
            last_display = Some(display);

            let current_index = start_index + count;
            let filename = image_filename(behavior, current_index);
            let filepath = behavior_dir.join(&filename);
            imgcodecs::imwrite(filepath.to_string_lossy().as_ref(), &frame, &Vector::new())?;
            count += 1;
            info!("Saved image {}/{}: {} (index: {})", count, opts.num_images, filename, current_index);

            sleep(Duration::from_secs_f32(opts.delay_secs));
        }

        let key = highgui::wait_key(1)?;
        let next = apply_key(state, key);
        if next != state {
            match next {
                CaptureState::Paused => {
                    println!("Paused");
                    // display-only marker, nothing is written while paused
                    if let Some(display) = &last_display {
                        let mut paused_frame = display.try_clone()?;
                        imgproc::put_text(
                            &mut paused_frame,
                            "PAUSED",
                            Point::new(10, 70),
                            imgproc::FONT_HERSHEY_SIMPLEX,
                            1.0,
                            Scalar::new(0.0, 0.0, 255.0, 0.0),
                            2,
                            imgproc::LINE_8,
                            false,
                        )?;
                        highgui::imshow(&window_name, &paused_frame)?;
                    }
                }
                CaptureState::Capturing => println!("Resumed"),
                CaptureState::Done => {}
            }
            state = next;
        }
    }

    highgui::destroy_all_windows()?;
    println!("Finished collecting {} images for {}", count, behavior);
    if count > 0 {
        println!("Last saved index: {}", start_index + count - 1);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::{apply_key, CaptureState};

    #[test]
    fn test_quit_from_either_state() {
        assert_eq!(apply_key(CaptureState::Capturing, i32::from(b'q')), CaptureState::Done);
        assert_eq!(apply_key(CaptureState::Paused, i32::from(b'q')), CaptureState::Done);
    }

    #[test]
    fn test_pause_toggles() {
        let paused = apply_key(CaptureState::Capturing, i32::from(b'p'));
        assert_eq!(paused, CaptureState::Paused);
        assert_eq!(apply_key(paused, i32::from(b'p')), CaptureState::Capturing);
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(apply_key(CaptureState::Capturing, -1), CaptureState::Capturing);
        assert_eq!(apply_key(CaptureState::Paused, i32::from(b'x')), CaptureState::Paused);
    }

    #[test]
    fn test_key_high_bits_masked() {
        assert_eq!(apply_key(CaptureState::Capturing, 0x100071), CaptureState::Done);
    }
}
