use crate::behavior::Behavior;
use log::{debug, trace};
use ndarray::{Array4, Ix3};
use opencv::core::{self, AlgorithmHint, Mat, Rect, Size};
use opencv::imgproc;
use opencv::prelude::*;
use ort::{inputs, Session, SessionBuilder};
use std::error::Error;
use std::path::Path;
use std::time::Instant;

pub const MODEL_INPUT_SIZE: i32 = 640;

/// One candidate box from a single frame.
#[derive(Debug, Clone)]
pub struct Detection {
    pub behavior: Behavior,
    pub confidence: f32,
    pub rect: Rect,
}

pub struct YoloModel {
    session: Session,
    confidence_threshold: f32,
}

impl YoloModel {
    pub fn new(model_path: &Path, confidence_threshold: f32) -> Result<YoloModel, Box<dyn Error>> {
        let session = SessionBuilder::new()?
            .with_intra_threads(1)?
            .with_inter_threads(1)?
            .commit_from_file(model_path)?;

        Ok(YoloModel {
            session,
            confidence_threshold,
        })
    }

    /// Runs the detector on one BGR frame and returns all candidates above
    /// the confidence threshold, in model output order.
    pub fn detect(&self, frame: &Mat) -> Result<Vec<Detection>, Box<dyn Error>> {
        let start = Instant::now();
        let frame_w = frame.cols();
        let frame_h = frame.rows();

        let input = preprocess(frame)?;
        let outputs = self.session.run(inputs![input]?)?;
        let (_name, value) = outputs.first_key_value().ok_or("Model produced no output")?;
        let tensor = value.try_extract_tensor::<f32>()?;
        // output layout is [1, 4 + num_classes, num_candidates]
        let out = tensor.into_dimensionality::<Ix3>()?;

        let rows = out.shape()[1];
        let candidates = out.shape()[2];
        if rows < 5 {
            return Err(format!("Unexpected model output shape {:?}", out.shape()).into());
        }
        let num_classes = rows - 4;

        let sx = frame_w as f32 / MODEL_INPUT_SIZE as f32;
        let sy = frame_h as f32 / MODEL_INPUT_SIZE as f32;

        let mut detections = vec![];
        for i in 0..candidates {
            let mut class_id = 0;
            let mut score = out[[0, 4, i]];
            for c in 1..num_classes {
                let s = out[[0, 4 + c, i]];
                if s > score {
                    score = s;
                    class_id = c;
                }
            }
            if score < self.confidence_threshold {
                continue;
            }
            let Some(behavior) = Behavior::from_class_id(class_id) else {
                trace!("Skipping unknown class id {}", class_id);
                continue;
            };

            let cx = out[[0, 0, i]];
            let cy = out[[0, 1, i]];
            let w = out[[0, 2, i]];
            let h = out[[0, 3, i]];
            let rect = clamp_rect(
                (cx - w / 2.0) * sx,
                (cy - h / 2.0) * sy,
                w * sx,
                h * sy,
                frame_w,
                frame_h,
            );
            detections.push(Detection {
                behavior,
                confidence: score,
                rect,
            });
        }
        debug!("Inference {} candidates in {} ms", detections.len(), start.elapsed().as_millis());
        Ok(detections)
    }
}

/// BGR frame -> 640x640 RGB -> normalized NCHW tensor.
fn preprocess(frame: &Mat) -> Result<Array4<f32>, Box<dyn Error>> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0, AlgorithmHint::ALGO_HINT_DEFAULT)?;
    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;
    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, core::CV_32FC3, 1.0 / 255.0, 0.0)?;

    let size = MODEL_INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    let pixels = float_mat.data_typed::<core::Vec3f>()?;
    for (i, px) in pixels.iter().enumerate() {
        let y = i / size;
        let x = i % size;
        for c in 0..3 {
            tensor[[0, c, y, x]] = px[c];
        }
    }
    Ok(tensor)
}

fn clamp_rect(x: f32, y: f32, w: f32, h: f32, frame_w: i32, frame_h: i32) -> Rect {
    let x = (x.max(0.0) as i32).min(frame_w - 1);
    let y = (y.max(0.0) as i32).min(frame_h - 1);
    let w = (w as i32).clamp(0, frame_w - x);
    let h = (h as i32).clamp(0, frame_h - y);
    Rect::new(x, y, w, h)
}

/// Picks the candidate with the highest confidence. Ties keep the
/// first-seen candidate; an empty set yields None.
pub fn select_top(detections: &[Detection]) -> Option<&Detection> {
    let mut top: Option<&Detection> = None;
    for d in detections {
        match top {
            Some(t) if d.confidence <= t.confidence => {}
            _ => top = Some(d),
        }
    }
    top
}
