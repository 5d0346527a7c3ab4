use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DetectorConfig {
    pub camera_index: i32,
    pub model_path: String,
    pub confidence_threshold: f32,
    pub slacking_frame_threshold: u32,
    pub alarm_duration_secs: u64,
    pub tone_frequency_hz: f32,
    pub tone_duration_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            camera_index: 0,
            model_path: "runs/detect/train2/weights/best.onnx".to_string(),
            confidence_threshold: 0.25,   // drop weak candidates before the top pick
            slacking_frame_threshold: 20, // consecutive slacking frames before the alarm
            alarm_duration_secs: 3,
            tone_frequency_hz: 2500.0,
            tone_duration_ms: 3000,
        }
    }
}
