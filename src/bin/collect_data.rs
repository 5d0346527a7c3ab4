use clap::Parser;
use log::LevelFilter;
use slackcam::capture::{collect, CollectOptions};
use slackcam::save::IMAGE_BASE_DIR;
use slackcam::Behavior;
use std::path::Path;

/// Collect training images for slacking detection
#[derive(Parser, Debug)]
#[command(name = "collect_data")]
struct Args {
    /// Behavior category to collect data for
    #[arg(long, value_enum)]
    behavior: Behavior,
    /// Number of images to collect
    #[arg(long, default_value_t = 100)]
    num_images: u32,
    /// Delay between captures in seconds
    #[arg(long, default_value_t = 2.0)]
    delay: f32,
    /// Webcam device index
    #[arg(long, default_value_t = 0)]
    camera: i32,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::new().filter_level(LevelFilter::Info).init();
    let args = Args::parse();

    let opts = CollectOptions {
        behavior: args.behavior,
        camera_index: args.camera,
        num_images: args.num_images,
        delay_secs: args.delay,
    };
    collect(&opts, Path::new(IMAGE_BASE_DIR)).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}
