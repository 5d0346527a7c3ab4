use log::LevelFilter;
use slackcam::detector;
use slackcam::DetectorConfig;

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::new().filter_level(LevelFilter::Info).init();

    let config = DetectorConfig::default();
    detector::run(&config).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    println!("Program terminated successfully");
    Ok(())
}
