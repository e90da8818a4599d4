use clap::Parser;
use log::{error, info};

use lisa2coco::{convert_dataset, ConvertArgs};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ConvertArgs::parse();

    info!("Starting LISA to COCO conversion process...");

    let config = args.to_convert_config();
    let paths = args.to_convert_paths();

    match convert_dataset(&paths, &config) {
        Ok(written) => info!(
            "COCO conversion process completed successfully ({} files written).",
            written.len()
        ),
        Err(e) => {
            error!("Failed to convert dataset: {}", e);
            std::process::exit(1);
        }
    }
}
