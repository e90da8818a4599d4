use clap::Parser;
use log::{error, info};

use lisa2coco::{merge_dataset, MergeArgs};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = MergeArgs::parse();

    info!(
        "Merging LISA clip annotations from {}...",
        args.dataset_root.display()
    );

    if let Err(e) = merge_dataset(&args.dataset_root, &args.output_dir, args.include_night) {
        error!("Failed to merge annotations: {}", e);
        std::process::exit(1);
    }
    info!("Merge completed successfully.");
}
