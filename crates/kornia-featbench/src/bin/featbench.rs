use argh::FromArgs;
use std::path::PathBuf;

use kornia_featbench::{
    algorithms::{DescriptorKind, DetectorKind, MatcherKind, SelectorKind},
    backend::OpenCvBackend,
    config::SweepConfig,
    Sweep,
};

/// Benchmark keypoint detector, descriptor and matcher combinations.
#[derive(FromArgs)]
struct Args {
    /// path to a JSON sweep configuration
    #[argh(option)]
    config: Option<PathBuf>,

    /// directory the image sequence is read from
    #[argh(option)]
    image_dir: Option<PathBuf>,

    /// path of the report file
    #[argh(option)]
    report_path: Option<PathBuf>,

    /// author written in the report header
    #[argh(option)]
    author: Option<String>,

    /// date written in the report header
    #[argh(option)]
    date: Option<String>,

    /// detector to benchmark, can be repeated
    #[argh(option)]
    detector: Vec<DetectorKind>,

    /// descriptor to benchmark, can be repeated
    #[argh(option)]
    descriptor: Vec<DescriptorKind>,

    /// matcher to benchmark, can be repeated
    #[argh(option)]
    matcher: Vec<MatcherKind>,

    /// match selector to benchmark, can be repeated
    #[argh(option)]
    selector: Vec<SelectorKind>,

    /// keep at most this many keypoints per image
    #[argh(option)]
    max_keypoints: Option<usize>,

    /// keep the keypoints outside the region of interest
    #[argh(switch)]
    no_region_filter: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match args.config {
        Some(path) => SweepConfig::from_json_file(path)?,
        None => SweepConfig::default(),
    };

    if let Some(image_dir) = args.image_dir {
        config.images.base_path = image_dir;
    }
    if let Some(report_path) = args.report_path {
        config.report.path = report_path;
    }
    if let Some(author) = args.author {
        config.report.metadata.author = author;
    }
    if let Some(date) = args.date {
        config.report.metadata.date = date;
    }
    if !args.detector.is_empty() {
        config.algorithms.detectors = args.detector;
    }
    if !args.descriptor.is_empty() {
        config.algorithms.descriptors = args.descriptor;
    }
    if !args.matcher.is_empty() {
        config.algorithms.matchers = args.matcher;
    }
    if !args.selector.is_empty() {
        config.algorithms.selectors = args.selector;
    }
    if args.max_keypoints.is_some() {
        config.max_keypoints = args.max_keypoints;
    }
    if args.no_region_filter {
        config.region = None;
    }

    let backend = OpenCvBackend::new();
    let sweep = Sweep::new(&backend, config);
    log::info!("Running {} combinations", sweep.combinations().len());

    let stats = sweep.run_and_report()?;
    println!(
        "Wrote {} combinations to {}",
        stats.len(),
        sweep.config().report.path.display()
    );

    Ok(())
}
