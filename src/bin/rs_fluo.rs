// std
use std::io::Stdout;
use std::path::PathBuf;
// others
use anyhow::Context;
use clap::Parser;
use log::info;
use pbr::ProgressBar;
// fluo
use rs_fluo::core::api::{parse_file, pbrt_init, ApiState, RenderSetup};
use rs_fluo::core::error::FluoError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse a scene file and run its photon simulation (or render it).
#[derive(Parser)]
#[command(name = "rs_fluo", version)]
struct Cli {
    /// use specified number of threads (0: all cores)
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: u8,
    /// The path to the scene file to read
    path: PathBuf,
}

/// Drives a progress bar from the `(done, total)` callback. A new
/// total starts a new bar.
struct Progress {
    bar: Option<(u64, ProgressBar<Stdout>)>,
}

impl Progress {
    fn update(&mut self, done: u64, total: u64) {
        let stale: bool = match &self.bar {
            Some((t, _)) => *t != total,
            None => true,
        };
        if stale {
            self.finish();
            self.bar = Some((total, ProgressBar::new(total)));
        }
        if let Some((_, pb)) = &mut self.bar {
            pb.set(done);
        }
    }
    fn finish(&mut self) {
        if let Some((_, mut pb)) = self.bar.take() {
            pb.finish();
        }
    }
}

fn run(setup: &mut RenderSetup, number_of_threads: u8) -> Result<(), FluoError> {
    let mut progress: Progress = Progress { bar: None };
    let result = setup.run(number_of_threads, &mut |done, total| progress.update(done, total));
    progress.finish();
    if let Some(report) = result? {
        print!("{}", report);
        println!("Simulation done!");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    // handle command line options
    let args: Cli = Cli::parse();
    let number_of_threads: u8 = args.nthreads;
    let num_cores: usize = num_cpus::get();
    println!("fluo version {} [Detected {} cores]", VERSION, num_cores);
    let mut api_state: ApiState = pbrt_init(number_of_threads);
    parse_file(&args.path, &mut api_state)
        .with_context(|| format!("reading scene {}", args.path.display()))?;
    if api_state.render_setups.is_empty() {
        info!("No WorldEnd in {}, nothing to do", args.path.display());
    }
    for setup in api_state.render_setups.iter_mut() {
        match run(setup, number_of_threads) {
            Ok(()) => {}
            Err(e) if e.is_missing_requirement() => {
                // nothing to simulate is not a failure
                println!("{}", e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
