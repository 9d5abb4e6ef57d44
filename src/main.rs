use{
    std::{
        time::Instant,
        num::NonZeroUsize,
    },
    structopt::StructOpt,
    indicatif::*,
    simple_logger::SimpleLogger,
    log::LevelFilter,
    crate::error::*,
};

pub mod error;
pub mod sir_model;
pub mod misc_types;
pub mod stats_methods;
pub mod json_parsing;
pub mod attack_orderings;
pub mod vaccination_methods;
pub mod compute_orderings;
pub mod simple_sampling;
pub mod simplecurves;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    // RUST_LOG overrides the level
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("unable to initialize logging: {e}");
    }
    let start_time = Instant::now();
    let opt = CmdOption::from_args();
    log::info!("sir_vaccine v{VERSION}");
    let res = match opt{
        CmdOption::Orderings(o) => o.execute(),
        CmdOption::Simulate(o) => o.execute(),
    };
    if let Err(e) = res {
        log::error!("{e}");
        std::process::exit(1);
    }
    log::info!("Execution took {}", humantime::format_duration(start_time.elapsed()))
}

pub fn indication_bar(len: u64) -> ProgressBar
{
        // for indication on when it is finished
        let bar = ProgressBar::new(len);
        bar.set_style(ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise} - {eta_precise}] {wide_bar}"));
        bar
}

/// Limits the global rayon pool, rayon's default is kept if None
pub fn set_num_threads(num_threads: Option<NonZeroUsize>) -> SirResult<()>
{
    if let Some(j) = num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(j.get())
            .build_global()
            .map_err(|e| SirError::Config(format!("unable to build thread pool: {e}")))?;
    }
    Ok(())
}


#[derive(Debug, StructOpt, Clone)]
#[structopt(about = "Attack orderings, vaccination strategies and SIR simulations on networks")]
pub enum CmdOption
{
    Orderings(compute_orderings::Orderings),
    Simulate(simple_sampling::Simulate),
}
