//! `-v` / `-q` counting flags mapped onto a tracing level, starting from INFO.

use tracing::{level_filters::LevelFilter, Level};

const DEFAULT_VERBOSITY: i8 = 2;

#[derive(clap::Args, Debug, Clone)]
pub struct Verbosity {
    /// More output per occurrence
    #[clap(long, short = 'v', parse(from_occurrences), global = true)]
    verbose: i8,

    /// Less output per occurrence
    #[clap(
        long,
        short = 'q',
        parse(from_occurrences),
        global = true,
        conflicts_with = "verbose"
    )]
    quiet: i8,
}

impl Verbosity {
    pub fn log_level_filter(&self) -> LevelFilter {
        match DEFAULT_VERBOSITY - self.quiet + self.verbose {
            i8::MIN..=-1 => LevelFilter::OFF,
            0 => LevelFilter::from_level(Level::ERROR),
            1 => LevelFilter::from_level(Level::WARN),
            2 => LevelFilter::from_level(Level::INFO),
            3 => LevelFilter::from_level(Level::DEBUG),
            4..=i8::MAX => LevelFilter::from_level(Level::TRACE),
        }
    }
}
