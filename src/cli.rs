use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use slabtrace::config::Config;
use slabtrace::scene::SceneKind;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser)]
#[command(name = "slabtrace")]
#[command(about = "Build a BVH over a scene and trace random rays through it")]
pub struct Args {
    /// TOML config file (defaults to slabtrace.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Scene to build
    #[arg(long)]
    pub scene: Option<SceneKind>,

    /// Number of random rays to trace
    #[arg(long, short = 'n')]
    pub rays: Option<usize>,

    /// Seed for scene and ray generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Primitive count for the random-mix scene
    #[arg(long)]
    pub objects: Option<usize>,

    /// Skip the brute-force comparison
    #[arg(long)]
    pub no_verify: bool,
}

impl Args {
    /// Apply command line overrides on top of a loaded config.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(scene) = self.scene {
            config.scene = scene;
        }
        if let Some(rays) = self.rays {
            config.rays = rays;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(objects) = self.objects {
            config.objects = objects;
        }
        if self.no_verify {
            config.verify = false;
        }
        config
    }
}
