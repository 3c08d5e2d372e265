pub mod classify;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod io_utils;
pub mod key;
pub mod order;
pub mod reorder;
pub mod sort_spec;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    classify::ClassifiedValue,
    error::ReorderError,
    key::{CompositeKey, SortPlan},
    order::order_rows,
    sort_spec::{ColumnHint, LanguageOptions, SortColumn, SortSpec},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_reorder", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Reorder(args) => reorder::execute(&args),
        Commands::Probe(args) => reorder::probe(&args),
    }
}
