// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::{Args, Parser};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::process::ExitCode;

use crate::fsevents::protocol::{DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_DEPTH, EventKind};

use super::watch;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonOptions,

    #[command(flatten)]
    watch: WatchOptions,
}

#[derive(Args, Debug)]
pub struct CommonOptions {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Args, Debug)]
pub struct WatchOptions {
    /// Event kind to report; may be repeated. Defaults to every kind.
    #[arg(value_enum, long = "event", value_name = "KIND")]
    pub events: Vec<EventKind>,

    /// Bytes requested from the kernel queue per read
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Events the kernel will hold for us before discarding the oldest
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH)]
    pub queue_depth: i32,
}

pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();
    // Diagnostics go to stderr; stdout carries only the event stream.
    TermLogger::init(
        cli.common.verbose.log_level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .unwrap();

    watch::cli(&cli.watch)
}
