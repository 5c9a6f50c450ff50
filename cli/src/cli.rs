use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "scheduler-cli", version, about = "Admin CLI for the frequency-driven URL schedule")]
pub struct Cli {
    /// Path to the PageDB SQLite database.
    #[clap(long, default_value = "./pagedb.sqlite3")]
    pub pagedb_path: String,

    /// Schedule directory. Defaults to "<pagedb_path>_freqs".
    #[clap(long)]
    pub schedule_dir: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the schedule from PageDB's full page stream.
    LoadSimple,

    /// Load the schedule from a flat `hash freq` text file, standing in
    /// for the caller-supplied frequency array.
    LoadMmap {
        /// Each line is `<hash-hex> <freq>`, e.g. "000000000000002a 1.5".
        path: PathBuf,
    },

    /// Dequeue up to `max_requests` URLs and print them, one per line.
    Request {
        #[clap(long, default_value = "10")]
        max_requests: u64,
    },

    /// Print the schedule's contents in ascending `(score, hash)` order.
    Dump,

    /// Close the schedule, removing it from disk unless persisted.
    Delete,
}
