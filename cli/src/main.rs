pub mod cli;

use std::fs;
use std::sync::Arc;

use clap::Parser;
use pagedb::SqlitePageDb;
use scheduler::loader::PageFreq;
use scheduler::{Scheduler, SchedulerConfig};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_logger("scheduler-cli");

    let cli = Cli::parse();

    let pagedb_url = format!("sqlite://{}?mode=rwc", cli.pagedb_path);
    let pagedb: Arc<dyn pagedb::PageDb> = Arc::new(SqlitePageDb::open(&pagedb_url).await?);

    let mut config = SchedulerConfig::from_env();
    config.schedule_dir = cli
        .schedule_dir
        .clone()
        .unwrap_or_else(|| SchedulerConfig::derive_schedule_dir(&cli.pagedb_path));

    let schedule_dir = config.schedule_dir.clone();
    let scheduler = Scheduler::open(&schedule_dir, pagedb.clone(), config).await?;

    match cli.command {
        Command::LoadSimple => {
            let n = scheduler.load_simple().await?;
            println!("loaded {n} pages into the schedule");
        }

        Command::LoadMmap { path } => {
            let contents = fs::read_to_string(&path)?;
            let mut freqs = Vec::new();
            for (lineno, line) in contents.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut parts = line.split_whitespace();
                let hash_hex = parts
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("line {}: missing hash", lineno + 1))?;
                let freq_str = parts
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("line {}: missing freq", lineno + 1))?;
                let hash = u64::from_str_radix(hash_hex, 16)?;
                let freq: f32 = freq_str.parse()?;
                freqs.push(PageFreq {
                    hash: hash.into(),
                    freq,
                });
            }
            let n = scheduler.load_mmap(&freqs).await?;
            println!("loaded {n} pages into the schedule");
        }

        Command::Request { max_requests } => {
            let result = scheduler.request(max_requests).await?;
            for url in &result.urls {
                println!("{url}");
            }
            if result.interrupt {
                eprintln!("request batch interrupted before {max_requests} entries");
            }
        }

        Command::Dump => {
            let mut stdout = std::io::stdout();
            scheduler.dump(&mut stdout).await?;
        }

        Command::Delete => {
            scheduler.delete().await?;
            println!("schedule deleted");
        }
    }

    Ok(())
}
