#![forbid(unsafe_code)]

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use ext2_inspect::{Error, ErrorKind, Ext2Inspector, FileDevice, FsReport, InspectConfig, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// 日志级别环境变量（off|error|warn|info|debug|trace）
const LOG_ENV: &str = "EXT2_INSPECT_LOG";
/// 块缓存大小环境变量
const CACHE_ENV: &str = "EXT2_INSPECT_CACHE_BLOCKS";

const USAGE_COMPLAINT: &str = "Sorry, but something's not quite right about your invocation.";

#[derive(Parser)]
#[command(
    name = "ext2-inspect",
    version,
    about = "Print the structure of an ext2 disk image: superblock, groups, root directory"
)]
struct Cli {
    /// Path to the ext2 image file.
    image: PathBuf,
}

// ── Logging ─────────────────────────────────────────────────────────────────

/// 只写 stderr 的日志实现，stdout 留给报告
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn init_logger() {
    let level = match env::var(LOG_ENV) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            eprintln!("{LOG_ENV}={value:?} is not a log level, using warn");
            LevelFilter::Warn
        }),
        Err(_) => LevelFilter::Warn,
    };

    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

// ── Configuration ───────────────────────────────────────────────────────────

fn load_config() -> InspectConfig {
    let mut config = InspectConfig::default();
    if let Ok(value) = env::var(CACHE_ENV) {
        match value.trim().parse::<u32>() {
            Ok(blocks) => config.bcache_size = blocks,
            Err(_) => log::warn!(
                "{}={:?} is not a block count, keeping {}",
                CACHE_ENV,
                value,
                config.bcache_size
            ),
        }
    }
    config
}

// ── Main ────────────────────────────────────────────────────────────────────

fn inspect(image: &Path, config: InspectConfig) -> Result<FsReport> {
    let device = FileDevice::open(image)?;
    let mut inspector = Ext2Inspector::open(device, config)?;
    inspector.report()
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(
            err.kind(),
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
        ) =>
        {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let reason = err.kind().as_str().unwrap_or("bad arguments");
            let invocation = Error::new(ErrorKind::Invocation, reason);
            eprintln!("{USAGE_COMPLAINT}");
            eprintln!("error: {invocation}");
            eprintln!("usage: ext2-inspect <IMAGE>");
            return ExitCode::FAILURE;
        }
    };

    init_logger();
    let config = load_config();
    log::debug!("[main] inspecting {} with {:?}", cli.image.display(), config);

    let report = match inspect(&cli.image, config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(err) = write!(stdout, "{report}").and_then(|()| stdout.flush()) {
        eprintln!("error: {}", Error::from(err));
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
