use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Maximum log file size before rotation (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Size to keep after rotation (1 MB of most recent logs)
const KEEP_SIZE: u64 = 1024 * 1024;

/// Trim the log file to its last KEEP_SIZE bytes once it exceeds MAX_LOG_SIZE.
fn rotate_log_if_needed(log_path: &Path) -> std::io::Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let metadata = fs::metadata(log_path)?;
    if metadata.len() <= MAX_LOG_SIZE {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    let start_pos = metadata.len().saturating_sub(KEEP_SIZE);

    file.seek(SeekFrom::Start(start_pos))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    drop(file);

    // Skip to the first newline to avoid partial lines
    let skip = buffer
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
    file.write_all(&buffer[skip..])?;

    Ok(())
}

/// Hands out writers to the shared log file
#[derive(Clone)]
struct LogWriterFactory {
    file: Arc<Mutex<File>>,
}

struct LogWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: Arc::clone(&self.file),
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let default_filter = format!("perturb={level},perturb_core={level}");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Initialize logging.
///
/// With a `log_file`, events go only to that file, which is rotated when it
/// grows past 5 MB (the most recent 1 MB is kept). Without one they go to
/// stderr. `RUST_LOG` overrides `level`.
pub fn init_logging(log_file: Option<&Path>, level: &str) -> color_eyre::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    match log_file {
        Some(log_path) => {
            if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }

            if let Err(e) = rotate_log_if_needed(log_path) {
                eprintln!("Warning: Failed to rotate log file: {e}");
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            registry
                .with(
                    fmt::layer()
                        .with_writer(LogWriterFactory {
                            file: Arc::new(Mutex::new(file)),
                        })
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_names(true),
                )
                .init();

            tracing::info!(log_path = %log_path.display(), "Logging initialized");
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .init();
        }
    }

    Ok(())
}
