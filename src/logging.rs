//! Logging init: configured log file, or graceful fallback to stderr.

use crate::config::LogConfig;
use anyhow::Result;
use std::fs;
use std::io;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Initialize structured logging per `cfg`.
///
/// `RUST_LOG` overrides the configured level when set. With `cfg.file` set,
/// output goes to that file in append mode with ANSI colors disabled;
/// otherwise to stderr. Should the file handle clone ever fail mid-run, that
/// log line falls back to stderr instead of panicking.
pub fn init_logging(cfg: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level().to_string()));

    match &cfg.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = fs::OpenOptions::new().create(true).append(true).open(path)?;

            struct FileMakeWriter(std::fs::File);

            impl<'a> MakeWriter<'a> for FileMakeWriter {
                type Writer = FileOrStderr;

                fn make_writer(&'a self) -> Self::Writer {
                    self.0
                        .try_clone()
                        .map(FileOrStderr::File)
                        .unwrap_or(FileOrStderr::Stderr)
                }
            }

            let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();

            tracing::info!("kvsum logging initialized at {}", path.display());
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_or_stderr_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();

        let mut w = FileOrStderr::File(file);
        w.write_all(b"line\n").unwrap();
        w.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn file_or_stderr_stderr_fallback_is_writable() {
        // The fallback path must accept writes rather than panic.
        let mut w = FileOrStderr::Stderr;
        assert_eq!(w.write(b"").unwrap(), 0);
        w.flush().unwrap();
    }
}
