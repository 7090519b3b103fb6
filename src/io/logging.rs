use std::fs::OpenOptions;

use env_logger::{Builder, Env, Target};

use crate::model::config::LogConfig;

/// Where log records may go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Command-line use: the configured file, else stderr
    Stderr,
    /// Full-screen use: the configured file, else nowhere
    FileOnly,
}

/// Install the global logger. `RUST_LOG` overrides `[log] level`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(config: &LogConfig, sink: LogSink) -> std::io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    match (&config.file, sink) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
            builder.write_style(env_logger::WriteStyle::Never);
        }
        (None, LogSink::Stderr) => {
            builder.target(Target::Stderr);
        }
        // Writing to the terminal would corrupt the screen
        (None, LogSink::FileOnly) => return Ok(()),
    }
    let _ = builder.try_init();
    Ok(())
}
