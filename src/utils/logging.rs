use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the logging system with the specified log level.
///
/// Logs always go to stderr so stdout stays reserved for the final state.
/// With `with_file`, they are also written to daily rotating files in the
/// "logs" directory.
///
/// # Arguments
///
/// * `log_level` - The desired log level as a string (e.g. "info", "debug", "learnflow=trace")
/// * `with_file` - Whether to also log to a rotating file
pub fn init_logging(log_level: &str, with_file: bool) {
    let filter = match EnvFilter::try_new(log_level) {
        Ok(f) => f,
        Err(_) => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
            EnvFilter::new("info")
        }
    };

    let stderr_layer = fmt::layer()
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if with_file {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "learnflow.log");

        let file_layer = fmt::layer()
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }
}
