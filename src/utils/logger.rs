use chrono::Utc;
use log::info;
use std::io::Write;

/// Install the `env_logger` backend. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder
        .parse_filters(level)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });
    // a second init (tests, embedding) keeps the first logger
    if builder.try_init().is_ok() {
        info!("Logger initialized at level {}", level);
    }
}
