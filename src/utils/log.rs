use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::process;

pub fn parse_level(level: &str) -> LevelFilter {
    match level {
        level if level.eq_ignore_ascii_case("off") => LevelFilter::Off,
        level if level.eq_ignore_ascii_case("error") => LevelFilter::Error,
        level if level.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        level if level.eq_ignore_ascii_case("info") => LevelFilter::Info,
        level if level.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        level if level.eq_ignore_ascii_case("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

/// 日志只写文件，避免和命令输出混在终端里
pub fn init_logger(config: &Config) {
    let level = parse_level(&config.logger_level);

    let mut builder = Builder::new();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[PID:{}][{}] {} - {}",
            process::id(),
            record.level(),
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.args()
        )
    });

    match open_log_file(&config.logger_dir) {
        Ok(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .filter(Some(&config.name), level)
                .filter(None, LevelFilter::Warn);
        }
        Err(e) => {
            eprintln!(
                "pipesh: cannot open log file in {}: {}",
                config.logger_dir.display(),
                e
            );
            builder
                .target(Target::Stderr)
                .filter(None, LevelFilter::Error);
        }
    }

    if builder.try_init().is_ok() {
        log::debug!("日志级别设置为: {}", level);
    }
}

fn open_log_file(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    let date = Local::now().format("%Y-%m-%d");
    let log_file = dir.join(format!("pipesh_{}.log", date));
    File::options().create(true).append(true).open(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("trace"), LevelFilter::Trace);
        assert_eq!(parse_level("Off"), LevelFilter::Off);
        assert_eq!(parse_level("verbose"), LevelFilter::Warn);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_log_file_is_dated_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        {
            let mut file = open_log_file(&nested).unwrap();
            writeln!(file, "first").unwrap();
        }
        {
            let mut file = open_log_file(&nested).unwrap();
            writeln!(file, "second").unwrap();
        }

        let name = format!("pipesh_{}.log", Local::now().format("%Y-%m-%d"));
        let content = fs::read_to_string(nested.join(name)).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
