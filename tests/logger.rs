use std::fs;

use daylog::{logging::DefaultFormatter, Builder, Config, Flags};
use log::{LevelFilter, Log};

fn emit(logger: &impl Log, level: log::Level, msg: &str) {
    logger.log(
        &log::Record::builder()
            .args(format_args!("{}", msg))
            .level(level)
            .build(),
    );
}

fn plain_config() -> Config {
    Config {
        use_ansi: false,
        datetime_format: "TS".to_string(),
        ..Config::new()
    }
}

#[test]
fn file_sink_writes_formatted_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let logger = Builder::new()
        .with_level(LevelFilter::Info)
        .with_config(plain_config())
        .with_prefix("app: ")
        .with_file_sink(&path)
        .build()
        .unwrap();

    emit(&logger, log::Level::Info, "listening");
    emit(&logger, log::Level::Debug, "too chatty");
    logger.flush();

    assert_eq!(fs::read_to_string(&path).unwrap(), "app: [TS] INF: listening\n");
}

#[cfg(unix)]
#[test]
fn file_sink_creates_files_like_the_rotating_sink() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let logger = Builder::new()
        .with_level(LevelFilter::Info)
        .with_config(plain_config())
        .with_file_sink(&path)
        .build()
        .unwrap();
    emit(&logger, log::Level::Info, "created");

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode & !0o644, 0, "mode {:o} is wider than 0644", mode);
}

#[test]
fn file_sink_colors_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let logger = Builder::new()
        .with_level(LevelFilter::Trace)
        .with_config(plain_config())
        .with_color(true)
        .with_color_config(vec![String::new(), String::new(), "<W>".to_string()])
        .with_file_sink(&path)
        .build()
        .unwrap();

    emit(&logger, log::Level::Error, "bad");
    emit(&logger, log::Level::Warn, "odd");

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "\x1b[31m[TS] ERR: bad\x1b[0m\n<W>[TS] WRN: odd\x1b[0m\n"
    );
}

#[test]
fn rotating_sink_writes_to_dated_file() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("svc.log");

    let logger = Builder::new()
        .with_level(LevelFilter::Info)
        .with_config(plain_config())
        .with_flags(Flags::NONE)
        .with_formatter(|config| Box::new(DefaultFormatter::new(config)))
        .with_rotating_file_sink(&base)
        .build()
        .unwrap();

    emit(&logger, log::Level::Warn, "rotating");
    logger.flush();

    let written: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("svc.log."));
    assert_eq!(written[0].len(), "svc.log.".len() + "YYYY-MM-DD".len());

    let contents = fs::read_to_string(dir.path().join(&written[0])).unwrap();
    assert_eq!(contents, "[TS] WRN: rotating\n");
}
