use std::io::Write;

use anstyle::{AnsiColor, Color, RgbColor, Style};

/// 使用默认的 `Info` 级别初始化日志
pub fn init_log() {
    init_log_with_level(log::LevelFilter::Info);
}

/// 初始化日志，`RUST_LOG` 环境变量中的过滤规则会覆盖 `level`
///
/// 重复调用不会 panic，只会保留第一次的配置（测试中经常出现重复初始化）。
pub fn init_log_with_level(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter(None, level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    let result = builder
        .format(|buf, record| {
            let level_style = level_style(record.level());
            let dim_style = Style::new().fg_color(Some(Color::Rgb(RgbColor(110, 110, 110))));

            let time = chrono::Local::now().format("%H:%M:%S%.3f");
            let level = record.level();
            let target = record.module_path().unwrap_or_else(|| record.target());
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "{level_style}[{time}] {level:<5}{level_style:#} {dim_style}[{target}:{line}]{dim_style:#} {}",
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("logger already initialized, keep the previous one");
    }
}

fn level_style(level: log::Level) -> Style {
    let color = match level {
        log::Level::Error => AnsiColor::Red,
        log::Level::Warn => AnsiColor::Yellow,
        log::Level::Info => AnsiColor::Green,
        log::Level::Debug => AnsiColor::Cyan,
        log::Level::Trace => AnsiColor::BrightBlack,
    };
    Style::new().fg_color(Some(Color::Ansi(color)))
}
