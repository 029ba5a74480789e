use std::env;
use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

pub fn init_logger(verbosity: u8) {
    let in_actions = env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
    let runner_debug = env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");

    let level = level_filter(verbosity, in_actions, runner_debug);

    let mut builder = Builder::new();
    builder.filter_level(level);
    // Keep HTTP internals quiet unless explicitly traced.
    builder.filter_module("reqwest", level.min(LevelFilter::Info));

    if in_actions {
        builder.format(|buf, record| {
            writeln!(buf, "{}", workflow_command(record.level(), &record.args().to_string()))
        });
    } else {
        builder.format(|buf, record| {
            let level = record.level();

            let level_label = match level {
                Level::Error => "ERROR".red().bold(),
                Level::Warn  => "WARN ".yellow().bold(),
                Level::Info  => "INFO ".white().bold(),
                Level::Debug => "DEBUG".bright_black(),
                Level::Trace => "TRACE".bright_black(),
            };

            writeln!(
                buf,
                "{} {}",
                level_label,
                record.args()
            )
        });
    }

    builder.init();
}

fn level_filter(verbosity: u8, in_actions: bool, runner_debug: bool) -> LevelFilter {
    let level = match verbosity {
        0 if in_actions => LevelFilter::Info, // step logs should show progress
        0 => LevelFilter::Warn,               // default: warnings and errors
        1 => LevelFilter::Info,               // -v: info and up
        2 => LevelFilter::Debug,              // -vv: debug and up
        _ => LevelFilter::Trace,              // -vvv: trace and up
    };
    // Re-running a job with debug logging enabled sets RUNNER_DEBUG=1.
    if runner_debug {
        level.max(LevelFilter::Debug)
    } else {
        level
    }
}

/// One log record as a GitHub Actions line. Info stays plain step output.
fn workflow_command(level: Level, message: &str) -> String {
    match level {
        Level::Error => format!("::error::{}", escape_command_data(message)),
        Level::Warn => format!("::warning::{}", escape_command_data(message)),
        Level::Info => message.to_string(),
        Level::Debug | Level::Trace => format!("::debug::{}", escape_command_data(message)),
    }
}

/// Workflow commands end at a newline, so multi-line messages must be encoded.
fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_picks_level() {
        assert_eq!(level_filter(0, false, false), LevelFilter::Warn);
        assert_eq!(level_filter(0, true, false), LevelFilter::Info);
        assert_eq!(level_filter(1, false, false), LevelFilter::Info);
        assert_eq!(level_filter(2, false, false), LevelFilter::Debug);
        assert_eq!(level_filter(5, false, false), LevelFilter::Trace);
    }

    #[test]
    fn runner_debug_raises_to_debug_but_never_lowers() {
        assert_eq!(level_filter(0, true, true), LevelFilter::Debug);
        assert_eq!(level_filter(0, false, true), LevelFilter::Debug);
        assert_eq!(level_filter(3, true, true), LevelFilter::Trace);
    }

    #[test]
    fn records_become_workflow_commands() {
        assert_eq!(workflow_command(Level::Error, "boom"), "::error::boom");
        assert_eq!(workflow_command(Level::Warn, "careful\nnow"), "::warning::careful%0Anow");
        assert_eq!(workflow_command(Level::Info, "Fetching 50%"), "Fetching 50%");
        assert_eq!(workflow_command(Level::Debug, "raw"), "::debug::raw");
        assert_eq!(workflow_command(Level::Trace, "deep"), "::debug::deep");
    }

    #[test]
    fn escapes_workflow_command_data() {
        assert_eq!(escape_command_data("plain"), "plain");
        assert_eq!(escape_command_data("100% done\r\nnext"), "100%25 done%0D%0Anext");
    }
}
