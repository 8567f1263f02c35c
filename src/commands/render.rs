//! Console output for the CLI
//!
//! Thread ids are shown as fixed-width hexadecimal tokens, dimmed while the
//! target is suspended.

use crate::core::{FreezeState, Target};
use crate::freeze::{format_remaining, FreezeReport};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

const TOKEN_SEPARATOR: &str = "  ";

const BANNER: [&str; 5] = [
    " ██████  ████████  █████        ██████  ██████  ██      ",
    "██          ██    ██   ██       ██   ██ ██   ██ ██      ",
    "██   ███    ██    ███████ █████ ██████  ██████  ██      ",
    "██    ██    ██    ██   ██       ██      ██      ██      ",
    " ██████     ██    ██   ██       ██      ██      ███████ ",
];

pub fn banner() {
    for line in BANNER {
        println!("{}", line.cyan());
    }
    println!("{}", concat!("gtappl v", env!("CARGO_PKG_VERSION")).yellow());
}

pub fn status(message: &str) {
    println!("{}", message.magenta().bold());
}

pub fn failure(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Thread tokens laid out in rows no wider than `width` columns
pub fn thread_rows(target: &Target, width: usize) -> Vec<String> {
    let tokens: Vec<String> = target.threads().map(|t| t.to_string()).collect();
    wrap_tokens(&tokens, width)
}

fn wrap_tokens(tokens: &[String], width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();

    for token in tokens {
        let needed = if row.is_empty() {
            token.len()
        } else {
            row.len() + TOKEN_SEPARATOR.len() + token.len()
        };
        if !row.is_empty() && needed > width {
            rows.push(std::mem::take(&mut row));
        }
        if !row.is_empty() {
            row.push_str(TOKEN_SEPARATOR);
        }
        row.push_str(token);
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

pub fn print_threads(target: &Target, width: usize) {
    let suspended = target.state() == FreezeState::Suspended;
    for row in thread_rows(target, width) {
        if suspended {
            println!("{}", row.dimmed());
        } else {
            println!("{}", row);
        }
    }
}

/// First listing after a scan: tokens appear one by one
pub fn reveal_threads(target: &Target, width: usize, delay: Duration) {
    let rows = thread_rows(target, width);
    // Console write failures only cost the animation
    let _ = write_paced(&mut io::stdout().lock(), &rows, delay);
}

fn write_paced<W: Write>(out: &mut W, rows: &[String], delay: Duration) -> io::Result<()> {
    for row in rows {
        for (index, token) in row.split(TOKEN_SEPARATOR).enumerate() {
            if index > 0 {
                out.write_all(TOKEN_SEPARATOR.as_bytes())?;
            }
            out.write_all(token.as_bytes())?;
            out.flush()?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        out.write_all(b"\n")?;
    }
    out.flush()
}

pub fn print_processes(target: &Target) {
    println!(
        "{} {} ({} processes, {} threads)",
        "target".cyan(),
        target.name().bold(),
        target.processes().len(),
        target.thread_count()
    );
    for process in target.processes() {
        println!(
            "  {} {}  {} threads",
            "pid".cyan(),
            process,
            process.threads().len()
        );
    }
}

/// Countdown display driven by the freeze loop ticks
pub fn countdown(total: Duration) -> ProgressBar {
    let bar = ProgressBar::new(total.as_millis() as u64);
    let style = ProgressStyle::with_template("{spinner:.green} {msg:.green} [{bar:30.green/white}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(format_remaining(total));
    bar
}

pub fn update_countdown(bar: &ProgressBar, total: Duration, remaining: Duration) {
    bar.set_position(total.saturating_sub(remaining).as_millis() as u64);
    bar.set_message(format_remaining(remaining));
}

pub fn print_report(report: &FreezeReport) {
    if report.succeeded() {
        let note = if report.interrupted {
            " (interrupted)"
        } else {
            ""
        };
        status(&format!(
            "public/private lobby generated: {} frozen for {:.2}s{}",
            report.target,
            report.frozen_for.as_secs_f64(),
            note
        ));
    } else {
        let stage = if report.suspended { "resume" } else { "suspend" };
        let pid = report
            .failed_pid
            .map(|pid| format!(" at pid {pid:04X}"))
            .unwrap_or_default();
        failure(&format!("{} of {} failed{}", stage, report.target, pid));
    }
}
