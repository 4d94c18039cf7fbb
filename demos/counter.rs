//! Counter Example - A bound template in a terminal pane
//!
//! This example wires an observable counter to a terminal pane:
//! - `Space` / `+` increments the counter
//! - `-` decrements it
//! - `q` / `Esc` quits
//!
//! Every change re-renders the pane through the binder. Set `RUST_LOG=trace`
//! to see the notify/render events on stderr.
//!
//! Run with: cargo run --example counter

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use spark_bind::{Observable, TemplateBinder, TerminalPane};
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str = "\
spark-bind counter

  Count: %count%
  Last key: %key%

[space/+] increment  [-] decrement  [q] quit";

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(io::stderr)
        .init();

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;

    let result = run();

    execute!(stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    result
}

fn run() -> io::Result<()> {
    let count = Observable::new(0i64);
    let last_key = Observable::new("-".to_string());

    let binder = TemplateBinder::new(TEMPLATE, TerminalPane::stdout(2, 1));
    binder.add_state("count", &count);
    binder.add_state("key", &last_key);
    binder.render().map_err(io::Error::other)?;

    loop {
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if !handle_key(&count, key.code) {
            break;
        }
        last_key.set(format!("{:?}", key.code));
    }

    Ok(())
}

/// Apply one key press to the counter. Returns false when the demo should quit.
fn handle_key(count: &Observable<i64>, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char(' ') | KeyCode::Char('+') => count.update(|n| n.saturating_add(1)),
        KeyCode::Char('-') => count.update(|n| n.saturating_sub(1)),
        _ => {}
    }
    true
}
