// src/bin/demo.rs

//! Minimal interactive demo against the system engine.
//!
//! Writes a banner on the standard plane, then echoes decoded input events
//! until `q` or an exit key. Pass a JSON options file as the only argument
//! to override session defaults.

use anyhow::{Context as _, Result};
use log::info;
use termsurface::{Context, EventCode, KeySymbol, SessionOptions};

fn load_options() -> Result<SessionOptions> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read options file {}", path))?;
            SessionOptions::from_json_str(&json)
                .with_context(|| format!("failed to parse options file {}", path))
        }
        None => Ok(SessionOptions::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = load_options()?;
    let ctx = Context::new_native(&options).context("failed to start engine session")?;
    info!("engine version: {}", ctx.version());

    let plane = ctx.standard_plane()?;
    let (rows, cols) = plane.dimensions()?;
    plane.set_foreground_rgb(0, 208, 255)?;
    plane.put_str_yx(&format!("termsurface demo: {} rows x {} cols", rows, cols), 0, 0)?;
    plane.put_str_yx("press keys to echo them, 'q' to quit", 1, 0)?;
    ctx.render()?;

    loop {
        let event = ctx.get_input_blocking().context("input read failed")?;
        match event.code {
            EventCode::Char('q') | EventCode::Key(KeySymbol::Exit) => break,
            EventCode::Char(c) => {
                plane.put_str_yx(&format!("char: {:?} (seq {})     ", c, event.seqnum), 3, 0)?;
            }
            EventCode::Key(sym) => {
                plane.put_str_yx(
                    &format!("key: {} at ({}, {})     ", sym.name(), event.row, event.col),
                    3,
                    0,
                )?;
            }
        }
        ctx.render()?;
    }

    ctx.stop().context("engine session failed to stop cleanly")?;
    Ok(())
}
