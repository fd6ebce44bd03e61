// src/engine/mock.rs

//! In-memory engine drivers.
//!
//! Used by the test suite and for headless runs. The mock records every
//! write instead of rendering, serves input from a queue pushed by the
//! test, and honors the driver contract that a pending blocking read
//! unblocks with an error once the session stops.
//!
//! Handles are cheap clones over shared state, so a test can keep one half
//! to inspect while the other half is owned by a `Context`.

use crate::channel::Channels;
use crate::config::SessionOptions;
use crate::engine::{Align, DirectEngine, Engine, RawInput, SurfaceId};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// One recorded surface of the mock session.
#[derive(Debug, Clone)]
pub struct MockSurface {
    /// Origin within the parent, (row, col).
    pub origin: (u32, u32),
    pub rows: u32,
    pub cols: u32,
    /// Cursor after the last write, (row, col).
    pub cursor: (u32, u32),
    /// Working color state, updated through the channel codec.
    pub channels: Channels,
    /// Clipped text writes with their resolved positions.
    pub writes: Vec<(u32, u32, String)>,
    /// Recorded polyfill seeds.
    pub fills: Vec<(u32, u32, char)>,
    /// Number of erase calls.
    pub erased: u32,
}

impl MockSurface {
    fn new(origin: (u32, u32), rows: u32, cols: u32) -> Self {
        MockSurface {
            origin,
            rows,
            cols,
            cursor: (0, 0),
            channels: Channels::new(),
            writes: Vec::new(),
            fills: Vec::new(),
            erased: 0,
        }
    }
}

#[derive(Debug)]
struct MockState {
    started: bool,
    stopped: bool,
    fail_stop: bool,
    options: Option<SessionOptions>,
    surfaces: Vec<MockSurface>,
    inputs: VecDeque<RawInput>,
    render_count: u32,
    mouse_enabled: bool,
    cursor_visible: bool,
}

#[derive(Debug)]
struct MockInner {
    state: Mutex<MockState>,
    input_ready: Condvar,
}

/// In-memory rendering session. Surface 0 is the standard surface.
#[derive(Debug, Clone)]
pub struct MockEngine {
    inner: Arc<MockInner>,
}

impl MockEngine {
    /// A session whose standard surface has the given size.
    pub fn new(rows: u32, cols: u32) -> Self {
        MockEngine {
            inner: Arc::new(MockInner {
                state: Mutex::new(MockState {
                    started: false,
                    stopped: false,
                    fail_stop: false,
                    options: None,
                    surfaces: vec![MockSurface::new((0, 0), rows, cols)],
                    inputs: VecDeque::new(),
                    render_count: 0,
                    mouse_enabled: false,
                    cursor_visible: false,
                }),
                input_ready: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.state.lock().expect("mock engine state poisoned")
    }

    /// Queues a raw event for `get_input_blocking`, waking a pending read.
    pub fn push_input(&self, raw: RawInput) {
        self.lock().inputs.push_back(raw);
        self.inner.input_ready.notify_all();
    }

    /// Makes the next `stop` report an I/O failure after tearing down.
    pub fn set_fail_stop(&self, fail: bool) {
        self.lock().fail_stop = fail;
    }

    /// Snapshot of one surface's recorded state.
    pub fn surface(&self, surface: SurfaceId) -> Option<MockSurface> {
        self.lock().surfaces.get(surface.0 as usize).cloned()
    }

    pub fn render_count(&self) -> u32 {
        self.lock().render_count
    }

    pub fn mouse_enabled(&self) -> bool {
        self.lock().mouse_enabled
    }

    pub fn session_options(&self) -> Option<SessionOptions> {
        self.lock().options.clone()
    }

    fn live(state: &MockState) -> bool {
        state.started && !state.stopped
    }
}

fn resolve_axis(pos: i32, cursor: u32) -> u32 {
    if pos < 0 {
        cursor
    } else {
        pos as u32
    }
}

/// Clipped write shared by the positioned and aligned entry points.
fn write_at(surface: &mut MockSurface, text: &str, row: u32, col: u32) -> u32 {
    if row >= surface.rows || col >= surface.cols {
        return 0;
    }
    let cells = (text.chars().count() as u32).min(surface.cols - col);
    let clipped: String = text.chars().take(cells as usize).collect();
    surface.writes.push((row, col, clipped));
    surface.cursor = (row, col + cells);
    cells
}

impl Engine for MockEngine {
    fn init(&self, options: &SessionOptions) -> Result<()> {
        let mut state = self.lock();
        if state.started {
            return Err(Error::EngineInit("engine already started".into()));
        }
        state.started = true;
        state.options = Some(options.clone());
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut state = self.lock();
        if state.stopped {
            return Ok(());
        }
        state.stopped = true;
        let fail = state.fail_stop;
        drop(state);
        // Wake a pending blocking read so it can observe the stop.
        self.inner.input_ready.notify_all();
        if fail {
            return Err(Error::Render("simulated teardown failure".into()));
        }
        Ok(())
    }

    fn render(&self) -> Result<()> {
        let mut state = self.lock();
        if !Self::live(&state) {
            return Err(Error::StaleHandle);
        }
        state.render_count += 1;
        Ok(())
    }

    fn standard_surface(&self) -> Result<SurfaceId> {
        let state = self.lock();
        if !Self::live(&state) {
            return Err(Error::StaleHandle);
        }
        Ok(SurfaceId(0))
    }

    fn dimensions(&self, surface: SurfaceId) -> Result<(u32, u32)> {
        let state = self.lock();
        let s = state
            .surfaces
            .get(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        Ok((s.rows, s.cols))
    }

    fn put_str(&self, surface: SurfaceId, text: &str, row: i32, col: i32) -> Result<u32> {
        let mut state = self.lock();
        let s = state
            .surfaces
            .get_mut(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        let row = resolve_axis(row, s.cursor.0);
        let col = resolve_axis(col, s.cursor.1);
        Ok(write_at(s, text, row, col))
    }

    fn put_str_aligned(
        &self,
        surface: SurfaceId,
        text: &str,
        row: i32,
        align: Align,
    ) -> Result<u32> {
        let mut state = self.lock();
        let s = state
            .surfaces
            .get_mut(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        let row = resolve_axis(row, s.cursor.0);
        let len = text.chars().count() as u32;
        let col = match align {
            Align::Unaligned => s.cursor.1,
            Align::Left => 0,
            Align::Center => s.cols.saturating_sub(len) / 2,
            Align::Right => s.cols.saturating_sub(len),
        };
        Ok(write_at(s, text, row, col))
    }

    fn polyfill(&self, surface: SurfaceId, row: u32, col: u32, glyph: char) -> Result<u32> {
        let mut state = self.lock();
        let s = state
            .surfaces
            .get_mut(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        if row >= s.rows || col >= s.cols {
            return Ok(0);
        }
        s.fills.push((row, col, glyph));
        // The mock surface is uniform, so a fill always covers it whole.
        Ok(s.rows * s.cols)
    }

    fn erase(&self, surface: SurfaceId) -> Result<()> {
        let mut state = self.lock();
        let s = state
            .surfaces
            .get_mut(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        s.writes.clear();
        s.fills.clear();
        s.cursor = (0, 0);
        s.erased += 1;
        Ok(())
    }

    fn set_foreground_rgb(&self, surface: SurfaceId, red: i32, green: i32, blue: i32) -> Result<()> {
        let mut state = self.lock();
        let s = state
            .surfaces
            .get_mut(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        s.channels = s.channels.set_foreground_rgb(red, green, blue);
        Ok(())
    }

    fn set_background_rgb(&self, surface: SurfaceId, red: i32, green: i32, blue: i32) -> Result<()> {
        let mut state = self.lock();
        let s = state
            .surfaces
            .get_mut(surface.0 as usize)
            .ok_or(Error::StaleHandle)?;
        s.channels = s.channels.set_background_rgb(red, green, blue);
        Ok(())
    }

    fn create_child_surface(
        &self,
        parent: SurfaceId,
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    ) -> Result<SurfaceId> {
        let mut state = self.lock();
        if state.surfaces.get(parent.0 as usize).is_none() {
            return Err(Error::StaleHandle);
        }
        state.surfaces.push(MockSurface::new((row, col), rows, cols));
        Ok(SurfaceId(state.surfaces.len() as u64 - 1))
    }

    fn enable_mouse(&self) -> Result<()> {
        self.lock().mouse_enabled = true;
        Ok(())
    }

    fn disable_mouse(&self) -> Result<()> {
        self.lock().mouse_enabled = false;
        Ok(())
    }

    fn enable_cursor(&self, _row: u32, _col: u32) -> Result<()> {
        self.lock().cursor_visible = true;
        Ok(())
    }

    fn disable_cursor(&self) -> Result<()> {
        self.lock().cursor_visible = false;
        Ok(())
    }

    fn get_input_blocking(&self) -> Result<RawInput> {
        let mut state = self.lock();
        loop {
            if state.stopped {
                return Err(Error::StaleHandle);
            }
            if let Some(raw) = state.inputs.pop_front() {
                return Ok(raw);
            }
            state = self
                .inner
                .input_ready
                .wait(state)
                .expect("mock engine state poisoned");
        }
    }

    fn version(&self) -> String {
        "mock-engine 0.9.0".to_string()
    }
}

#[derive(Debug)]
struct DirectState {
    started: bool,
    stopped: bool,
    rows: u32,
    cols: u32,
    /// Writes with the channels actually in effect for each.
    writes: Vec<(String, Channels)>,
    last_channels: Channels,
    cursor_visible: Option<bool>,
}

/// In-memory direct-output session.
#[derive(Debug, Clone)]
pub struct MockDirectEngine {
    state: Arc<Mutex<DirectState>>,
}

impl MockDirectEngine {
    pub fn new(rows: u32, cols: u32) -> Self {
        MockDirectEngine {
            state: Arc::new(Mutex::new(DirectState {
                started: false,
                stopped: false,
                rows,
                cols,
                writes: Vec::new(),
                last_channels: Channels::new(),
                cursor_visible: None,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DirectState> {
        self.state.lock().expect("mock direct state poisoned")
    }

    pub fn writes(&self) -> Vec<(String, Channels)> {
        self.lock().writes.clone()
    }

    pub fn cursor_visible(&self) -> Option<bool> {
        self.lock().cursor_visible
    }
}

impl DirectEngine for MockDirectEngine {
    fn init(&self) -> Result<()> {
        let mut state = self.lock();
        if state.started {
            return Err(Error::EngineInit("direct session already started".into()));
        }
        state.started = true;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.lock().stopped = true;
        Ok(())
    }

    fn put_str(&self, text: &str, channels: Option<Channels>) -> Result<u32> {
        let mut state = self.lock();
        if !state.started || state.stopped {
            return Err(Error::StaleHandle);
        }
        // An omitted color keeps the last one in effect.
        let effective = match channels {
            Some(ch) => {
                state.last_channels = ch;
                ch
            }
            None => state.last_channels,
        };
        state.writes.push((text.to_string(), effective));
        Ok(text.chars().count() as u32)
    }

    fn dim_rows(&self) -> Result<u32> {
        Ok(self.lock().rows)
    }

    fn dim_cols(&self) -> Result<u32> {
        Ok(self.lock().cols)
    }

    fn enable_cursor(&self) -> Result<()> {
        self.lock().cursor_visible = Some(true);
        Ok(())
    }

    fn disable_cursor(&self) -> Result<()> {
        self.lock().cursor_visible = Some(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_the_right_edge() {
        let engine = MockEngine::new(4, 5);
        engine.init(&SessionOptions::default()).unwrap();
        let std = engine.standard_surface().unwrap();
        let written = engine.put_str(std, "abcdefgh", 1, 3).unwrap();
        assert_eq!(written, 2);
        let surface = engine.surface(std).unwrap();
        assert_eq!(surface.writes, vec![(1, 3, "ab".to_string())]);
        assert_eq!(surface.cursor, (1, 5));
    }

    #[test]
    fn cursor_sentinel_continues_from_last_write() {
        let engine = MockEngine::new(4, 20);
        engine.init(&SessionOptions::default()).unwrap();
        let std = engine.standard_surface().unwrap();
        engine.put_str(std, "ab", 0, 0).unwrap();
        engine.put_str(std, "cd", -1, -1).unwrap();
        let surface = engine.surface(std).unwrap();
        assert_eq!(surface.writes[1], (0, 2, "cd".to_string()));
    }

    #[test]
    fn aligned_writes_compute_their_column() {
        let engine = MockEngine::new(4, 10);
        engine.init(&SessionOptions::default()).unwrap();
        let std = engine.standard_surface().unwrap();
        engine.put_str_aligned(std, "hi", 0, Align::Center).unwrap();
        engine.put_str_aligned(std, "hi", 1, Align::Right).unwrap();
        let surface = engine.surface(std).unwrap();
        assert_eq!(surface.writes[0].1, 4);
        assert_eq!(surface.writes[1].1, 8);
    }

    #[test]
    fn stop_unblocks_and_errors_a_pending_read() {
        let engine = MockEngine::new(4, 4);
        engine.init(&SessionOptions::default()).unwrap();
        let reader = engine.clone();
        let handle = std::thread::spawn(move || reader.get_input_blocking());
        std::thread::sleep(std::time::Duration::from_millis(20));
        engine.stop().unwrap();
        assert_eq!(handle.join().unwrap(), Err(Error::StaleHandle));
    }

    #[test]
    fn direct_engine_tracks_last_channels() {
        let direct = MockDirectEngine::new(24, 80);
        direct.init().unwrap();
        let red = Channels::new().set_foreground_rgb(255, 0, 0);
        direct.put_str("a", Some(red)).unwrap();
        direct.put_str("b", None).unwrap();
        let writes = direct.writes();
        assert_eq!(writes[1].1, red);
    }
}
