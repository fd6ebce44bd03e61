// src/direct.rs

//! Plane-less direct-output sessions.
//!
//! Direct mode drives the terminal linearly, with no planes and no render
//! pass, through its own engine handle with a lifecycle independent of
//! `Context`.

use crate::channel::Channels;
use crate::engine::DirectEngine;
use crate::error::{Error, Result};
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectPhase {
    Uninitialized,
    Started,
    Stopped,
}

/// A linear-output terminal session.
///
/// State machine: uninitialized → started → stopped (terminal). `start`
/// fails when called twice; `stop` is idempotent and safe on a session
/// that never started.
pub struct DirectSession {
    engine: Box<dyn DirectEngine>,
    phase: DirectPhase,
    cursor_enabled: Option<bool>,
}

impl DirectSession {
    /// A session over the given driver, not yet started.
    pub fn new(engine: Box<dyn DirectEngine>) -> DirectSession {
        DirectSession {
            engine,
            phase: DirectPhase::Uninitialized,
            cursor_enabled: None,
        }
    }

    /// A session over the system engine, not yet started.
    #[cfg(feature = "native")]
    pub fn new_native() -> DirectSession {
        DirectSession::new(Box::new(crate::engine::NativeDirectEngine::new()))
    }

    /// Starts the session. Fails with [`Error::EngineInit`] on a second
    /// call, including after `stop`.
    pub fn start(&mut self) -> Result<()> {
        match self.phase {
            DirectPhase::Uninitialized => {
                self.engine.init()?;
                self.phase = DirectPhase::Started;
                info!("direct session started");
                Ok(())
            }
            DirectPhase::Started | DirectPhase::Stopped => {
                Err(Error::EngineInit("direct session already started".into()))
            }
        }
    }

    /// Releases the session. Safe to call any number of times, in any
    /// state.
    pub fn stop(&mut self) -> Result<()> {
        match self.phase {
            DirectPhase::Started => {
                self.phase = DirectPhase::Stopped;
                info!("direct session stopping");
                self.engine.stop()
            }
            DirectPhase::Uninitialized | DirectPhase::Stopped => Ok(()),
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase == DirectPhase::Started
    }

    /// Writes linear text, optionally with explicit color channels. When
    /// omitted, the session's last-set color persists. Returns cells
    /// advanced.
    pub fn put_str(&mut self, text: &str, channels: Option<Channels>) -> Result<u32> {
        self.ensure_started()?;
        self.engine.put_str(text, channels)
    }

    /// Current terminal size as (rows, cols).
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        self.ensure_started()?;
        Ok((self.engine.dim_rows()?, self.engine.dim_cols()?))
    }

    /// Shows or hides the cursor and caches the value for
    /// [`DirectSession::cursor_enabled`].
    pub fn set_cursor_enabled(&mut self, enabled: bool) -> Result<()> {
        self.ensure_started()?;
        if enabled {
            self.engine.enable_cursor()?;
        } else {
            self.engine.disable_cursor()?;
        }
        self.cursor_enabled = Some(enabled);
        Ok(())
    }

    /// The last cursor visibility this session set, or `None` before the
    /// first [`DirectSession::set_cursor_enabled`] call. The cache is not
    /// re-synced from the engine: it reflects what this layer last set,
    /// not necessarily the true terminal state if another actor changed it.
    pub fn cursor_enabled(&self) -> Option<bool> {
        self.cursor_enabled
    }

    fn ensure_started(&self) -> Result<()> {
        if self.phase == DirectPhase::Started {
            Ok(())
        } else {
            Err(Error::StaleHandle)
        }
    }
}

impl Drop for DirectSession {
    fn drop(&mut self) {
        if self.phase == DirectPhase::Started {
            if let Err(err) = self.stop() {
                warn!("direct session stop failed during teardown: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockDirectEngine;

    fn started_session() -> (MockDirectEngine, DirectSession) {
        let engine = MockDirectEngine::new(24, 80);
        let mut session = DirectSession::new(Box::new(engine.clone()));
        session.start().expect("mock init cannot fail");
        (engine, session)
    }

    #[test]
    fn start_twice_fails() {
        let (_engine, mut session) = started_session();
        assert!(matches!(session.start(), Err(Error::EngineInit(_))));
    }

    #[test]
    fn start_after_stop_fails() {
        let (_engine, mut session) = started_session();
        session.stop().unwrap();
        assert!(matches!(session.start(), Err(Error::EngineInit(_))));
    }

    #[test]
    fn stop_is_idempotent_and_safe_before_start() {
        let engine = MockDirectEngine::new(24, 80);
        let mut never_started = DirectSession::new(Box::new(engine));
        assert_eq!(never_started.stop(), Ok(()));

        let (_engine, mut session) = started_session();
        assert_eq!(session.stop(), Ok(()));
        assert_eq!(session.stop(), Ok(()));
    }

    #[test]
    fn put_str_requires_a_started_session() {
        let engine = MockDirectEngine::new(24, 80);
        let mut session = DirectSession::new(Box::new(engine));
        assert_eq!(session.put_str("x", None), Err(Error::StaleHandle));
        session.start().unwrap();
        assert_eq!(session.put_str("abc", None).unwrap(), 3);
        session.stop().unwrap();
        assert_eq!(session.put_str("x", None), Err(Error::StaleHandle));
    }

    #[test]
    fn omitted_channels_keep_the_last_color() {
        let (engine, mut session) = started_session();
        let green = Channels::new().set_foreground_rgb(0, 255, 0);
        session.put_str("a", Some(green)).unwrap();
        session.put_str("b", None).unwrap();
        let writes = engine.writes();
        assert_eq!(writes[0].1, green);
        assert_eq!(writes[1].1, green);
    }

    #[test]
    fn cursor_state_is_tri_state_and_cached() {
        let (engine, mut session) = started_session();
        assert_eq!(session.cursor_enabled(), None);
        session.set_cursor_enabled(false).unwrap();
        assert_eq!(session.cursor_enabled(), Some(false));
        assert_eq!(engine.cursor_visible(), Some(false));
        session.set_cursor_enabled(true).unwrap();
        assert_eq!(session.cursor_enabled(), Some(true));
    }

    #[test]
    fn dimensions_query_the_engine() {
        let (_engine, session) = started_session();
        assert_eq!(session.dimensions().unwrap(), (24, 80));
    }
}
