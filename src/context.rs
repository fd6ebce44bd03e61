// src/context.rs

//! Rendering context lifecycle and the process-wide default context.
//!
//! A `Context` owns one engine session. It is created started, stopped at
//! most once (explicit `stop` surfaces errors, drop-time teardown swallows
//! them), and is the root owner of every plane carved from its standard
//! plane. Planes reach the session through a non-owning reference, so a
//! stopped or dropped context turns all of its planes stale instead of
//! leaving them pointing at a dead handle.

use crate::config::SessionOptions;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::input::InputEvent;
use crate::plane::Plane;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Started,
    Stopped,
}

struct SessionState {
    phase: Phase,
    mouse_enabled: bool,
    cursor_enabled: bool,
}

/// Session state shared between a `Context` and its planes.
///
/// Planes hold this behind `Weak`, never `Arc`: a plane must not keep its
/// context alive past `stop`.
pub(crate) struct SessionShared {
    pub(crate) engine: Box<dyn Engine>,
    state: Mutex<SessionState>,
}

impl SessionShared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    pub(crate) fn is_started(&self) -> bool {
        self.lock_state().phase == Phase::Started
    }
}

/// One engine session bound to an output stream.
pub struct Context {
    shared: Arc<SessionShared>,
}

impl Context {
    /// Starts a session on the given engine driver.
    ///
    /// The engine takes over terminal input/output mode on success. Fails
    /// with [`Error::EngineInit`] when the terminal cannot be negotiated or
    /// the driver was already started.
    pub fn new(engine: Box<dyn Engine>, options: &SessionOptions) -> Result<Context> {
        engine.init(options)?;
        info!("engine session started");
        Ok(Context {
            shared: Arc::new(SessionShared {
                engine,
                state: Mutex::new(SessionState {
                    phase: Phase::Started,
                    mouse_enabled: false,
                    cursor_enabled: false,
                }),
            }),
        })
    }

    /// Starts a session on the system engine.
    #[cfg(feature = "native")]
    pub fn new_native(options: &SessionOptions) -> Result<Context> {
        Context::new(
            Box::new(crate::engine::NativeEngine::new()),
            options,
        )
    }

    /// Restores the prior terminal mode and releases the session.
    ///
    /// Idempotent: stopping an already-stopped context is a no-op. Takes
    /// `&self` deliberately: stopping from another thread is the only
    /// defined way to interrupt a pending [`Context::get_input_blocking`].
    pub fn stop(&self) -> Result<()> {
        {
            let mut state = self.shared.lock_state();
            if state.phase == Phase::Stopped {
                return Ok(());
            }
            state.phase = Phase::Stopped;
        }
        info!("engine session stopping");
        self.shared.engine.stop()
    }

    /// Flushes all pending plane mutations to the terminal in one pass.
    pub fn render(&self) -> Result<()> {
        self.ensure_started()?;
        self.shared.engine.render()
    }

    /// The always-present, full-terminal-sized root plane. Repeated calls
    /// return planes over the same engine surface.
    pub fn standard_plane(&self) -> Result<Plane> {
        self.ensure_started()?;
        let surface = self.shared.engine.standard_surface()?;
        Ok(Plane::new(surface, Arc::downgrade(&self.shared)))
    }

    /// Blocks until one input event arrives, then decodes it.
    ///
    /// No timeout and no cancellation: a caller needing cancellable input
    /// must run this on a dedicated thread and stop the context to unblock
    /// it, which fails the pending call with [`Error::StaleHandle`].
    pub fn get_input_blocking(&self) -> Result<InputEvent> {
        self.ensure_started()?;
        // The state lock is not held across this call.
        let raw = self.shared.engine.get_input_blocking()?;
        Ok(InputEvent::decode(raw))
    }

    /// Starts reporting mouse events. No-op if already enabled.
    pub fn enable_mouse(&self) -> Result<()> {
        let mut state = self.lock_started()?;
        if state.mouse_enabled {
            return Ok(());
        }
        self.shared.engine.enable_mouse()?;
        state.mouse_enabled = true;
        Ok(())
    }

    /// Stops reporting mouse events. No-op if already disabled.
    pub fn disable_mouse(&self) -> Result<()> {
        let mut state = self.lock_started()?;
        if !state.mouse_enabled {
            return Ok(());
        }
        self.shared.engine.disable_mouse()?;
        state.mouse_enabled = false;
        Ok(())
    }

    /// Shows the terminal cursor. No-op if already shown.
    pub fn enable_cursor(&self) -> Result<()> {
        let mut state = self.lock_started()?;
        if state.cursor_enabled {
            return Ok(());
        }
        self.shared.engine.enable_cursor(0, 0)?;
        state.cursor_enabled = true;
        Ok(())
    }

    /// Hides the terminal cursor. No-op if already hidden.
    pub fn disable_cursor(&self) -> Result<()> {
        let mut state = self.lock_started()?;
        if !state.cursor_enabled {
            return Ok(());
        }
        self.shared.engine.disable_cursor()?;
        state.cursor_enabled = false;
        Ok(())
    }

    /// The engine's version string, for diagnostics.
    pub fn version(&self) -> String {
        self.shared.engine.version()
    }

    fn ensure_started(&self) -> Result<()> {
        if self.shared.is_started() {
            Ok(())
        } else {
            Err(Error::StaleHandle)
        }
    }

    fn lock_started(&self) -> Result<MutexGuard<'_, SessionState>> {
        let state = self.shared.lock_state();
        if state.phase != Phase::Started {
            return Err(Error::StaleHandle);
        }
        Ok(state)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Teardown must never raise during unwind; a stop failure here
        // would only mask whatever caused the unwind.
        if let Err(err) = self.stop() {
            warn!("engine stop failed during teardown: {}", err);
        }
    }
}

// --- Process-wide default context -----------------------------------------

static DEFAULT_CONTEXT: OnceLock<Mutex<Option<Context>>> = OnceLock::new();

fn default_slot() -> &'static Mutex<Option<Context>> {
    DEFAULT_CONTEXT.get_or_init(|| Mutex::new(None))
}

fn lock_default_slot() -> MutexGuard<'static, Option<Context>> {
    default_slot().lock().expect("default context lock poisoned")
}

/// Installs an explicit engine as the process default context.
///
/// Fails with [`Error::EngineInit`] if a default context already exists.
pub fn init_default_context(engine: Box<dyn Engine>, options: &SessionOptions) -> Result<()> {
    let mut slot = lock_default_slot();
    if slot.is_some() {
        return Err(Error::EngineInit(
            "default context already initialized".into(),
        ));
    }
    *slot = Some(Context::new(engine, options)?);
    Ok(())
}

/// Returns the standard plane of the process default context.
///
/// With the `native` feature the default context is created lazily on
/// first use; otherwise one must have been installed through
/// [`init_default_context`]. Repeated calls return planes owned by the
/// identical context instance.
pub fn std_plane() -> Result<Plane> {
    #[cfg_attr(not(feature = "native"), allow(unused_mut))]
    let mut slot = lock_default_slot();
    if slot.is_none() {
        #[cfg(feature = "native")]
        {
            log::debug!("creating process default context");
            *slot = Some(Context::new_native(&SessionOptions::default())?);
        }
        #[cfg(not(feature = "native"))]
        {
            return Err(Error::EngineInit(
                "default context not initialized; call init_default_context first".into(),
            ));
        }
    }
    match slot.as_ref() {
        Some(ctx) => ctx.standard_plane(),
        // Unreachable: the slot was populated above.
        None => Err(Error::StaleHandle),
    }
}

/// Stops and discards the default context, surfacing stop errors.
///
/// A no-op when no default context exists. Intended for deterministic
/// teardown in tests and at process exit.
pub fn shutdown_default_context() -> Result<()> {
    let ctx = lock_default_slot().take();
    match ctx {
        Some(ctx) => ctx.stop(),
        None => Ok(()),
    }
}
