// src/engine/mod.rs
// Declares the engine driver modules and defines the common traits.

//! The narrow surface through which the layer reaches the rendering engine.
//!
//! Everything the engine actually does (screen diffing, terminal capability
//! negotiation, glyph handling) is opaque behind these traits. The layer
//! never retries an engine call and never interprets engine state beyond
//! the returned values.
//!
//! Two drivers exist: [`mock`] (in-memory, always compiled, used by every
//! test) and [`native`] (FFI onto the system library, behind the `native`
//! cargo feature since it must link against it).

pub mod mock;
#[cfg(feature = "native")]
pub mod native;

pub use mock::{MockDirectEngine, MockEngine};
#[cfg(feature = "native")]
pub use native::{NativeDirectEngine, NativeEngine};

use crate::channel::Channels;
use crate::config::SessionOptions;
use crate::error::Result;

/// Opaque key for an engine-side surface. Only ever produced by the engine
/// that will consume it again; the layer never inspects the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub(crate) u64);

/// One raw input event as reported by the engine, before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInput {
    pub codepoint: u32,
    pub row: i32,
    pub col: i32,
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub seqnum: u64,
}

/// Horizontal alignment for aligned writes, on the engine's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Align {
    Unaligned = 0,
    Left = 1,
    Center = 2,
    Right = 3,
}

/// Driver interface for a full rendering session.
///
/// Methods take `&self`: the native handle is a raw pointer and the mock
/// synchronizes internally. This matters for `get_input_blocking`, which
/// must be callable without holding any layer lock so that `stop` from
/// another thread can always proceed and unblock it. Implementations must
/// make a pending `get_input_blocking` return an error once `stop` runs.
pub trait Engine: Send + Sync {
    /// Starts the session. Fails if the terminal cannot be negotiated or
    /// the session was already started.
    fn init(&self, options: &SessionOptions) -> Result<()>;

    /// Restores the prior terminal mode and releases the session.
    fn stop(&self) -> Result<()>;

    /// Flushes all pending surface mutations to the terminal in one pass.
    fn render(&self) -> Result<()>;

    /// The always-present, terminal-sized root surface. Same key on every
    /// call within one session.
    fn standard_surface(&self) -> Result<SurfaceId>;

    /// Current (rows, cols) of a surface.
    fn dimensions(&self, surface: SurfaceId) -> Result<(u32, u32)>;

    /// Writes text at the given cell, `-1` meaning the current cursor
    /// position on that axis. Returns cells advanced; text past the
    /// surface edge is clipped.
    fn put_str(&self, surface: SurfaceId, text: &str, row: i32, col: i32) -> Result<u32>;

    /// Writes text on one row, positioned by alignment.
    fn put_str_aligned(&self, surface: SurfaceId, text: &str, row: i32, align: Align)
        -> Result<u32>;

    /// Flood-fills with a glyph from a seed cell. Returns cells filled.
    fn polyfill(&self, surface: SurfaceId, row: u32, col: u32, glyph: char) -> Result<u32>;

    /// Clears all cells to the surface's default blank state.
    fn erase(&self, surface: SurfaceId) -> Result<()>;

    /// Sets the surface's working foreground color. Components are clamped
    /// by the engine, never an error.
    fn set_foreground_rgb(&self, surface: SurfaceId, red: i32, green: i32, blue: i32)
        -> Result<()>;

    /// Sets the surface's working background color. Clamped like the
    /// foreground.
    fn set_background_rgb(&self, surface: SurfaceId, red: i32, green: i32, blue: i32)
        -> Result<()>;

    /// Carves a child surface out of a parent at the given origin and size.
    /// Geometry is validated by the caller before this is reached.
    fn create_child_surface(
        &self,
        parent: SurfaceId,
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    ) -> Result<SurfaceId>;

    fn enable_mouse(&self) -> Result<()>;
    fn disable_mouse(&self) -> Result<()>;
    fn enable_cursor(&self, row: u32, col: u32) -> Result<()>;
    fn disable_cursor(&self) -> Result<()>;

    /// Blocks the calling thread until one input event is available.
    fn get_input_blocking(&self) -> Result<RawInput>;

    /// The engine's version string. Diagnostic only; no parsing contract.
    fn version(&self) -> String;
}

/// Driver interface for a plane-less direct-output session.
pub trait DirectEngine: Send {
    /// Starts the direct session. Fails if already started.
    fn init(&self) -> Result<()>;

    /// Releases the direct session.
    fn stop(&self) -> Result<()>;

    /// Writes linear text, optionally with explicit channels; the last-set
    /// color persists when omitted. Returns cells advanced.
    fn put_str(&self, text: &str, channels: Option<Channels>) -> Result<u32>;

    fn dim_rows(&self) -> Result<u32>;
    fn dim_cols(&self) -> Result<u32>;

    fn enable_cursor(&self) -> Result<()>;
    fn disable_cursor(&self) -> Result<()>;
}
