// src/lib.rs

//! Host-side control layer over a native character-cell rendering engine.
//!
//! The engine owns screen diffing, terminal capability negotiation, and
//! glyph handling; this crate owns the resource lifecycle around it:
//! contexts, drawable planes carved into hierarchies, packed color
//! channels, and decoded input events. Engine access goes through the
//! driver traits in [`engine`], so everything here runs unchanged against
//! the in-memory mock driver or (with the `native` feature) the system
//! library.
//!
//! ```
//! use termsurface::engine::MockEngine;
//! use termsurface::{Context, SessionOptions};
//!
//! let ctx = Context::new(Box::new(MockEngine::new(24, 80)), &SessionOptions::default())?;
//! let plane = ctx.standard_plane()?;
//! plane.set_foreground_rgb(0, 255, 0)?;
//! plane.put_str_yx("hello", 0, 0)?;
//! ctx.render()?;
//! ctx.stop()?;
//! # Ok::<(), termsurface::Error>(())
//! ```

pub mod channel;
pub mod config;
pub mod context;
pub mod direct;
pub mod engine;
pub mod error;
pub mod input;
pub mod keys;
pub mod plane;

pub use channel::Channels;
pub use config::{EngineLogLevel, SessionOptions};
pub use context::{init_default_context, shutdown_default_context, std_plane, Context};
pub use direct::DirectSession;
pub use engine::{Align, DirectEngine, Engine, RawInput, SurfaceId};
pub use error::{Error, Result};
pub use input::{EventCode, InputEvent};
pub use keys::{KeySymbol, Modifiers};
pub use plane::Plane;
