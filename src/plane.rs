// src/plane.rs

//! Drawable surfaces ("planes").

use crate::context::SessionShared;
use crate::engine::{Align, SurfaceId};
use crate::error::{Error, Result};
use log::trace;
use std::sync::{Arc, Weak};

/// A rectangular drawable region of one context.
///
/// A plane holds the engine-side surface key and a non-owning reference to
/// the session that created it; it never keeps that session alive. Every
/// operation on a plane whose context has stopped or been dropped fails
/// with [`Error::StaleHandle`].
///
/// Cloning a plane yields another handle onto the same surface.
#[derive(Debug, Clone)]
pub struct Plane {
    surface: SurfaceId,
    session: Weak<SessionShared>,
}

impl Plane {
    pub(crate) fn new(surface: SurfaceId, session: Weak<SessionShared>) -> Plane {
        Plane { surface, session }
    }

    /// The live session, or [`Error::StaleHandle`] once the owning context
    /// has stopped or been dropped.
    fn session(&self) -> Result<Arc<SessionShared>> {
        let shared = self.session.upgrade().ok_or(Error::StaleHandle)?;
        if !shared.is_started() {
            return Err(Error::StaleHandle);
        }
        Ok(shared)
    }

    /// Current (rows, cols); may change across a terminal resize.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        self.session()?.engine.dimensions(self.surface)
    }

    /// Writes text at the current cursor position. Returns cells advanced;
    /// text past the plane edge is clipped by the engine.
    pub fn put_str(&self, text: &str) -> Result<u32> {
        self.put_str_yx(text, -1, -1)
    }

    /// Writes text at the given cell; `-1` keeps the cursor position on
    /// that axis.
    pub fn put_str_yx(&self, text: &str, row: i32, col: i32) -> Result<u32> {
        trace!("put_str {} cells at ({}, {})", text.chars().count(), row, col);
        self.session()?.engine.put_str(self.surface, text, row, col)
    }

    /// Writes text on one row, positioned by alignment.
    pub fn put_str_aligned(&self, text: &str, row: i32, align: Align) -> Result<u32> {
        self.session()?
            .engine
            .put_str_aligned(self.surface, text, row, align)
    }

    /// Flood-fills with a glyph from the given seed cell. Returns cells
    /// filled.
    pub fn polyfill(&self, row: u32, col: u32, glyph: char) -> Result<u32> {
        self.session()?.engine.polyfill(self.surface, row, col, glyph)
    }

    /// Sets the working foreground color for subsequent writes. Components
    /// are clamped to [0, 255], never an error.
    pub fn set_foreground_rgb(&self, red: i32, green: i32, blue: i32) -> Result<()> {
        self.session()?
            .engine
            .set_foreground_rgb(self.surface, red, green, blue)
    }

    /// Sets the working background color. Clamped like the foreground.
    pub fn set_background_rgb(&self, red: i32, green: i32, blue: i32) -> Result<()> {
        self.session()?
            .engine
            .set_background_rgb(self.surface, red, green, blue)
    }

    /// Clears all cells to the plane's default blank state.
    pub fn erase(&self) -> Result<()> {
        self.session()?.engine.erase(self.surface)
    }

    /// Flushes the owning context, as [`crate::Context::render`] does.
    pub fn render(&self) -> Result<()> {
        self.session()?.engine.render()
    }

    /// Carves a child plane anchored at the given origin within the
    /// engine's coordinate space. The child shares this plane's owning
    /// context.
    ///
    /// Size defaulting keeps the layer's legacy rule: a missing column
    /// count defaults to half the parent's *row* count, and a missing row
    /// count defaults to the parent's *column* count. Callers wanting the
    /// intuitive halves should pass both sizes explicitly.
    pub fn create_sub_plane(
        &self,
        row: u32,
        col: u32,
        rows: Option<u32>,
        cols: Option<u32>,
    ) -> Result<Plane> {
        let shared = self.session()?;
        let (parent_rows, parent_cols) = shared.engine.dimensions(self.surface)?;
        let cols = cols.unwrap_or(parent_rows / 2);
        let rows = rows.unwrap_or(parent_cols);
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidGeometry { rows, cols });
        }
        let child = shared
            .engine
            .create_child_surface(self.surface, row, col, rows, cols)?;
        trace!("carved sub-plane {} rows x {} cols at ({}, {})", rows, cols, row, col);
        Ok(Plane::new(child, self.session.clone()))
    }

    /// True when both planes are owned by the identical context instance.
    pub fn same_context(&self, other: &Plane) -> bool {
        Weak::ptr_eq(&self.session, &other.session)
    }
}

/// Two planes are equal when they are the same engine surface of the same
/// session.
impl PartialEq for Plane {
    fn eq(&self, other: &Plane) -> bool {
        self.surface == other.surface && Weak::ptr_eq(&self.session, &other.session)
    }
}

impl Eq for Plane {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionOptions;
    use crate::context::Context;
    use crate::engine::MockEngine;

    fn plane_fixture() -> (MockEngine, Context, Plane) {
        let engine = MockEngine::new(24, 80);
        let ctx = Context::new(Box::new(engine.clone()), &SessionOptions::default())
            .expect("mock init cannot fail");
        let plane = ctx.standard_plane().expect("context just started");
        (engine, ctx, plane)
    }

    #[test]
    fn writes_go_to_the_engine_surface() {
        let (engine, ctx, plane) = plane_fixture();
        assert_eq!(plane.put_str_yx("hi", 0, 0).unwrap(), 2);
        let std = engine.surface(crate::engine::SurfaceId(0)).unwrap();
        assert_eq!(std.writes, vec![(0, 0, "hi".to_string())]);
        drop(ctx);
    }

    #[test]
    fn sub_plane_defaults_follow_the_legacy_rule() {
        // Parent is 24 rows x 80 cols.
        let (_engine, _ctx, plane) = plane_fixture();

        let defaulted_cols = plane.create_sub_plane(0, 0, Some(5), None).unwrap();
        assert_eq!(defaulted_cols.dimensions().unwrap(), (5, 12));

        let defaulted_rows = plane.create_sub_plane(0, 0, None, Some(10)).unwrap();
        assert_eq!(defaulted_rows.dimensions().unwrap(), (80, 10));
    }

    #[test]
    fn zero_sized_sub_planes_are_rejected() {
        let (_engine, _ctx, plane) = plane_fixture();
        let err = plane.create_sub_plane(0, 0, Some(0), Some(10)).unwrap_err();
        assert_eq!(err, Error::InvalidGeometry { rows: 0, cols: 10 });
        // A 1-row parent would default the child columns to zero.
        let slim = plane.create_sub_plane(0, 0, Some(1), Some(1)).unwrap();
        assert!(matches!(
            slim.create_sub_plane(0, 0, Some(1), None),
            Err(Error::InvalidGeometry { rows: 1, cols: 0 })
        ));
    }

    #[test]
    fn sub_planes_share_the_owning_context() {
        let (_engine, _ctx, plane) = plane_fixture();
        let child = plane.create_sub_plane(2, 4, Some(4), Some(8)).unwrap();
        assert!(child.same_context(&plane));
        assert_ne!(child, plane);
    }

    #[test]
    fn operations_after_stop_are_stale() {
        let (_engine, ctx, plane) = plane_fixture();
        ctx.stop().unwrap();
        assert_eq!(plane.render(), Err(Error::StaleHandle));
        assert_eq!(plane.put_str("late"), Err(Error::StaleHandle));
        assert_eq!(plane.dimensions(), Err(Error::StaleHandle));
    }

    #[test]
    fn operations_after_context_drop_are_stale() {
        let (_engine, ctx, plane) = plane_fixture();
        drop(ctx);
        assert_eq!(plane.erase(), Err(Error::StaleHandle));
    }

    #[test]
    fn color_setters_clamp_through_the_engine() {
        let (engine, _ctx, plane) = plane_fixture();
        plane.set_foreground_rgb(300, -1, 128).unwrap();
        let std = engine.surface(crate::engine::SurfaceId(0)).unwrap();
        let expected = crate::channel::Channels::new().set_foreground_rgb(255, 0, 128);
        assert_eq!(std.channels, expected);
    }
}
