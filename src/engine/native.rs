// src/engine/native.rs

//! FFI drivers over the system notcurses library.
//!
//! Only compiled with the `native` cargo feature; `build.rs` locates the
//! library through pkg-config. The handle is a raw pointer held in an
//! `AtomicPtr` so that `stop` can retire it from any thread while another
//! thread is parked inside the library's blocking read; stopping is the
//! only defined way to interrupt that read. All other calls follow the
//! single-owner-thread contract of the crate.

use crate::channel::Channels;
use crate::config::SessionOptions;
use crate::engine::{Align, DirectEngine, Engine, RawInput, SurfaceId};
use crate::error::{Error, Result};
use libc::{c_char, c_int, FILE};
use log::debug;
use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Opaque library-side session handle.
#[repr(C)]
struct RawContext {
    _opaque: [u8; 0],
}

/// Opaque library-side surface handle.
#[repr(C)]
struct RawPlane {
    _opaque: [u8; 0],
}

/// Opaque library-side direct-mode handle.
#[repr(C)]
struct RawDirect {
    _opaque: [u8; 0],
}

/// Mirrors the library's init-options struct, field for field.
#[repr(C)]
struct RawOptions {
    termtype: *const c_char,
    renderfp: *mut FILE,
    loglevel: c_int,
    margin_t: c_int,
    margin_r: c_int,
    margin_b: c_int,
    margin_l: c_int,
    flags: u64,
}

/// Mirrors the library's input record.
#[repr(C)]
struct RawInputRecord {
    id: u32,
    y: c_int,
    x: c_int,
    alt: bool,
    shift: bool,
    ctrl: bool,
    seqnum: u64,
}

/// Mirrors the library's cell struct, used only for polyfill seeds.
#[repr(C)]
struct RawCell {
    gcluster: u32,
    gcluster_backstop: u8,
    reserved: u8,
    stylemask: u16,
    channels: u64,
}

unsafe extern "C" {
    fn notcurses_init(opts: *const RawOptions, fp: *mut FILE) -> *mut RawContext;
    fn notcurses_stop(nc: *mut RawContext) -> c_int;
    fn notcurses_render(nc: *mut RawContext) -> c_int;
    fn notcurses_top(nc: *mut RawContext) -> *mut RawPlane;
    fn notcurses_mouse_enable(nc: *mut RawContext) -> c_int;
    fn notcurses_mouse_disable(nc: *mut RawContext) -> c_int;
    fn notcurses_cursor_enable(nc: *mut RawContext, y: c_int, x: c_int) -> c_int;
    fn notcurses_cursor_disable(nc: *mut RawContext) -> c_int;
    fn notcurses_getc_blocking(nc: *mut RawContext, ni: *mut RawInputRecord) -> u32;
    fn notcurses_version() -> *const c_char;

    fn ncplane_dim_yx(plane: *mut RawPlane, rows: *mut c_int, cols: *mut c_int);
    fn ncplane_putstr_yx(plane: *mut RawPlane, y: c_int, x: c_int, text: *const c_char) -> c_int;
    fn ncplane_putstr_aligned(
        plane: *mut RawPlane,
        y: c_int,
        align: c_int,
        text: *const c_char,
    ) -> c_int;
    fn ncplane_polyfill_yx(
        plane: *mut RawPlane,
        y: c_int,
        x: c_int,
        cell: *const RawCell,
    ) -> c_int;
    fn ncplane_erase(plane: *mut RawPlane);
    fn ncplane_set_fg_rgb8_clipped(plane: *mut RawPlane, r: c_int, g: c_int, b: c_int);
    fn ncplane_set_bg_rgb8_clipped(plane: *mut RawPlane, r: c_int, g: c_int, b: c_int);
    fn ncplane_bound(
        parent: *mut RawPlane,
        rows: c_int,
        cols: c_int,
        yoff: c_int,
        xoff: c_int,
        opaque: *mut libc::c_void,
    ) -> *mut RawPlane;

    fn ncdirect_init(termtype: *const c_char, fp: *mut FILE, flags: u64) -> *mut RawDirect;
    fn ncdirect_stop(nc: *mut RawDirect) -> c_int;
    fn ncdirect_putstr(nc: *mut RawDirect, channels: u64, text: *const c_char) -> c_int;
    fn ncdirect_dim_x(nc: *mut RawDirect) -> c_int;
    fn ncdirect_dim_y(nc: *mut RawDirect) -> c_int;
    fn ncdirect_cursor_enable(nc: *mut RawDirect) -> c_int;
    fn ncdirect_cursor_disable(nc: *mut RawDirect) -> c_int;
}

fn to_c_string(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::Render("text contains an interior NUL".into()))
}

/// Session driver bound to the system library.
pub struct NativeEngine {
    handle: AtomicPtr<RawContext>,
}

// SAFETY: the handle is only an address. Every call except `stop` follows
// the crate's single-owner-thread contract; `stop` retires the pointer with
// a swap before the library teardown runs.
unsafe impl Send for NativeEngine {}
unsafe impl Sync for NativeEngine {}

impl NativeEngine {
    pub fn new() -> Self {
        NativeEngine {
            handle: AtomicPtr::new(ptr::null_mut()),
        }
    }

    fn context(&self) -> Result<*mut RawContext> {
        let nc = self.handle.load(Ordering::Acquire);
        if nc.is_null() {
            return Err(Error::StaleHandle);
        }
        Ok(nc)
    }

    fn plane(surface: SurfaceId) -> *mut RawPlane {
        surface.0 as *mut RawPlane
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for NativeEngine {
    fn init(&self, options: &SessionOptions) -> Result<()> {
        if !self.handle.load(Ordering::Acquire).is_null() {
            return Err(Error::EngineInit("engine already started".into()));
        }
        let fd = options.output_fd.unwrap_or(libc::STDOUT_FILENO);
        // Pre-flight before handing the stream to the library: a failed
        // negotiation there leaves a less useful message.
        if unsafe { libc::isatty(fd) } != 1 {
            return Err(Error::EngineInit(format!("fd {} is not a tty", fd)));
        }

        let raw_options = RawOptions {
            termtype: ptr::null(),
            renderfp: ptr::null_mut(),
            loglevel: options.log_level.to_raw(),
            margin_t: options.margin_top as c_int,
            margin_r: options.margin_right as c_int,
            margin_b: options.margin_bottom as c_int,
            margin_l: options.margin_left as c_int,
            flags: 0,
        };
        let fp = match options.output_fd {
            Some(fd) => unsafe { libc::fdopen(fd, b"w\0".as_ptr() as *const c_char) },
            None => ptr::null_mut(),
        };
        let nc = unsafe { notcurses_init(&raw_options, fp) };
        if nc.is_null() {
            return Err(Error::EngineInit(
                "terminal capability negotiation failed".into(),
            ));
        }
        self.handle.store(nc, Ordering::Release);
        debug!("native engine session initialized");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let nc = self.handle.swap(ptr::null_mut(), Ordering::AcqRel);
        if nc.is_null() {
            return Ok(());
        }
        if unsafe { notcurses_stop(nc) } < 0 {
            return Err(Error::Render("engine stop reported failure".into()));
        }
        Ok(())
    }

    fn render(&self) -> Result<()> {
        let nc = self.context()?;
        if unsafe { notcurses_render(nc) } < 0 {
            return Err(Error::Render("render flush failed".into()));
        }
        Ok(())
    }

    fn standard_surface(&self) -> Result<SurfaceId> {
        let nc = self.context()?;
        let plane = unsafe { notcurses_top(nc) };
        if plane.is_null() {
            return Err(Error::Render("engine returned no standard surface".into()));
        }
        Ok(SurfaceId(plane as u64))
    }

    fn dimensions(&self, surface: SurfaceId) -> Result<(u32, u32)> {
        self.context()?;
        let mut rows: c_int = 0;
        let mut cols: c_int = 0;
        unsafe { ncplane_dim_yx(Self::plane(surface), &mut rows, &mut cols) };
        Ok((rows as u32, cols as u32))
    }

    fn put_str(&self, surface: SurfaceId, text: &str, row: i32, col: i32) -> Result<u32> {
        self.context()?;
        let text = to_c_string(text)?;
        let written =
            unsafe { ncplane_putstr_yx(Self::plane(surface), row, col, text.as_ptr()) };
        if written < 0 {
            return Err(Error::Render("failed to write string to surface".into()));
        }
        Ok(written as u32)
    }

    fn put_str_aligned(
        &self,
        surface: SurfaceId,
        text: &str,
        row: i32,
        align: Align,
    ) -> Result<u32> {
        self.context()?;
        let text = to_c_string(text)?;
        let written = unsafe {
            ncplane_putstr_aligned(Self::plane(surface), row, align as c_int, text.as_ptr())
        };
        if written < 0 {
            return Err(Error::Render("failed to write aligned string".into()));
        }
        Ok(written as u32)
    }

    fn polyfill(&self, surface: SurfaceId, row: u32, col: u32, glyph: char) -> Result<u32> {
        self.context()?;
        let cell = RawCell {
            gcluster: glyph as u32,
            gcluster_backstop: 0,
            reserved: 0,
            stylemask: 0,
            channels: 0,
        };
        let filled = unsafe {
            ncplane_polyfill_yx(Self::plane(surface), row as c_int, col as c_int, &cell)
        };
        if filled < 0 {
            return Err(Error::Render("polyfill failed".into()));
        }
        Ok(filled as u32)
    }

    fn erase(&self, surface: SurfaceId) -> Result<()> {
        self.context()?;
        unsafe { ncplane_erase(Self::plane(surface)) };
        Ok(())
    }

    fn set_foreground_rgb(&self, surface: SurfaceId, red: i32, green: i32, blue: i32) -> Result<()> {
        self.context()?;
        // The clipped entry point clamps out-of-range components itself.
        unsafe { ncplane_set_fg_rgb8_clipped(Self::plane(surface), red, green, blue) };
        Ok(())
    }

    fn set_background_rgb(&self, surface: SurfaceId, red: i32, green: i32, blue: i32) -> Result<()> {
        self.context()?;
        unsafe { ncplane_set_bg_rgb8_clipped(Self::plane(surface), red, green, blue) };
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
        self.context()?;
        let child = unsafe {
            ncplane_bound(
                Self::plane(parent),
                rows as c_int,
                cols as c_int,
                row as c_int,
                col as c_int,
                ptr::null_mut(),
            )
        };
        if child.is_null() {
            return Err(Error::Render("engine refused child surface".into()));
        }
        Ok(SurfaceId(child as u64))
    }

    fn enable_mouse(&self) -> Result<()> {
        let nc = self.context()?;
        if unsafe { notcurses_mouse_enable(nc) } != 0 {
            return Err(Error::Render("failed to enable mouse events".into()));
        }
        Ok(())
    }

    fn disable_mouse(&self) -> Result<()> {
        let nc = self.context()?;
        if unsafe { notcurses_mouse_disable(nc) } != 0 {
            return Err(Error::Render("failed to disable mouse events".into()));
        }
        Ok(())
    }

    fn enable_cursor(&self, row: u32, col: u32) -> Result<()> {
        let nc = self.context()?;
        if unsafe { notcurses_cursor_enable(nc, row as c_int, col as c_int) } != 0 {
            return Err(Error::Render("failed to enable cursor".into()));
        }
        Ok(())
    }

    fn disable_cursor(&self) -> Result<()> {
        let nc = self.context()?;
        if unsafe { notcurses_cursor_disable(nc) } != 0 {
            return Err(Error::Render("failed to disable cursor".into()));
        }
        Ok(())
    }

    fn get_input_blocking(&self) -> Result<RawInput> {
        let nc = self.context()?;
        let mut record = RawInputRecord {
            id: 0,
            y: 0,
            x: 0,
            alt: false,
            shift: false,
            ctrl: false,
            seqnum: 0,
        };
        let id = unsafe { notcurses_getc_blocking(nc, &mut record) };
        if id == u32::MAX {
            // The library reports (char32_t)-1 both for read failures and
            // for a session stopped out from under the read.
            if self.handle.load(Ordering::Acquire).is_null() {
                return Err(Error::StaleHandle);
            }
            return Err(Error::Render("input read failed".into()));
        }
        Ok(RawInput {
            codepoint: id,
            row: record.y,
            col: record.x,
            alt: record.alt,
            shift: record.shift,
            ctrl: record.ctrl,
            seqnum: record.seqnum,
        })
    }

    fn version(&self) -> String {
        unsafe { CStr::from_ptr(notcurses_version()) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        // Owner teardown normally runs through `stop`; this only catches an
        // engine dropped without ever being wrapped.
        let nc = self.handle.swap(ptr::null_mut(), Ordering::AcqRel);
        if !nc.is_null() {
            unsafe { notcurses_stop(nc) };
        }
    }
}

/// Direct-mode driver bound to the system library.
pub struct NativeDirectEngine {
    handle: AtomicPtr<RawDirect>,
}

// SAFETY: same contract as NativeEngine.
unsafe impl Send for NativeDirectEngine {}
unsafe impl Sync for NativeDirectEngine {}

impl NativeDirectEngine {
    pub fn new() -> Self {
        NativeDirectEngine {
            handle: AtomicPtr::new(ptr::null_mut()),
        }
    }

    fn direct(&self) -> Result<*mut RawDirect> {
        let nc = self.handle.load(Ordering::Acquire);
        if nc.is_null() {
            return Err(Error::StaleHandle);
        }
        Ok(nc)
    }
}

impl Default for NativeDirectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectEngine for NativeDirectEngine {
    fn init(&self) -> Result<()> {
        if !self.handle.load(Ordering::Acquire).is_null() {
            return Err(Error::EngineInit("direct session already started".into()));
        }
        let nc = unsafe { ncdirect_init(ptr::null(), ptr::null_mut(), 0) };
        if nc.is_null() {
            return Err(Error::EngineInit("direct session failed to start".into()));
        }
        self.handle.store(nc, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let nc = self.handle.swap(ptr::null_mut(), Ordering::AcqRel);
        if nc.is_null() {
            return Ok(());
        }
        if unsafe { ncdirect_stop(nc) } < 0 {
            return Err(Error::Render("direct session stop reported failure".into()));
        }
        Ok(())
    }

    fn put_str(&self, text: &str, channels: Option<Channels>) -> Result<u32> {
        let nc = self.direct()?;
        let text = to_c_string(text)?;
        // A zero channel pair has both halves marked default, which leaves
        // the session's last-set color in effect.
        let packed = channels.map(Channels::raw).unwrap_or(0);
        let written = unsafe { ncdirect_putstr(nc, packed, text.as_ptr()) };
        if written < 0 {
            return Err(Error::Render("direct write failed".into()));
        }
        Ok(written as u32)
    }

    fn dim_rows(&self) -> Result<u32> {
        Ok(unsafe { ncdirect_dim_y(self.direct()?) } as u32)
    }

    fn dim_cols(&self) -> Result<u32> {
        Ok(unsafe { ncdirect_dim_x(self.direct()?) } as u32)
    }

    fn enable_cursor(&self) -> Result<()> {
        if unsafe { ncdirect_cursor_enable(self.direct()?) } != 0 {
            return Err(Error::Render("failed to enable cursor".into()));
        }
        Ok(())
    }

    fn disable_cursor(&self) -> Result<()> {
        if unsafe { ncdirect_cursor_disable(self.direct()?) } != 0 {
            return Err(Error::Render("failed to disable cursor".into()));
        }
        Ok(())
    }
}

impl Drop for NativeDirectEngine {
    fn drop(&mut self) {
        let nc = self.handle.swap(ptr::null_mut(), Ordering::AcqRel);
        if !nc.is_null() {
            unsafe { ncdirect_stop(nc) };
        }
    }
}
