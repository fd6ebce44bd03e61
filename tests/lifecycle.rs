// tests/lifecycle.rs

//! End-to-end lifecycle scenarios against the mock engine: the full
//! write/render cycle, stale handles after stop, the blocking-input
//! contract, and the process-wide default context.

use std::time::Duration;
use termsurface::engine::{MockDirectEngine, MockEngine};
use termsurface::{
    init_default_context, shutdown_default_context, std_plane, Channels, Context, DirectSession,
    Error, EventCode, KeySymbol, RawInput, SessionOptions,
};

fn started_context() -> (MockEngine, Context) {
    let engine = MockEngine::new(24, 80);
    let ctx = Context::new(Box::new(engine.clone()), &SessionOptions::default())
        .expect("mock init cannot fail");
    (engine, ctx)
}

fn raw_key(codepoint: u32) -> RawInput {
    RawInput {
        codepoint,
        row: 0,
        col: 0,
        alt: false,
        shift: false,
        ctrl: true,
        seqnum: 1,
    }
}

#[test_log::test]
fn write_render_cycle_keeps_dimensions() {
    let (engine, ctx) = started_context();
    let plane = ctx.standard_plane().unwrap();
    let before = plane.dimensions().unwrap();

    assert_eq!(plane.put_str_yx("hi", 0, 0).unwrap(), 2);
    ctx.render().unwrap();

    assert_eq!(plane.dimensions().unwrap(), before);
    assert_eq!(engine.render_count(), 1);
}

#[test]
fn stale_plane_after_stop_errors_instead_of_crashing() {
    let (_engine, ctx) = started_context();
    let plane = ctx.standard_plane().unwrap();
    let child = plane.create_sub_plane(1, 1, Some(4), Some(10)).unwrap();

    ctx.stop().unwrap();

    assert_eq!(plane.render(), Err(Error::StaleHandle));
    assert_eq!(child.put_str("late"), Err(Error::StaleHandle));
}

#[test]
fn blocking_input_decodes_queued_events() {
    let (engine, ctx) = started_context();
    engine.push_input(raw_key(KeySymbol::Up.code()));
    engine.push_input(raw_key('x' as u32));

    let first = ctx.get_input_blocking().unwrap();
    assert_eq!(first.code, EventCode::Key(KeySymbol::Up));
    assert!(first.modifiers.contains(termsurface::Modifiers::CTRL));

    let second = ctx.get_input_blocking().unwrap();
    assert_eq!(second.code, EventCode::Char('x'));
}

#[test]
fn stopping_the_context_unblocks_a_pending_input_read() {
    let (_engine, ctx) = started_context();
    let result = std::thread::scope(|s| {
        let reader = s.spawn(|| ctx.get_input_blocking());
        // Give the reader time to park inside the engine.
        std::thread::sleep(Duration::from_millis(30));
        ctx.stop().unwrap();
        reader.join().expect("reader thread panicked")
    });
    assert_eq!(result, Err(Error::StaleHandle));
}

#[test]
fn default_context_is_a_singleton_with_explicit_shutdown() {
    // The default context is process-global state, so every assertion about
    // it lives in this one test.
    let engine = MockEngine::new(10, 40);
    init_default_context(Box::new(engine), &SessionOptions::default()).unwrap();

    let a = std_plane().unwrap();
    let b = std_plane().unwrap();
    assert!(a.same_context(&b));
    assert_eq!(a, b);

    // A second install is rejected while the first is live.
    let again = init_default_context(
        Box::new(MockEngine::new(5, 5)),
        &SessionOptions::default(),
    );
    assert!(matches!(again, Err(Error::EngineInit(_))));

    shutdown_default_context().unwrap();

    // Planes handed out before the shutdown are stale now.
    assert_eq!(a.put_str("x"), Err(Error::StaleHandle));

    // With no engine installed (and none creatable here), the accessor
    // reports an init error rather than resurrecting the old context.
    assert!(matches!(std_plane(), Err(Error::EngineInit(_))));

    // Shutdown with nothing installed is a no-op.
    shutdown_default_context().unwrap();
}

#[test]
fn direct_session_cursor_cache_reflects_last_set_value() {
    let engine = MockDirectEngine::new(24, 80);
    let mut session = DirectSession::new(Box::new(engine.clone()));
    session.start().unwrap();

    session.set_cursor_enabled(false).unwrap();
    assert_eq!(session.cursor_enabled(), Some(false));

    let cyan = Channels::new().set_foreground_rgb(0, 255, 255);
    assert_eq!(session.put_str("status: ok", Some(cyan)).unwrap(), 10);
    assert_eq!(session.put_str(" (cached color)", None).unwrap(), 15);
    assert_eq!(engine.writes()[1].1, cyan);

    session.stop().unwrap();
    session.stop().unwrap();
    assert_eq!(session.put_str("x", None), Err(Error::StaleHandle));
}

#[test]
fn dropping_a_failing_context_never_panics() {
    let (engine, ctx) = started_context();
    engine.set_fail_stop(true);
    drop(ctx);
}
