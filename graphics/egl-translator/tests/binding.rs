//! Thread binding and make-current transitions

#![cfg(feature = "headless")]

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::*;
use egl_translator::consts::*;
use egl_translator::{EglError, EglThread, ErrorCode};

#[test]
fn test_current_context_is_per_thread() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);

    assert_eq!(harness.egl.get_current_context(&thread), Some(context));
    assert_eq!(harness.egl.get_current_display(&thread), Some(harness.display));

    let egl = harness.egl.clone();
    let other = thread::spawn(move || {
        let other = EglThread::new();
        (egl.get_current_context(&other), egl.get_current_display(&other))
    });
    assert_eq!(other.join().unwrap(), (None, None));
}

#[test]
fn test_destroyed_current_context_stays_private() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);

    egl.destroy_context(&mut thread, harness.display, context).unwrap();
    let display = egl.info().display(harness.display).unwrap();
    assert!(display.get_context(context).is_none());
    assert_eq!(thread.cached_context_handle(), Some(context));
    assert_eq!(egl.get_current_context(&thread), None);

    // Still alive on the host until the thread lets go
    assert_eq!(harness.engine.live_context_count(), 1);
    egl.make_current(&mut thread, harness.display, None, None, None).unwrap();
    assert_eq!(thread.cached_context_handle(), None);
    assert_eq!(harness.engine.live_context_count(), 0);
    assert_eq!(harness.es1.context_count(), 0);
}

#[test]
fn test_destroyed_current_surface_reports_none() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);

    assert_eq!(egl.get_current_surface(&mut thread, EGL_DRAW), Ok(Some(surface)));
    egl.destroy_surface(&mut thread, harness.display, surface).unwrap();
    assert_eq!(egl.get_current_surface(&mut thread, EGL_READ), Ok(None));
    assert_eq!(harness.engine.pbuffer_count(), 1);
    assert_eq!(
        egl.get_current_surface(&mut thread, EGL_WIDTH),
        Err(EglError::BadParameter)
    );

    egl.release_thread(&mut thread).unwrap();
    assert_eq!(harness.engine.pbuffer_count(), 0);
}

#[test]
fn test_partial_triple_is_bad_match() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    assert_eq!(
        harness
            .egl
            .make_current(&mut thread, harness.display, Some(surface), None, Some(context)),
        Err(EglError::BadMatch)
    );
    assert_eq!(
        harness
            .egl
            .make_current(&mut thread, harness.display, Some(surface), Some(surface), None),
        Err(EglError::BadMatch)
    );
    assert_eq!(thread.get_error(), ErrorCode::Error(EglError::BadMatch));
}

#[test]
fn test_unknown_handles() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    let egl = &harness.egl;

    let missing_context = egl_translator::ContextHandle(u32::MAX);
    assert_eq!(
        egl.make_current(&mut thread, harness.display, Some(surface), Some(surface), Some(missing_context)),
        Err(EglError::BadContext)
    );
    let missing_surface = egl_translator::SurfaceHandle(u32::MAX);
    assert_eq!(
        egl.make_current(&mut thread, harness.display, Some(missing_surface), Some(surface), Some(context)),
        Err(EglError::BadSurface)
    );
}

#[test]
fn test_incompatible_configs_are_bad_match() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888_PBUFFER);
    let context = harness.context(&mut thread, None);
    assert_eq!(
        harness
            .egl
            .make_current(&mut thread, harness.display, Some(surface), Some(surface), Some(context)),
        Err(EglError::BadMatch)
    );
    assert_eq!(harness.engine.make_current_calls(), 0);
}

#[test]
fn test_identical_binding_skips_host() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);
    assert_eq!(harness.engine.make_current_calls(), 1);

    harness.bind(&mut thread, surface, context);
    assert_eq!(harness.engine.make_current_calls(), 1);
}

#[test]
fn test_switching_context_clears_previous_surfaces() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let first = harness.context(&mut thread, None);
    let second = harness.context(&mut thread, None);
    let display = harness.egl.info().display(harness.display).unwrap();

    harness.bind(&mut thread, surface, first);
    let first_ctx = display.get_context(first).unwrap();
    assert!(first_ctx.draw().is_some());
    assert!(first_ctx.is_current());

    harness.bind(&mut thread, surface, second);
    assert!(first_ctx.draw().is_none());
    assert!(first_ctx.read().is_none());
    assert!(!first_ctx.is_current());
    // Commands of the previous context were flushed
    assert_eq!(harness.es1.flush_count(first_ctx.client_context()), 1);

    let second_ctx = display.get_context(second).unwrap();
    assert_eq!(second_ctx.draw().map(|s| s.handle()), Some(surface));
    assert!(harness
        .es1
        .share_group(second_ctx.client_context())
        .is_some());
}

#[test]
fn test_context_current_on_other_thread_is_bad_access() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let other_surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);

    let egl = harness.egl.clone();
    let display = harness.display;
    let result = thread::spawn(move || {
        let mut other = EglThread::new();
        let result = egl.make_current(
            &mut other,
            display,
            Some(other_surface),
            Some(other_surface),
            Some(context),
        );
        (result, other.get_error())
    })
    .join()
    .unwrap();
    assert_eq!(result, (Err(EglError::BadAccess), ErrorCode::Error(EglError::BadAccess)));
}

#[test]
fn test_host_refusal_is_bad_access() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.engine.set_fail_make_current(true);
    assert_eq!(
        harness
            .egl
            .make_current(&mut thread, harness.display, Some(surface), Some(surface), Some(context)),
        Err(EglError::BadAccess)
    );
    assert_eq!(harness.egl.get_current_context(&thread), None);

    let display = harness.egl.info().display(harness.display).unwrap();
    assert!(!display.get_context(context).unwrap().is_current());
}

#[test]
fn test_closed_window_is_bad_native_window() {
    let (harness, mut thread) = Harness::new();
    let window = harness.engine.create_window(64, 64);
    let surface = harness
        .egl
        .create_window_surface(&mut thread, harness.display, RGBA8888, window, &[EGL_NONE])
        .unwrap();
    let context = harness.context(&mut thread, None);

    harness.engine.close_window(window);
    assert_eq!(
        harness
            .egl
            .make_current(&mut thread, harness.display, Some(surface), Some(surface), Some(context)),
        Err(EglError::BadNativeWindow)
    );
}

#[test]
fn test_swap_buffers_needs_current_window() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let window = harness.window(&mut thread, RGBA8888);
    let pbuffer = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);

    assert_eq!(egl.swap_buffers(&mut thread, harness.display, pbuffer), Ok(()));
    assert_eq!(
        egl.swap_buffers(&mut thread, harness.display, window),
        Err(EglError::BadSurface)
    );

    harness.bind(&mut thread, window, context);
    assert_eq!(egl.swap_buffers(&mut thread, harness.display, window), Ok(()));
    assert_eq!(harness.engine.swap_count(), 1);
}

#[test]
fn test_api_binding() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    assert_eq!(egl.query_api(&thread), EGL_OPENGL_ES_API);
    assert_eq!(egl.bind_api(&mut thread, EGL_OPENGL_ES_API), Ok(()));
    assert_eq!(
        egl.bind_api(&mut thread, EGL_OPENVG_API),
        Err(EglError::BadParameter)
    );
    assert_eq!(egl.get_error(&mut thread), EGL_BAD_PARAMETER);
}

#[test]
fn test_wait_client_finishes_current_context() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    assert_eq!(harness.egl.wait_client(&mut thread), Ok(()));

    harness.bind(&mut thread, surface, context);
    harness.egl.wait_client(&mut thread).unwrap();
    let display = harness.egl.info().display(harness.display).unwrap();
    let client_context = display.get_context(context).unwrap().client_context();
    assert_eq!(harness.es1.finish_count(client_context), 1);
}

#[test]
fn test_threads_bind_distinct_contexts() {
    let (harness, mut thread) = Harness::new();
    let pairs: Vec<_> = (0..4)
        .map(|_| {
            (
                harness.pbuffer(&mut thread, RGBA8888),
                harness.context(&mut thread, None),
            )
        })
        .collect();

    let barrier = Arc::new(Barrier::new(pairs.len()));
    let handles: Vec<_> = pairs
        .into_iter()
        .map(|(surface, context)| {
            let egl = harness.egl.clone();
            let display = harness.display;
            let barrier = barrier.clone();
            thread::spawn(move || {
                let mut thread = EglThread::new();
                barrier.wait();
                egl.make_current(&mut thread, display, Some(surface), Some(surface), Some(context))
                    .unwrap();
                let current = egl.get_current_context(&thread);
                barrier.wait();
                egl.release_thread(&mut thread).unwrap();
                (context, current)
            })
        })
        .collect();

    for handle in handles {
        let (context, current) = handle.join().unwrap();
        assert_eq!(current, Some(context));
    }
}

#[test]
fn test_dropping_thread_releases_context() {
    let (harness, mut thread) = Harness::new();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);
    drop(thread);

    let display = harness.egl.info().display(harness.display).unwrap();
    let context = display.get_context(context).unwrap();
    assert!(!context.is_current());
    assert!(context.draw().is_none());
}
