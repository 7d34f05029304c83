//! Contexts, share groups and images

#![cfg(feature = "headless")]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use egl_translator::consts::*;
use egl_translator::{
    ContextHandle, EglError, EglExtension, EglThread, GlesVersion, ImageHandle, ProcAddress,
    SharePolicy, TranslatorConfig,
};
use gles_names::{GroupKey, NameRequest, ObjectData, ObjectKind, ShareGroup, TextureData};

fn group_of(harness: &Harness, context: ContextHandle) -> Arc<ShareGroup> {
    let display = harness.egl.info().display(harness.display).unwrap();
    let context = display.get_context(context).unwrap();
    context.share_group().clone()
}

/// Texture with side data in `group`, as the GLES layer would leave it
fn texture(group: &ShareGroup, width: u32, height: u32) -> u64 {
    let name = group.generate(ObjectKind::Texture, NameRequest::Fresh);
    let data = ObjectData::Texture(TextureData::new(width, height, 0x1908));
    assert!(group.set_object_data(ObjectKind::Texture, name, Arc::new(data)));
    name
}

#[test]
fn test_shared_context_sees_same_names() {
    let (harness, mut thread) = Harness::new();
    let first = harness.context(&mut thread, None);
    let second = harness.context(&mut thread, Some(first));
    let (a, b) = (group_of(&harness, first), group_of(&harness, second));
    assert!(Arc::ptr_eq(&a, &b));

    let name = a.generate(ObjectKind::Texture, NameRequest::Fresh);
    assert!(b.global_name_of(ObjectKind::Texture, name).is_some());
    assert_eq!(
        a.global_name_of(ObjectKind::Texture, name),
        b.global_name_of(ObjectKind::Texture, name)
    );
}

#[test]
fn test_unshared_contexts_have_separate_groups() {
    let (harness, mut thread) = Harness::new();
    let first = harness.context(&mut thread, None);
    let second = harness.context(&mut thread, None);
    let (a, b) = (group_of(&harness, first), group_of(&harness, second));
    assert!(!Arc::ptr_eq(&a, &b));

    a.generate(ObjectKind::Texture, NameRequest::Exact(1));
    assert!(!b.exists(ObjectKind::Texture, 1));
    b.generate(ObjectKind::Texture, NameRequest::Exact(1));
    assert_ne!(
        a.global_name_of(ObjectKind::Texture, 1),
        b.global_name_of(ObjectKind::Texture, 1)
    );
}

#[test]
fn test_group_outlives_first_context() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let first = harness.context(&mut thread, None);
    let second = harness.context(&mut thread, Some(first));
    let group = group_of(&harness, first);
    let name = group.generate(ObjectKind::Texture, NameRequest::Fresh);

    let display = egl.info().display(harness.display).unwrap();
    let manager = display.manager(GlesVersion::V1_1).clone();
    assert_eq!(manager.key_count(), 2);

    egl.destroy_context(&mut thread, harness.display, first).unwrap();
    assert_eq!(manager.key_count(), 1);
    assert!(group.exists(ObjectKind::Texture, name));

    egl.destroy_context(&mut thread, harness.display, second).unwrap();
    assert_eq!(manager.key_count(), 0);
    assert!(!group.exists(ObjectKind::Texture, name));
    assert_eq!(egl.info().globals().live_count(ObjectKind::Texture), 0);
}

#[test]
fn test_group_names_released_before_host_context() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let context = harness.context(&mut thread, None);
    texture(&group_of(&harness, context), 8, 8);
    let globals = egl.info().globals().clone();
    assert_eq!(globals.live_count(ObjectKind::Texture), 1);

    let live_at_destroy = Arc::new(AtomicUsize::new(usize::MAX));
    let seen = live_at_destroy.clone();
    harness.engine.on_destroy_context(move |_| {
        seen.store(globals.live_count(ObjectKind::Texture), Ordering::SeqCst);
    });

    egl.destroy_context(&mut thread, harness.display, context).unwrap();
    assert_eq!(live_at_destroy.load(Ordering::SeqCst), 0);
    assert_eq!(harness.engine.live_context_count(), 0);
}

#[test]
fn test_versions_use_separate_managers() {
    let (harness, mut thread) = Harness::new();
    let es1 = harness.context(&mut thread, None);
    let es2 = harness.es2_context(&mut thread);
    let display = harness.egl.info().display(harness.display).unwrap();

    assert_eq!(display.get_context(es2).unwrap().version(), GlesVersion::V2_0);
    assert_eq!(display.manager(GlesVersion::V1_1).key_count(), 1);
    assert_eq!(display.manager(GlesVersion::V2_0).key_count(), 1);
    assert!(!Arc::ptr_eq(&group_of(&harness, es1), &group_of(&harness, es2)));
    assert_eq!(harness.es2.context_count(), 1);
}

#[test]
fn test_new_contexts_share_with_registered_context() {
    let (harness, mut thread) = Harness::new();
    let first = harness.context(&mut thread, None);
    let display = harness.egl.info().display(harness.display).unwrap();
    let native = display.get_context(first).unwrap().native();
    assert_eq!(display.global_shared_context(), Some(native));
    assert_eq!(
        display.manager(GlesVersion::V1_1).get_global_context_key(),
        Some(GroupKey(native.0))
    );
}

#[test]
fn test_dedicated_share_context() {
    let options = TranslatorConfig {
        share_policy: SharePolicy::Dedicated,
        ..TranslatorConfig::default()
    };
    let (harness, mut thread) = Harness::with_options(options);
    let context = harness.context(&mut thread, None);
    assert_eq!(harness.engine.live_context_count(), 2);

    let display = harness.egl.info().display(harness.display).unwrap();
    let dedicated = display.global_shared_context().unwrap();
    assert_ne!(display.get_context(context).unwrap().native(), dedicated);
    assert_eq!(display.global_shared_context(), Some(dedicated));

    drop(display);
    harness.egl.info().remove_display(harness.display);
    assert_eq!(harness.engine.live_context_count(), 0);
}

#[test]
fn test_create_context_errors() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    assert_eq!(
        egl.create_context(&mut thread, harness.display, RGBA8888, None, &[EGL_RED_SIZE, 8, EGL_NONE]),
        Err(EglError::BadAttribute)
    );
    assert_eq!(
        egl.create_context(
            &mut thread,
            harness.display,
            RGBA8888,
            Some(ContextHandle(u32::MAX)),
            &[EGL_NONE]
        ),
        Err(EglError::BadContext)
    );

    harness.engine.set_fail_contexts(true);
    assert_eq!(
        egl.create_context(&mut thread, harness.display, RGBA8888, None, &[EGL_NONE]),
        Err(EglError::BadAlloc)
    );
    assert_eq!(harness.es1.context_count(), 0);

    harness.engine.set_fail_contexts(false);
    harness.es1.set_fail_contexts(true);
    assert_eq!(
        egl.create_context(&mut thread, harness.display, RGBA8888, None, &[EGL_NONE]),
        Err(EglError::BadAlloc)
    );
    assert_eq!(harness.engine.live_context_count(), 0);
    assert_eq!(thread.get_error(), egl_translator::ErrorCode::Error(EglError::BadAttribute));
}

#[test]
fn test_create_context_without_es2_client() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let engine = harness.engine.clone();
    let solo = egl_translator::Egl::new(Arc::new(engine), TranslatorConfig::default());
    solo.register_client_api(harness.es1.clone());
    let display = solo.get_display(egl_translator::NativeDisplayId(5)).unwrap();
    solo.initialize(&mut thread, display).unwrap();

    assert_eq!(
        solo.create_context(&mut thread, display, RGBA8888, None, &[EGL_CONTEXT_CLIENT_VERSION, 2, EGL_NONE]),
        Err(EglError::BadAttribute)
    );
    assert!(egl.info().client_api(GlesVersion::V2_0).is_some());
}

#[test]
fn test_query_context() {
    let (harness, mut thread) = Harness::new();
    let context = harness.context(&mut thread, None);
    let egl = &harness.egl;
    assert_eq!(
        egl.query_context(&mut thread, harness.display, context, EGL_CONFIG_ID),
        Ok(RGBA8888.0)
    );
    assert_eq!(
        egl.query_context(&mut thread, harness.display, context, EGL_WIDTH),
        Err(EglError::BadAttribute)
    );
    egl.destroy_context(&mut thread, harness.display, context).unwrap();
    assert_eq!(
        egl.query_context(&mut thread, harness.display, context, EGL_CONFIG_ID),
        Err(EglError::BadContext)
    );
}

#[test]
fn test_create_image_from_texture() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let context = harness.context(&mut thread, None);
    let group = group_of(&harness, context);
    let tex = texture(&group, 32, 16);

    let image = egl
        .create_image(&mut thread, harness.display, context, EGL_GL_TEXTURE_2D_KHR, tex, &[EGL_NONE])
        .unwrap();
    let display = egl.info().display(harness.display).unwrap();
    let snapshot = display.get_image(image).unwrap();
    assert_eq!((snapshot.width, snapshot.height), (32, 16));
    assert_eq!(
        Some(snapshot.global_texture),
        group.global_name_of(ObjectKind::Texture, tex)
    );

    egl.destroy_image(&mut thread, harness.display, image).unwrap();
    assert_eq!(
        egl.destroy_image(&mut thread, harness.display, image),
        Err(EglError::BadParameter)
    );
}

#[test]
fn test_create_image_errors() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let context = harness.context(&mut thread, None);
    let group = group_of(&harness, context);
    let empty = texture(&group, 0, 0);
    let bare = group.generate(ObjectKind::Texture, NameRequest::Fresh);

    let create = |thread: &mut EglThread, target, texture| {
        egl.create_image(thread, harness.display, context, target, texture, &[])
    };
    assert_eq!(create(&mut thread, EGL_TEXTURE_2D, empty), Err(EglError::BadParameter));
    assert_eq!(create(&mut thread, EGL_GL_TEXTURE_2D_KHR, 999), Err(EglError::BadParameter));
    assert_eq!(create(&mut thread, EGL_GL_TEXTURE_2D_KHR, empty), Err(EglError::BadMatch));
    assert_eq!(create(&mut thread, EGL_GL_TEXTURE_2D_KHR, bare), Err(EglError::BadMatch));
    assert_eq!(
        egl.create_image(
            &mut thread,
            harness.display,
            ContextHandle(u32::MAX),
            EGL_GL_TEXTURE_2D_KHR,
            bare,
            &[]
        ),
        Err(EglError::BadContext)
    );
}

#[test]
fn test_image_attached_to_two_contexts() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let first = harness.context(&mut thread, None);
    let second = harness.context(&mut thread, None);
    let tex = texture(&group_of(&harness, first), 8, 8);
    let image = egl
        .create_image(&mut thread, harness.display, first, EGL_GL_TEXTURE_2D_KHR, tex, &[])
        .unwrap();

    harness.bind(&mut thread, surface, first);
    egl.attach_image(&mut thread, image).unwrap();
    harness.bind(&mut thread, surface, second);
    egl.attach_image(&mut thread, image).unwrap();

    let display = egl.info().display(harness.display).unwrap();
    let (first_ctx, second_ctx) = (
        display.get_context(first).unwrap(),
        display.get_context(second).unwrap(),
    );

    egl.detach_image(&mut thread, image).unwrap();
    assert!(second_ctx.attached_image(image).is_none());
    assert!(first_ctx.attached_image(image).is_some());
    assert_eq!(
        egl.detach_image(&mut thread, image),
        Err(EglError::BadParameter)
    );
}

#[test]
fn test_image_calls_need_current_context() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    assert_eq!(egl.attach_image(&mut thread, ImageHandle(1)), Err(EglError::BadContext));
    assert_eq!(egl.release_texture_image(&mut thread, 1), Err(EglError::BadContext));

    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);
    assert_eq!(
        egl.attach_image(&mut thread, ImageHandle(u32::MAX)),
        Err(EglError::BadParameter)
    );
}

#[test]
fn test_texture_samples_image_until_released() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let producer = harness.context(&mut thread, None);
    let consumer = harness.context(&mut thread, None);

    let source = texture(&group_of(&harness, producer), 64, 32);
    let image = egl
        .create_image(&mut thread, harness.display, producer, EGL_GL_TEXTURE_2D_KHR, source, &[])
        .unwrap();
    let image_global = group_of(&harness, producer)
        .global_name_of(ObjectKind::Texture, source)
        .unwrap();

    let group = group_of(&harness, consumer);
    let sibling = texture(&group, 1, 1);
    let own_global = group.global_name_of(ObjectKind::Texture, sibling).unwrap();

    harness.bind(&mut thread, surface, consumer);
    egl.image_target_texture(&mut thread, image, sibling).unwrap();
    assert_eq!(group.global_name_of(ObjectKind::Texture, sibling), Some(image_global));
    let data = group.get_object_data(ObjectKind::Texture, sibling).unwrap();
    let data = data.as_texture().unwrap();
    assert_eq!((data.width, data.height), (64, 32));
    assert_eq!(data.source_image, Some(image.0));
    assert_eq!(data.saved_global, Some(own_global));

    let display = egl.info().display(harness.display).unwrap();
    let consumer_ctx = display.get_context(consumer).unwrap();
    assert!(consumer_ctx.attached_image(image).is_some());

    egl.release_texture_image(&mut thread, sibling).unwrap();
    assert_eq!(group.global_name_of(ObjectKind::Texture, sibling), Some(own_global));
    assert!(consumer_ctx.attached_image(image).is_none());
    assert_eq!(
        egl.release_texture_image(&mut thread, sibling),
        Err(EglError::BadParameter)
    );
}

#[test]
fn test_deleted_source_keeps_image_name_until_released() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let globals = egl.info().globals();
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let producer = harness.context(&mut thread, None);
    let consumer = harness.context(&mut thread, None);

    let producer_group = group_of(&harness, producer);
    let source = texture(&producer_group, 16, 16);
    let image_global = producer_group.global_name_of(ObjectKind::Texture, source).unwrap();
    let image = egl
        .create_image(&mut thread, harness.display, producer, EGL_GL_TEXTURE_2D_KHR, source, &[])
        .unwrap();

    let group = group_of(&harness, consumer);
    let sibling = texture(&group, 1, 1);
    harness.bind(&mut thread, surface, consumer);
    egl.image_target_texture(&mut thread, image, sibling).unwrap();

    producer_group.delete(ObjectKind::Texture, source);
    assert!(globals.is_live(ObjectKind::Texture, image_global));
    let fresh = texture(&producer_group, 2, 2);
    assert_ne!(
        producer_group.global_name_of(ObjectKind::Texture, fresh),
        Some(image_global)
    );

    egl.destroy_image(&mut thread, harness.display, image).unwrap();
    assert!(globals.is_live(ObjectKind::Texture, image_global));
    assert_eq!(group.global_name_of(ObjectKind::Texture, sibling), Some(image_global));

    egl.release_texture_image(&mut thread, sibling).unwrap();
    assert!(!globals.is_live(ObjectKind::Texture, image_global));
}

#[test]
fn test_deleting_sibling_texture_frees_saved_name() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    let group = group_of(&harness, context);
    let source = texture(&group, 4, 4);
    let sibling = texture(&group, 4, 4);
    let own_global = group.global_name_of(ObjectKind::Texture, sibling).unwrap();
    let image = egl
        .create_image(&mut thread, harness.display, context, EGL_GL_TEXTURE_2D_KHR, source, &[])
        .unwrap();

    harness.bind(&mut thread, surface, context);
    egl.image_target_texture(&mut thread, image, sibling).unwrap();
    let globals = egl.info().globals();
    assert!(globals.is_live(ObjectKind::Texture, own_global));

    group.delete(ObjectKind::Texture, sibling);
    assert!(!globals.is_live(ObjectKind::Texture, own_global));
    assert!(group.exists(ObjectKind::Texture, source));
}

#[test]
fn test_proc_address_lookup() {
    let (harness, mut thread) = Harness::new();
    let egl = &harness.egl;
    assert_eq!(
        egl.get_proc_address("eglCreateImageKHR"),
        Some(ProcAddress::Translator(EglExtension::CreateImageKhr))
    );
    assert_eq!(egl.get_proc_address("eglSwapInterval"), None);

    // Client tables are built on the first bind
    let engine_address = egl.get_proc_address("glGenFramebuffersOES");
    let surface = harness.pbuffer(&mut thread, RGBA8888);
    let context = harness.context(&mut thread, None);
    harness.bind(&mut thread, surface, context);
    let client_address = egl.get_proc_address("glGenFramebuffersOES");
    assert!(engine_address.is_some());
    assert!(client_address.is_some());
    assert_ne!(engine_address, client_address);
}
