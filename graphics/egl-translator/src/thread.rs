//! Per-thread binding state
//!
//! Each guest thread owns one [`EglThread`] and passes it to every entry
//! point. It records the current context and surfaces, the last error and
//! the bound client API; nothing in it is shared with other threads.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::context::Context;
use crate::display::Display;
use crate::error::{ErrorCode, Result};
use crate::surface::Surface;
use crate::types::{ClientApiKind, ContextHandle, DisplayHandle};

/// Next thread token
static NEXT_THREAD: AtomicU64 = AtomicU64::new(1);

/// Objects a thread has current. The references keep a destroyed context
/// or surface alive until the thread moves off it.
#[derive(Debug, Clone)]
pub struct Binding {
    pub display: Arc<Display>,
    pub context: Arc<Context>,
    pub read: Arc<Surface>,
    pub draw: Arc<Surface>,
}

#[derive(Debug)]
pub struct EglThread {
    token: u64,
    binding: Option<Binding>,
    last_error: ErrorCode,
    api: ClientApiKind,
}

impl EglThread {
    pub fn new() -> Self {
        Self {
            token: NEXT_THREAD.fetch_add(1, Ordering::Relaxed),
            binding: None,
            last_error: ErrorCode::Success,
            api: ClientApiKind::default(),
        }
    }

    /// Process-unique identity of this thread record
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub(crate) fn set_binding(&mut self, binding: Binding) -> Option<Binding> {
        self.binding.replace(binding)
    }

    pub(crate) fn take_binding(&mut self) -> Option<Binding> {
        self.binding.take()
    }

    /// Handle of the context this thread still references, without checking
    /// that its display still knows it
    pub fn cached_context_handle(&self) -> Option<ContextHandle> {
        self.binding.as_ref().map(|binding| binding.context.handle())
    }

    pub fn cached_display_handle(&self) -> Option<DisplayHandle> {
        self.binding.as_ref().map(|binding| binding.display.handle())
    }

    /// Return the recorded error and reset it to success
    pub fn get_error(&mut self) -> ErrorCode {
        core::mem::take(&mut self.last_error)
    }

    pub fn peek_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Record `error` unless an earlier one is still pending
    pub fn set_error(&mut self, error: impl Into<ErrorCode>) {
        if self.last_error.is_success() {
            self.last_error = error.into();
        }
    }

    /// Record the error of a failed call and pass the result on
    pub fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.set_error(*error);
        }
        result
    }

    pub fn api(&self) -> ClientApiKind {
        self.api
    }

    pub(crate) fn set_api(&mut self, api: ClientApiKind) {
        self.api = api;
    }
}

impl Default for EglThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EglThread {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            let surfaces = binding.context.clear_surfaces();
            binding.context.release(self.token);
            drop(surfaces);
        }
    }
}
