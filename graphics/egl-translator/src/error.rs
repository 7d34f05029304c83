//! EGL error codes

use crate::consts::*;

/// Failure of a translator entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EglError {
    /// Display known but not initialized
    NotInitialized,
    /// Resource cannot be accessed, e.g. a context current elsewhere
    BadAccess,
    /// Host refused to allocate a resource
    BadAlloc,
    /// Unknown attribute or invalid attribute value
    BadAttribute,
    /// Config handle does not resolve
    BadConfig,
    /// Context handle does not resolve
    BadContext,
    BadCurrentSurface,
    /// Display handle does not resolve
    BadDisplay,
    /// Arguments are inconsistent with each other
    BadMatch,
    /// Native window is invalid
    BadNativeWindow,
    BadParameter,
    /// Surface handle does not resolve
    BadSurface,
}

impl EglError {
    /// EGL numeric value
    pub const fn code(self) -> EGLint {
        match self {
            EglError::NotInitialized => EGL_NOT_INITIALIZED,
            EglError::BadAccess => EGL_BAD_ACCESS,
            EglError::BadAlloc => EGL_BAD_ALLOC,
            EglError::BadAttribute => EGL_BAD_ATTRIBUTE,
            EglError::BadConfig => EGL_BAD_CONFIG,
            EglError::BadContext => EGL_BAD_CONTEXT,
            EglError::BadCurrentSurface => EGL_BAD_CURRENT_SURFACE,
            EglError::BadDisplay => EGL_BAD_DISPLAY,
            EglError::BadMatch => EGL_BAD_MATCH,
            EglError::BadNativeWindow => EGL_BAD_NATIVE_WINDOW,
            EglError::BadParameter => EGL_BAD_PARAMETER,
            EglError::BadSurface => EGL_BAD_SURFACE,
        }
    }

    pub fn from_code(code: EGLint) -> Option<Self> {
        let err = match code {
            EGL_NOT_INITIALIZED => EglError::NotInitialized,
            EGL_BAD_ACCESS => EglError::BadAccess,
            EGL_BAD_ALLOC => EglError::BadAlloc,
            EGL_BAD_ATTRIBUTE => EglError::BadAttribute,
            EGL_BAD_CONFIG => EglError::BadConfig,
            EGL_BAD_CONTEXT => EglError::BadContext,
            EGL_BAD_CURRENT_SURFACE => EglError::BadCurrentSurface,
            EGL_BAD_DISPLAY => EglError::BadDisplay,
            EGL_BAD_MATCH => EglError::BadMatch,
            EGL_BAD_NATIVE_WINDOW => EglError::BadNativeWindow,
            EGL_BAD_PARAMETER => EglError::BadParameter,
            EGL_BAD_SURFACE => EglError::BadSurface,
            _ => return None,
        };
        Some(err)
    }

    pub fn message(&self) -> &'static str {
        match self {
            EglError::NotInitialized => "Display not initialized",
            EglError::BadAccess => "Resource not accessible",
            EglError::BadAlloc => "Allocation failed",
            EglError::BadAttribute => "Bad attribute",
            EglError::BadConfig => "Bad config",
            EglError::BadContext => "Bad context",
            EglError::BadCurrentSurface => "Bad current surface",
            EglError::BadDisplay => "Bad display",
            EglError::BadMatch => "Inconsistent arguments",
            EglError::BadNativeWindow => "Bad native window",
            EglError::BadParameter => "Bad parameter",
            EglError::BadSurface => "Bad surface",
        }
    }
}

impl std::fmt::Display for EglError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#x})", self.message(), self.code())
    }
}

impl std::error::Error for EglError {}

/// Per-thread error state answered by `get_error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCode {
    #[default]
    Success,
    Error(EglError),
}

impl ErrorCode {
    pub fn is_success(&self) -> bool {
        *self == ErrorCode::Success
    }

    pub const fn code(self) -> EGLint {
        match self {
            ErrorCode::Success => EGL_SUCCESS,
            ErrorCode::Error(err) => err.code(),
        }
    }
}

impl From<EglError> for ErrorCode {
    fn from(err: EglError) -> Self {
        ErrorCode::Error(err)
    }
}

/// Result type for translator operations
pub type Result<T, E = EglError> = core::result::Result<T, E>;
