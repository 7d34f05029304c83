//! Argument checks shared by the entry points

use crate::consts::*;
use crate::error::{EglError, Result};

/// Split an attribute list into `(name, value)` pairs, stopping at the first
/// `EGL_NONE` name. A name without a value is a bad attribute.
pub fn attrib_pairs(attribs: &[EGLint]) -> Result<Vec<(EGLint, EGLint)>> {
    let mut pairs = Vec::new();
    let mut rest = attribs;
    loop {
        match rest {
            [] | [EGL_NONE, ..] => return Ok(pairs),
            [_] => return Err(EglError::BadAttribute),
            [name, value, tail @ ..] => {
                pairs.push((*name, *value));
                rest = tail;
            }
        }
    }
}

/// Whether the list names no attribute
pub fn no_attribs(attribs: &[EGLint]) -> bool {
    matches!(attribs, [] | [EGL_NONE, ..])
}

/// Whether a make-current triple asks to release the current context
pub fn is_release<C, S>(context: Option<C>, draw: Option<S>, read: Option<S>) -> bool {
    context.is_none() && draw.is_none() && read.is_none()
}

/// Whether a make-current triple mixes "none" and real handles
pub fn is_bad_context_match<C, S>(context: Option<C>, draw: Option<S>, read: Option<S>) -> bool {
    match context {
        Some(_) => draw.is_none() || read.is_none(),
        None => draw.is_some() || read.is_some(),
    }
}

pub fn is_power_of_two(value: EGLint) -> bool {
    value > 0 && (value & (value - 1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrib_pairs_stop_at_none() {
        let pairs = attrib_pairs(&[EGL_RED_SIZE, 8, EGL_NONE, EGL_GREEN_SIZE, 8]).unwrap();
        assert_eq!(pairs, vec![(EGL_RED_SIZE, 8)]);
        assert!(attrib_pairs(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_name_rejected() {
        assert_eq!(attrib_pairs(&[EGL_RED_SIZE]), Err(EglError::BadAttribute));
    }

    #[test]
    fn test_triple_checks() {
        assert!(is_release::<u32, u32>(None, None, None));
        assert!(!is_bad_context_match(Some(1), Some(2), Some(2)));
        assert!(is_bad_context_match(Some(1), None, Some(2)));
        assert!(is_bad_context_match::<u32, u32>(None, Some(2), None));
    }

    #[test]
    fn test_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(256));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(96));
    }
}
