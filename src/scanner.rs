use phf::phf_set;
use std::io::{Read, Write};

use crate::data::*;
use crate::stream::Stream;

/// Characters after which a `/` opens a regexp literal instead of dividing.
///
/// This is a heuristic: keywords such as `return` are not tracked, so
/// `return /x/` is read as division.
static PRE_REGEXP: phf::Set<char> = phf_set! {
    '(', ',', '=', ':', '[', '!', '&', '|', '?', '{', '}', ';',
};

pub fn is_pre_regexp(left: u8) -> bool {
    PRE_REGEXP.contains(&char::from(left))
}

/// True when `c` is a `*` that, together with the next byte, would close the
/// enclosing comment.
fn closes_comment<R: Read, W: Write>(s: &mut Stream<R, W>, c: Option<u8>) -> Result<bool> {
    Ok(c == Some(b'*') && s.peek()? == Some(b'/'))
}

fn ambiguous<T>(line: usize, context: ScanContext) -> Result<T> {
    Err(JsDevError::AmbiguousCommentBoundary { line, context })
}

/// Consumes and echoes a string literal body up to and including the
/// closing `quote`. The opening quote has already been consumed.
///
/// Backslash escapes are passed through without interpretation.
pub fn scan_string<R: Read, W: Write>(
    s: &mut Stream<R, W>,
    quote: u8,
    in_comment: bool,
) -> Result<()> {
    let start = s.line();
    loop {
        let mut c = s.get(true)?;
        if c == Some(quote) {
            return Ok(());
        }
        if c == Some(b'\\') {
            c = s.get(true)?;
        }
        if in_comment && closes_comment(s, c)? {
            return ambiguous(s.line(), ScanContext::String);
        }
        if c.is_none() {
            return Err(JsDevError::UnterminatedLiteral {
                line: start,
                literal: Literal::String,
            });
        }
    }
}

/// Consumes and echoes a regexp literal body up to and including the
/// terminating `/`. The opening slash has already been consumed.
pub fn scan_regexp<R: Read, W: Write>(s: &mut Stream<R, W>, in_comment: bool) -> Result<()> {
    let start = s.line();
    loop {
        let mut c = s.get(true)?;
        match c {
            Some(b'[') => scan_regexp_set(s, in_comment, start)?,
            Some(b'/') => {
                if in_comment && matches!(s.peek()?, Some(b'/' | b'*')) {
                    return ambiguous(s.line(), ScanContext::Regexp);
                }
                return Ok(());
            }
            Some(b'\\') => c = s.get(true)?,
            _ => {}
        }
        if in_comment && closes_comment(s, c)? {
            return ambiguous(s.line(), ScanContext::Regexp);
        }
        if c.is_none() {
            return Err(JsDevError::UnterminatedLiteral {
                line: start,
                literal: Literal::Regexp,
            });
        }
    }
}

/// `[...]` inside a regexp, where `/` does not terminate.
fn scan_regexp_set<R: Read, W: Write>(
    s: &mut Stream<R, W>,
    in_comment: bool,
    start: usize,
) -> Result<()> {
    loop {
        let mut c = s.get(true)?;
        if c == Some(b']') {
            return Ok(());
        }
        if c == Some(b'\\') {
            c = s.get(true)?;
        }
        if in_comment && closes_comment(s, c)? {
            return ambiguous(s.line(), ScanContext::Regexp);
        }
        if c.is_none() {
            return Err(JsDevError::UnterminatedLiteral {
                line: start,
                literal: Literal::RegexpSet,
            });
        }
    }
}

/// Handles a `/` met inside a macro comment: a comment opener is rejected,
/// otherwise the heuristic decides between regexp and division.
fn slash_in_comment<R: Read, W: Write>(
    s: &mut Stream<R, W>,
    left: u8,
    context: ScanContext,
) -> Result<()> {
    if matches!(s.peek()?, Some(b'/' | b'*')) {
        return ambiguous(s.line(), context);
    }
    if is_pre_regexp(left) {
        scan_regexp(s, true)?;
    }
    Ok(())
}

/// Consumes and echoes a guard expression starting at its opening `(`.
///
/// All three bracket kinds share one depth counter and their kinds are never
/// matched against each other; scanning stops once the depth is back to zero.
pub fn scan_condition<R: Read, W: Write>(s: &mut Stream<R, W>) -> Result<()> {
    let start = s.line();
    let mut left = 0u8;
    let mut depth = 0usize;
    loop {
        let c = s.get(true)?;
        match c {
            None => return Err(JsDevError::UnterminatedCondition { line: start }),
            Some(b'(' | b'{' | b'[') => depth += 1,
            Some(b')' | b'}' | b']') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(());
                }
            }
            Some(quote @ (b'\'' | b'"' | b'`')) => scan_string(s, quote, true)?,
            Some(b'/') => slash_in_comment(s, left, ScanContext::Condition)?,
            // The comment closes before the condition does.
            Some(b'*') if s.peek()? == Some(b'/') => {
                return Err(JsDevError::UnterminatedCondition { line: start });
            }
            Some(_) => {}
        }
        if let Some(c) = c.filter(|&c| c > b' ') {
            left = c;
        }
    }
}

/// Consumes the macro body, echoing it, up to the `*/` that closes the macro
/// comment. The terminator itself is consumed but not echoed.
pub fn scan_stuff<R: Read, W: Write>(s: &mut Stream<R, W>) -> Result<()> {
    let start = s.line();
    let mut left = b'{';
    loop {
        while s.peek()? == Some(b'*') {
            s.get(false)?;
            if s.peek()? == Some(b'/') {
                s.get(false)?;
                return Ok(());
            }
            s.emit(b'*')?;
            left = b'*';
        }
        let c = s.get(true)?;
        match c {
            None => return Err(JsDevError::UnterminatedStuff { line: start }),
            Some(quote @ (b'\'' | b'"' | b'`')) => scan_string(s, quote, true)?,
            Some(b'/') => slash_in_comment(s, left, ScanContext::Stuff)?,
            Some(_) => {}
        }
        if let Some(c) = c.filter(|&c| c > b' ') {
            left = c;
        }
    }
}
