use std::io::{Read, Write};

use tracing::trace;

use crate::data::*;
use crate::macros::MacroEntry;
use crate::scanner::{scan_condition, scan_stuff};
use crate::stream::Stream;

/// Rewrites a matched macro comment into executable code. The stream must be
/// positioned just after the macro name.
///
/// ```text
/// /*cmd stuff*/          ->  {stuff;}
/// /*cmd(cond) stuff*/    ->  if (cond) {stuff;}
/// /*cmd stuff*/          ->  {target(stuff);}          (cmd:target)
/// /*cmd(cond) stuff*/    ->  if (cond) {target(stuff);}
/// ```
///
/// A condition is recognized only when `(` directly follows the name. One
/// space or tab separating the name (or condition) from the stuff belongs to
/// the comment syntax and is dropped.
pub fn expand<R: Read, W: Write>(s: &mut Stream<R, W>, entry: &MacroEntry) -> Result<()> {
    trace!(macro_name = %entry.name, line = s.line(), "expanding macro");

    if s.peek()? == Some(b'(') {
        s.emits("if ")?;
        scan_condition(s)?;
        s.emit(b' ')?;
    }
    if matches!(s.peek()?, Some(b' ' | b'\t')) {
        s.get(false)?;
    }

    s.emit(b'{')?;
    match &entry.target {
        Some(target) => {
            s.emits(target)?;
            s.emit(b'(')?;
            scan_stuff(s)?;
            s.emit(b')')?;
        }
        None => scan_stuff(s)?,
    }
    s.emits(";}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expand_with(entry: &MacroEntry, text: &str) -> Result<String> {
        let mut s = Stream::new(text.as_bytes(), Vec::new());
        expand(&mut s, entry)?;
        Ok(String::from_utf8(s.finish()?).unwrap())
    }

    fn entry(name: &str, target: Option<&str>) -> MacroEntry {
        MacroEntry {
            name: name.to_string(),
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn four_shapes() {
        let plain = entry("debug", None);
        let call = entry("alarm", Some("alert"));
        assert_eq!(expand_with(&plain, " x=1*/").unwrap(), "{x=1;}");
        assert_eq!(expand_with(&plain, "(x) y()*/").unwrap(), "if (x) {y();}");
        assert_eq!(expand_with(&call, " 'hi'*/").unwrap(), "{alert('hi');}");
        assert_eq!(
            expand_with(&call, "(x>0) 'danger'*/").unwrap(),
            "if (x>0) {alert('danger');}"
        );
    }

    #[test]
    fn space_before_paren_makes_it_stuff() {
        let plain = entry("debug", None);
        assert_eq!(expand_with(&plain, " (x)*/").unwrap(), "{(x);}");
    }

    #[test]
    fn only_one_separator_is_dropped() {
        let plain = entry("debug", None);
        assert_eq!(expand_with(&plain, "  x*/").unwrap(), "{ x;}");
        assert_eq!(expand_with(&plain, "\nx*/").unwrap(), "{\nx;}");
        assert_eq!(expand_with(&plain, "*/").unwrap(), "{;}");
    }

    #[test]
    fn condition_without_separator() {
        let call = entry("log", Some("f"));
        assert_eq!(expand_with(&call, "(a)b*/").unwrap(), "if (a) {f(b);}");
    }
}
