use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::data::*;
use crate::expand::expand;
use crate::macros::{MAX_NAME_LEN, MacroTable, is_ident_byte};
use crate::scanner::{is_pre_regexp, scan_regexp, scan_string};
use crate::stream::Stream;

/// Streams `input` to `output`, expanding macro comments found in `table`,
/// and returns the flushed output.
pub fn transform<R: Read, W: Write>(input: R, output: W, table: &MacroTable) -> Result<W> {
    let mut stream = Stream::new(input, output);
    process(&mut stream, table)?;
    debug!(lines = stream.line(), "finished");
    stream.finish()
}

/// Walks the program text once, echoing ordinary code and rewriting macro
/// comments.
///
/// `left` is the last significant character written, which decides whether
/// a bare `/` starts a regexp or divides.
pub fn process<R: Read, W: Write>(s: &mut Stream<R, W>, table: &MacroTable) -> Result<()> {
    let mut left = 0u8;
    while let Some(c) = s.get(false)? {
        match c {
            b'\'' | b'"' | b'`' => {
                s.emit(c)?;
                scan_string(s, c, false)?;
                left = c;
            }
            b'/' => match s.peek()? {
                Some(b'/') => line_comment(s)?,
                Some(b'*') => {
                    s.get(false)?;
                    if block_comment(s, table)? {
                        left = b'}';
                    }
                }
                _ => {
                    s.emit(b'/')?;
                    if is_pre_regexp(left) {
                        scan_regexp(s, false)?;
                    }
                    left = b'/';
                }
            },
            _ => {
                s.emit(c)?;
                if c > b' ' {
                    left = c;
                }
            }
        }
    }
    Ok(())
}

/// Echoes a `//` comment through its line terminator. The first slash has
/// been consumed.
fn line_comment<R: Read, W: Write>(s: &mut Stream<R, W>) -> Result<()> {
    s.emit(b'/')?;
    while let Some(c) = s.get(true)? {
        if c == b'\n' || c == b'\r' {
            break;
        }
    }
    Ok(())
}

/// Handles a block comment whose `/*` has been consumed. Returns whether it
/// was expanded as a macro.
fn block_comment<R: Read, W: Write>(s: &mut Stream<R, W>, table: &MacroTable) -> Result<bool> {
    let start = s.line();
    let mut name = String::new();
    while name.len() < MAX_NAME_LEN {
        match s.get(false)? {
            Some(c) if is_ident_byte(c) => name.push(char::from(c)),
            Some(c) => {
                s.unget(c);
                break;
            }
            None => break,
        }
    }

    if let Some(entry) = table.lookup(&name).filter(|_| !name.is_empty()) {
        expand(s, entry)?;
        return Ok(true);
    }

    trace!(comment = %name, line = start, "echoing comment");
    s.emits("/*")?;
    s.emits(&name)?;
    loop {
        match s.get(true)? {
            None => return Err(JsDevError::UnterminatedComment { line: start }),
            Some(b'*') if s.peek()? == Some(b'/') => {
                s.get(true)?;
                return Ok(false);
            }
            Some(b'/') if s.peek()? == Some(b'*') => {
                return Err(JsDevError::NestedComment { line: s.line() });
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(specs: &[&str], text: &str) -> Result<String> {
        let table = MacroTable::from_specs(specs.iter().copied())?;
        let out = transform(text.as_bytes(), Vec::new(), &table)?;
        Ok(String::from_utf8(out).unwrap())
    }

    const SPECS: &[&str] = &["debug", "log:console.log", "alarm:alert"];

    #[test]
    fn plain_code_passes_through() {
        let text = "var a = b / c, s = 'it''s', t = \"/*\";\r\n\
                    // line /* comment\n\
                    f(/re[/]x\\//g, `tpl ${x}`); /* note */\n";
        assert_eq!(run(SPECS, text).unwrap(), text);
    }

    #[test]
    fn unmatched_comment_is_echoed() {
        assert_eq!(run(SPECS, "/*foo bar*/").unwrap(), "/*foo bar*/");
        assert_eq!(run(SPECS, "a/**/b").unwrap(), "a/**/b");
        assert_eq!(run(SPECS, "/*debugger x*/").unwrap(), "/*debugger x*/");
        assert_eq!(run(SPECS, "/* debug x*/").unwrap(), "/* debug x*/");
        assert_eq!(run(&[], "/*debug x*/").unwrap(), "/*debug x*/");
    }

    #[test]
    fn expansion_shapes() {
        assert_eq!(run(SPECS, "/*debug x=1*/").unwrap(), "{x=1;}");
        assert_eq!(run(SPECS, "/*log 'hi'*/").unwrap(), "{console.log('hi');}");
        assert_eq!(
            run(SPECS, "/*alarm(x>0) 'danger'*/").unwrap(),
            "if (x>0) {alert('danger');}"
        );
        assert_eq!(
            run(SPECS, "/*alarm({a:[1,2]}) 'x'*/").unwrap(),
            "if ({a:[1,2]}) {alert('x');}"
        );
    }

    #[test]
    fn expansion_inside_code() {
        let text = "function f(a) {\n    /*log 'f', a*/\n    return a * 2;\n}\n";
        let want = "function f(a) {\n    {console.log('f', a);}\n    return a * 2;\n}\n";
        assert_eq!(run(SPECS, text).unwrap(), want);
    }

    #[test]
    fn slash_after_operand_is_division() {
        assert_eq!(run(SPECS, "x = a/b/c;").unwrap(), "x = a/b/c;");
        assert_eq!(run(SPECS, "x = (a)/2/*debug y*/").unwrap(), "x = (a)/2{y;}");
    }

    #[test]
    fn slash_after_pre_regexp_char_is_regexp() {
        // Read as division, a `'` here would open a string and swallow the rest.
        assert_eq!(run(SPECS, "f(/'/)").unwrap(), "f(/'/)");
        assert_eq!(run(SPECS, "x = /[/*]/;").unwrap(), "x = /[/*]/;");
    }

    #[test]
    fn closing_quote_is_significant() {
        assert_eq!(run(SPECS, "x = 'a' / 2 / 1;").unwrap(), "x = 'a' / 2 / 1;");
    }

    #[test]
    fn name_is_capped_at_max_length() {
        let name = "a".repeat(MAX_NAME_LEN);
        let text = format!("/*{}b x*/", name);
        assert_eq!(run(&[name.as_str()], &text).unwrap(), "{b x;}");
    }

    #[test]
    fn failures() {
        assert!(matches!(
            run(SPECS, "/*debug 'oops*/").unwrap_err(),
            JsDevError::AmbiguousCommentBoundary {
                line: 1,
                context: ScanContext::String
            }
        ));
        assert!(matches!(
            run(SPECS, "a;\n/*debug 'oops").unwrap_err(),
            JsDevError::UnterminatedLiteral {
                line: 2,
                literal: Literal::String
            }
        ));
        assert!(matches!(
            run(SPECS, "/*x /*y*/").unwrap_err(),
            JsDevError::NestedComment { line: 1 }
        ));
        assert!(matches!(
            run(SPECS, "a\n/* open\n\n").unwrap_err(),
            JsDevError::UnterminatedComment { line: 2 }
        ));
        assert!(matches!(
            run(SPECS, "/*debug x = 1").unwrap_err(),
            JsDevError::UnterminatedStuff { line: 1 }
        ));
        assert!(matches!(
            run(SPECS, "/*alarm(x > 0 'y'").unwrap_err(),
            JsDevError::UnterminatedCondition { line: 1 }
        ));
        assert!(matches!(
            run(SPECS, "s = \"abc\n").unwrap_err(),
            JsDevError::UnterminatedLiteral { line: 1, .. }
        ));
    }

    #[test]
    fn line_numbers_follow_crlf() {
        let err = run(SPECS, "a\r\nb\r\nc\r\n/*x /*").unwrap_err();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn second_pass_is_identity() {
        let once = run(SPECS, "f();/*log x*/ g(/a/);/*note*/").unwrap();
        assert_eq!(once, "f();{console.log(x);} g(/a/);/*note*/");
        assert_eq!(run(SPECS, &once).unwrap(), once);
    }
}
