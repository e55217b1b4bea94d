use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, StandardStreamLock, WriteColor};

/// The maximum needed padding to align all standard annotations. The longest of
/// which is currently `warning:` at 8 bytes.
pub const ANNOTATION_MAX_PADDING: usize = 8;

/// The terminal, errors and progress go to stderr, requested data to stdout.
#[derive(Debug)]
pub struct Ui {
    stdout: StandardStream,
    stderr: StandardStream,
}

fn check_terminal<T: IsTerminal>(t: T, choice: ColorChoice) -> ColorChoice {
    match choice {
        // NOTE: termcolor doesn't check whether auto can actually be used
        ColorChoice::Auto if !t.is_terminal() => ColorChoice::Never,
        other => other,
    }
}

impl Ui {
    /// Creates a new `Ui` with the same color choice for both streams.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(check_terminal(io::stdout(), choice)),
            stderr: StandardStream::stderr(check_terminal(io::stderr(), choice)),
        }
    }

    /// Returns an exclusive lock to stdout.
    pub fn stdout(&self) -> StandardStreamLock<'_> {
        self.stdout.lock()
    }

    /// Returns an exclusive lock to stderr.
    pub fn stderr(&self) -> StandardStreamLock<'_> {
        self.stderr.lock()
    }

    /// Writes the given closure with an error annotation header.
    pub fn error_with(
        &self,
        f: impl FnOnce(&mut Indented<&mut StandardStreamLock<'_>>) -> io::Result<()>,
    ) -> io::Result<()> {
        write_annotated(&mut self.stderr(), "error:", Color::Red, ANNOTATION_MAX_PADDING, f)
    }

    /// Writes the given closure with a warning annotation header.
    pub fn warning_with(
        &self,
        f: impl FnOnce(&mut Indented<&mut StandardStreamLock<'_>>) -> io::Result<()>,
    ) -> io::Result<()> {
        write_annotated(
            &mut self.stderr(),
            "warning:",
            Color::Yellow,
            ANNOTATION_MAX_PADDING,
            f,
        )
    }

    /// Writes the given closure with a hint annotation header.
    pub fn hint_with(
        &self,
        f: impl FnOnce(&mut Indented<&mut StandardStreamLock<'_>>) -> io::Result<()>,
    ) -> io::Result<()> {
        write_annotated(&mut self.stderr(), "hint:", Color::Cyan, ANNOTATION_MAX_PADDING, f)
    }

    /// Writes an error followed by a hint.
    pub fn error_hinted_with(
        &self,
        f: impl FnOnce(&mut Indented<&mut StandardStreamLock<'_>>) -> io::Result<()>,
        h: impl FnOnce(&mut Indented<&mut StandardStreamLock<'_>>) -> io::Result<()>,
    ) -> io::Result<()> {
        self.error_with(f)?;
        self.hint_with(h)
    }

    /// A shorthand for [`Self::error_with`].
    pub fn error(&self, message: impl Display) -> io::Result<()> {
        self.error_with(|w| writeln!(w, "{message}"))
    }

    /// A shorthand for [`Self::warning_with`].
    pub fn warning(&self, message: impl Display) -> io::Result<()> {
        self.warning_with(|w| writeln!(w, "{message}"))
    }

    /// A shorthand for [`Self::hint_with`].
    pub fn hint(&self, message: impl Display) -> io::Result<()> {
        self.hint_with(|w| writeln!(w, "{message}"))
    }

    /// Flushes and resets both output streams.
    pub fn flush(&self) -> io::Result<()> {
        let mut out = self.stdout();
        out.reset()?;
        out.flush()?;

        let mut err = self.stderr();
        err.reset()?;
        err.flush()
    }
}

/// Executes the given closure with custom set and reset style closures.
pub fn write_with<W: WriteColor + ?Sized>(
    w: &mut W,
    set: impl FnOnce(&mut ColorSpec) -> &mut ColorSpec,
    unset: impl FnOnce(&mut ColorSpec) -> &mut ColorSpec,
    f: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    w.set_color(set(&mut ColorSpec::new()))?;
    f(w)?;
    w.set_color(unset(&mut ColorSpec::new()))?;
    Ok(())
}

/// A shorthand for [`write_with`] which writes bold.
pub fn write_bold<W: WriteColor + ?Sized>(
    w: &mut W,
    f: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    write_with(w, |c| c.set_bold(true), |c| c.set_bold(false), f)
}

/// A shorthand for [`write_with`] which writes with the given color.
pub fn write_colored<W: WriteColor + ?Sized>(
    w: &mut W,
    color: Color,
    f: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    write_with(w, |c| c.set_fg(Some(color)), |c| c.set_fg(None), f)
}

/// A shorthand for [`write_with`] which writes bold and with the given color.
pub fn write_bold_colored<W: WriteColor + ?Sized>(
    w: &mut W,
    color: Color,
    f: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    write_with(
        w,
        |c| c.set_bold(true).set_fg(Some(color)),
        |c| c.set_bold(false).set_fg(None),
        f,
    )
}

/// Writes a task name or other identifier in bold cyan.
pub fn write_ident<W: WriteColor + ?Sized>(w: &mut W, ident: impl Display) -> io::Result<()> {
    write_bold_colored(w, Color::Cyan, |w| write!(w, "{ident}"))
}

/// Writes the given closure as an annotation, that is, it is written with a
/// right aligned header after which each line is indented by the header
/// length.
pub fn write_annotated<W: WriteColor + ?Sized>(
    w: &mut W,
    header: &str,
    color: Color,
    max_align: impl Into<Option<usize>>,
    f: impl FnOnce(&mut Indented<&mut W>) -> io::Result<()>,
) -> io::Result<()> {
    let align = max_align.into().unwrap_or(header.len());
    write_bold_colored(w, color, |w| write!(w, "{header:>align$} "))?;

    // NOTE: the indent includes the space after the header
    f(&mut Indented::continued(w, align + 1))
}

/// A writer which indents every non-empty line.
#[derive(Debug)]
pub struct Indented<W> {
    writer: W,
    indent: usize,

    /// Whether an indent is required before the next non-newline byte.
    need_indent: bool,

    /// The color spec to restore after writing an indent.
    spec: Option<ColorSpec>,
}

impl<W> Indented<W> {
    /// Creates a new writer which indents every non-empty line.
    pub fn new(writer: W, indent: usize) -> Self {
        Self {
            writer,
            indent,
            need_indent: true,
            spec: None,
        }
    }

    /// Creates a new writer which indents every non-empty line after the first
    /// one, for writers which start on a non-empty line.
    pub fn continued(writer: W, indent: usize) -> Self {
        Self {
            need_indent: false,
            ..Self::new(writer, indent)
        }
    }
}

impl<W: WriteColor> Write for Indented<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf).map(|_| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        let pad = " ".repeat(self.indent);

        while !buf.is_empty() {
            if self.need_indent {
                let Some(len) = buf.iter().position(|&b| b != b'\n') else {
                    return self.writer.write_all(buf);
                };

                let (newlines, rest) = buf.split_at(len);
                self.writer.write_all(newlines)?;
                if self.spec.is_some() {
                    self.writer.reset()?;
                }
                self.writer.write_all(pad.as_bytes())?;
                if let Some(spec) = &self.spec {
                    self.writer.set_color(spec)?;
                }
                self.need_indent = false;
                buf = rest;
            } else {
                let Some(len) = buf.iter().position(|&b| b == b'\n') else {
                    return self.writer.write_all(buf);
                };

                let (line, rest) = buf.split_at(len + 1);
                self.writer.write_all(line)?;
                self.need_indent = true;
                buf = rest;
            }
        }

        Ok(())
    }
}

impl<W: WriteColor> WriteColor for Indented<W> {
    fn supports_color(&self) -> bool {
        self.writer.supports_color()
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.spec = Some(spec.clone());
        self.writer.set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.spec = None;
        self.writer.reset()
    }
}

#[cfg(test)]
mod tests {
    use termcolor::NoColor;

    use super::*;

    fn render(f: impl FnOnce(&mut NoColor<Vec<u8>>) -> io::Result<()>) -> String {
        let mut w = NoColor::new(vec![]);
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn test_indented() {
        let out = render(|w| write!(Indented::new(w, 2), "Hello\n\nWorld\n"));
        assert_eq!(out, "  Hello\n\n  World\n");
    }

    #[test]
    fn test_indented_continued() {
        let out = render(|w| write!(Indented::continued(w, 2), "Hello\n\nWorld\n"));
        assert_eq!(out, "Hello\n\n  World\n");
    }

    #[test]
    fn test_indented_nested() {
        let out = render(|w| write!(Indented::new(Indented::new(w, 2), 2), "Hello\nWorld"));
        assert_eq!(out, "    Hello\n    World");
    }

    #[test]
    fn test_write_annotated() {
        let out = render(|w| {
            write_annotated(w, "error:", Color::Red, ANNOTATION_MAX_PADDING, |w| {
                writeln!(w, "first")?;
                writeln!(w, "second")
            })
        });
        assert_eq!(out, "  error: first\n         second\n");
    }
}
