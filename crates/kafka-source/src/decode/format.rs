//! Human-readable rendering of decoded keys and values.

use std::io;

use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, PrettyFormatter};

/// Re-serialize JSON bytes with two-space indentation.
///
/// Field order is kept as it appeared in the input. With `color`, keys and
/// scalars are wrapped in ANSI escapes.
pub fn pretty_value(data: &[u8], color: bool) -> serde_json::Result<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    if color {
        serialize_with(&value, Colored::new(PrettyFormatter::new()))
    } else {
        serde_json::to_vec_pretty(&value)
    }
}

/// Render a key on a single line.
///
/// JSON keys are spaced out like `{ "id": 1 }`; anything else is shown as
/// (lossy) UTF-8 text and never colored.
pub fn format_key(data: &[u8], color: bool) -> String {
    single_line_json(data, color).unwrap_or_else(|| String::from_utf8_lossy(data).into_owned())
}

fn single_line_json(data: &[u8], color: bool) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(data).ok()?;
    let out = if color {
        serialize_with(&value, Colored::new(SingleLine::default()))
    } else {
        serialize_with(&value, SingleLine::default())
    };
    String::from_utf8(out.ok()?).ok()
}

fn serialize_with<F: Formatter>(
    value: &serde_json::Value,
    formatter: F,
) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

mod ansi {
    pub const KEY: &[u8] = b"\x1b[34;1m";
    pub const STRING: &[u8] = b"\x1b[32m";
    pub const NUMBER: &[u8] = b"\x1b[36m";
    pub const BOOL: &[u8] = b"\x1b[33m";
    pub const NULL: &[u8] = b"\x1b[30;1m";
    pub const RESET: &[u8] = b"\x1b[0m";
}

fn paint<W: ?Sized + io::Write>(
    writer: &mut W,
    color: &[u8],
    write: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    writer.write_all(color)?;
    write(writer)?;
    writer.write_all(ansi::RESET)
}

/// Layout of `inner`, with object keys in bold blue, strings green, numbers
/// cyan, booleans yellow and null bold black.
struct Colored<F> {
    inner: F,
    in_key: bool,
}

impl<F> Colored<F> {
    fn new(inner: F) -> Self {
        Self {
            inner,
            in_key: false,
        }
    }
}

impl<F: Formatter> Formatter for Colored<F> {
    fn write_null<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        paint(writer, ansi::NULL, |w| self.inner.write_null(w))
    }

    fn write_bool<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: bool) -> io::Result<()> {
        paint(writer, ansi::BOOL, |w| self.inner.write_bool(w, value))
    }

    fn write_i64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: i64) -> io::Result<()> {
        paint(writer, ansi::NUMBER, |w| self.inner.write_i64(w, value))
    }

    fn write_u64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: u64) -> io::Result<()> {
        paint(writer, ansi::NUMBER, |w| self.inner.write_u64(w, value))
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        paint(writer, ansi::NUMBER, |w| self.inner.write_f64(w, value))
    }

    fn write_number_str<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        paint(writer, ansi::NUMBER, |w| self.inner.write_number_str(w, value))
    }

    fn begin_string<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(if self.in_key { ansi::KEY } else { ansi::STRING })?;
        self.inner.begin_string(writer)
    }

    fn end_string<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_string(writer)?;
        writer.write_all(ansi::RESET)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        self.inner.write_string_fragment(writer, fragment)
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        self.inner.write_char_escape(writer, char_escape)
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.in_key = true;
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.in_key = false;
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Pretty formatter with newlines replaced by spaces and no indentation.
#[derive(Default)]
struct SingleLine {
    has_value: bool,
}

impl SingleLine {
    fn open<W: ?Sized + io::Write>(&mut self, writer: &mut W, token: &[u8]) -> io::Result<()> {
        self.has_value = false;
        writer.write_all(token)
    }

    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, token: &[u8]) -> io::Result<()> {
        if self.has_value {
            writer.write_all(b" ")?;
        }
        writer.write_all(token)
    }

    fn separator<W: ?Sized + io::Write>(writer: &mut W, first: bool) -> io::Result<()> {
        writer.write_all(if first { b" " } else { b", " })
    }
}

impl Formatter for SingleLine {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        Self::separator(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        Self::separator(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}
