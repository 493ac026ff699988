//! Output sinks.

use crate::bytecode::BufferKind;
use crate::error::RuntimeError;
use std::io::Write;

/// Where rendered text goes. `explicit` is false for literal template
/// content and true for everything computed.
pub trait OutputBuffer {
    fn append(&mut self, text: &str, explicit: bool) -> Result<(), RuntimeError>;
}

#[derive(Debug, Default)]
pub struct StringBuffer {
    out: String,
}

impl StringBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl OutputBuffer for StringBuffer {
    fn append(&mut self, text: &str, _explicit: bool) -> Result<(), RuntimeError> {
        self.out.push_str(text);
        Ok(())
    }
}

/// Keeps every append as its own fragment.
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    fragments: Vec<String>,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn into_string(self) -> String {
        self.fragments.concat()
    }
}

impl OutputBuffer for FragmentBuffer {
    fn append(&mut self, text: &str, _explicit: bool) -> Result<(), RuntimeError> {
        if !text.is_empty() {
            self.fragments.push(text.to_string());
        }
        Ok(())
    }
}

/// Streams output into any [`Write`].
#[derive(Debug)]
pub struct WriterBuffer<W: Write> {
    writer: W,
}

impl<W: Write> WriterBuffer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputBuffer for WriterBuffer<W> {
    fn append(&mut self, text: &str, _explicit: bool) -> Result<(), RuntimeError> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// A buffer chosen by [`BufferKind`], used for captured output.
#[derive(Debug)]
pub(crate) enum Capture {
    String(StringBuffer),
    Fragments(FragmentBuffer),
}

impl Capture {
    pub(crate) fn new(kind: BufferKind) -> Self {
        match kind {
            BufferKind::String => Capture::String(StringBuffer::new()),
            BufferKind::Fragments => Capture::Fragments(FragmentBuffer::new()),
        }
    }

    pub(crate) fn finish(self) -> String {
        match self {
            Capture::String(buffer) => buffer.into_string(),
            Capture::Fragments(buffer) => buffer.into_string(),
        }
    }
}

impl OutputBuffer for Capture {
    fn append(&mut self, text: &str, explicit: bool) -> Result<(), RuntimeError> {
        match self {
            Capture::String(buffer) => buffer.append(text, explicit),
            Capture::Fragments(buffer) => buffer.append(text, explicit),
        }
    }
}
