//! Destinations for streamed output and progress reports.
//!
//! Primary output (summaries) goes to a [`FragmentSink`], progress to a
//! [`ProgressSink`]. The binaries write them to stdout and stderr
//! respectively; tests capture them in memory.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

pub trait FragmentSink {
    /// Receives one piece of a response, in arrival order.
    fn fragment(&mut self, text: &str) -> io::Result<()>;

    /// Called once a whole response has been delivered.
    fn end_response(&mut self) -> io::Result<()>;
}

/// Writes fragments to stdout as they arrive, one response per line.
#[derive(Debug, Default)]
pub struct Stdout;

impl FragmentSink for Stdout {
    fn fragment(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn end_response(&mut self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(b"\n")?;
        out.flush()
    }
}

#[derive(Debug, Default)]
pub struct Discard;

impl FragmentSink for Discard {
    fn fragment(&mut self, _text: &str) -> io::Result<()> {
        Ok(())
    }

    fn end_response(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An in-memory sink whose contents stay readable through its clones.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer(Arc<Mutex<String>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        self.0.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn push(&self, text: &str) -> io::Result<()> {
        self.0
            .lock()
            .map(|mut s| s.push_str(text))
            .map_err(|_| io::Error::other("output buffer poisoned"))
    }
}

impl FragmentSink for SharedBuffer {
    fn fragment(&mut self, text: &str) -> io::Result<()> {
        self.push(text)
    }

    fn end_response(&mut self) -> io::Result<()> {
        self.push("\n")
    }
}

pub trait ProgressSink {
    /// `percent` of the current pass is done, in `0.0..100.0`.
    fn report(&mut self, percent: f64);

    fn finish(&mut self);
}

/// Overwrites a single stderr line with the running percentage.
#[derive(Debug, Default)]
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn report(&mut self, percent: f64) {
        let mut err = io::stderr().lock();
        let _ = write!(err, "\rWorking... {percent:.0}%");
        let _ = err.flush();
    }

    fn finish(&mut self) {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "\rFinished! 100%");
        let _ = err.flush();
    }
}

#[derive(Debug, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&mut self, _percent: f64) {}

    fn finish(&mut self) {}
}
