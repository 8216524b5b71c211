//! One-way, human-readable status stream.
//!
//! Each completed cycle produces one CSV-style line:
//! `tick,TAG,sense,target,min,max`. Manual cycles leave the numeric fields
//! empty.

use core::fmt::{self, Write as _};

use embedded_io_async::Write;
use heapless::String;

use crate::{averager::Window, discharge::Verdict, error::Error};

pub const STATUS_HEADER: &str = "tick,mode,sense,target,min,max";

// Longest record: "4294967295,DIS,65535,65535,65535,65535\r\n"
const LINE_CAPACITY: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusRecord {
    pub tick: u32,
    pub verdict: Verdict,
    /// `None` in manual mode.
    pub readings: Option<Window>,
}

impl StatusRecord {
    pub const fn automatic(tick: u32, verdict: Verdict, window: Window) -> Self {
        Self {
            tick,
            verdict,
            readings: Some(window),
        }
    }

    pub const fn manual(tick: u32, verdict: Verdict) -> Self {
        Self {
            tick,
            verdict,
            readings: None,
        }
    }

    pub fn to_line(&self) -> Result<String<LINE_CAPACITY>, Error> {
        let mut line = String::new();
        write!(line, "{}\r\n", self).map_err(|_| Error::StatusStream)?;
        Ok(line)
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},", self.tick, self.verdict)?;
        match self.readings {
            Some(w) => write!(f, "{},{},{},{}", w.sense_avg, w.target_avg, w.min, w.max),
            None => f.write_str(",,,"),
        }
    }
}

/// Writes complete lines to a byte sink.
pub struct StatusWriter<W> {
    sink: W,
}

impl<W: Write> StatusWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub async fn write_header(&mut self) -> Result<(), Error> {
        let mut line: String<LINE_CAPACITY> = String::new();
        write!(line, "{}\r\n", STATUS_HEADER).map_err(|_| Error::StatusStream)?;
        self.write_line(&line).await
    }

    pub async fn write_record(&mut self, record: &StatusRecord) -> Result<(), Error> {
        let line = record.to_line()?;
        self.write_line(&line).await
    }

    async fn write_line(&mut self, line: &str) -> Result<(), Error> {
        self.sink
            .write_all(line.as_bytes())
            .await
            .map_err(|_| Error::StatusStream)?;
        self.sink.flush().await.map_err(|_| Error::StatusStream)
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
