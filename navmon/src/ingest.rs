//! Frame after frame ingestion of a navmon stream.

use std::{io, time::Duration};

use log::info;

use crate::{
    dispatch::Dispatcher,
    error::TransportError,
    frame::read_frame,
    nav::galileo::TowTracking,
    report::DecodedReport,
    transport::{TimeoutBudget, WaitReadable},
};

pub trait ReportHandler {
    fn handle(&mut self, _report: DecodedReport) {}
}

/// Implement handler for simple callbacks / closures
impl<F: FnMut(DecodedReport)> ReportHandler for F {
    fn handle(&mut self, report: DecodedReport) {
        self(report)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Time allowed for reading each frame, `None` waits forever
    pub frame_timeout: Option<Duration>,
    pub tow_tracking: TowTracking,
}

/// How a stream ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Eof,
    Timeout,
}

pub struct NavStream<R: WaitReadable> {
    source: R,
    dispatcher: Dispatcher,
    frame_timeout: Option<Duration>,
}

impl<R: WaitReadable> NavStream<R> {
    pub fn new(source: R, config: IngestConfig) -> Self {
        Self {
            source,
            dispatcher: Dispatcher::new(config.tow_tracking),
            frame_timeout: config.frame_timeout,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    /// Reads, decodes and dispatches the next frame.
    pub fn next_report(&mut self) -> Result<DecodedReport, TransportError> {
        let mut budget = self.frame_timeout.map(TimeoutBudget::new);
        let frame = read_frame(&mut self.source, budget.as_mut())?;
        Ok(self.dispatcher.dispatch_bytes(&frame.payload))
    }

    pub fn on_report<F: FnMut(DecodedReport)>(&mut self, mut callback: F) -> io::Result<StreamEnd> {
        self.process(&mut callback)
    }

    /// Hands every report to `handler` until the stream ends. End of stream
    /// and timeouts end it normally, other I/O failures are returned.
    pub fn process(&mut self, handler: &mut impl ReportHandler) -> io::Result<StreamEnd> {
        let mut count = 0u64;
        loop {
            match self.next_report() {
                Ok(report) => {
                    handler.handle(report);
                    count += 1;
                },
                Err(TransportError::Eof) => {
                    info!("end of stream after {} frames", count);
                    return Ok(StreamEnd::Eof);
                },
                Err(TransportError::Timeout) => {
                    info!("timed out after {} frames", count);
                    return Ok(StreamEnd::Timeout);
                },
                Err(TransportError::Io(e)) => return Err(e),
            }
        }
    }
}
