//! Exact-length reads from a stream under an optional, shared timeout budget.

use std::{
    io::{self, Read},
    os::unix::io::AsRawFd,
    time::{Duration, Instant},
};

use log::trace;

use crate::error::TransportError;

/// Time allowance shared by a sequence of reads.
///
/// Every successful [`read_exact`] charges the wall-clock time it spent, so
/// the reads composing one frame all draw from the same allowance. A read
/// that times out leaves the budget exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudget {
    remaining: Duration,
}

impl TimeoutBudget {
    pub fn new(remaining: Duration) -> Self {
        Self { remaining }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Drops the remaining allowance, forcing the next read to time out.
    pub fn exhaust(&mut self) {
        self.remaining = Duration::ZERO;
    }

    fn charge(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }
}

/// A byte source that can wait for readability.
pub trait WaitReadable: Read {
    /// Waits at most `timeout` for data (or end of stream) to become readable.
    /// Returns `false` if the wait elapsed first.
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool>;
}

impl<T: Read + AsRawFd> WaitReadable for T {
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let mut pollfd = libc::pollfd {
            fd: self.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        let result = unsafe { libc::poll(&mut pollfd, 1, poll_timeout_ms(timeout)) };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(result > 0)
    }
}

/// Rounds up so that a sub-millisecond remainder still waits instead of
/// failing on a zero-length poll.
fn poll_timeout_ms(timeout: Duration) -> libc::c_int {
    let ms = timeout.as_micros().div_ceil(1000);
    libc::c_int::try_from(ms).unwrap_or(libc::c_int::MAX)
}

/// Reads exactly `len` bytes from `source`.
///
/// Without a budget this blocks until the bytes arrive or the stream fails.
/// With a budget, an already exhausted budget fails immediately with
/// [`TransportError::Timeout`], and so does a readiness wait that elapses with
/// no data (leaving the budget at zero). On success the budget is reduced by
/// the elapsed time.
pub fn read_exact<R: WaitReadable>(
    source: &mut R,
    len: usize,
    budget: Option<&mut TimeoutBudget>,
) -> Result<Vec<u8>, TransportError> {
    let mut buf = vec![0; len];
    match budget {
        None => fill(source, &mut buf)?,
        Some(budget) => fill_within(source, &mut buf, budget)?,
    }
    Ok(buf)
}

fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<(), TransportError> {
    let mut pos = 0;
    while pos < buf.len() {
        match source.read(&mut buf[pos..]) {
            Ok(0) => return Err(TransportError::Eof),
            Ok(n) => pos += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(TransportError::Io(e)),
        }
    }
    Ok(())
}

fn fill_within<R: WaitReadable>(
    source: &mut R,
    buf: &mut [u8],
    budget: &mut TimeoutBudget,
) -> Result<(), TransportError> {
    if budget.is_exhausted() {
        return Err(TransportError::Timeout);
    }

    let start = Instant::now();
    let Some(deadline) = start.checked_add(budget.remaining()) else {
        // budget beyond what the clock can represent, nothing to enforce
        fill(source, buf)?;
        budget.charge(start.elapsed());
        return Ok(());
    };
    let mut pos = 0;

    while pos < buf.len() {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            budget.exhaust();
            return Err(TransportError::Timeout);
        }

        match source.wait_readable(left) {
            Ok(true) => {},
            Ok(false) => {
                budget.exhaust();
                return Err(TransportError::Timeout);
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransportError::Io(e)),
        }

        match source.read(&mut buf[pos..]) {
            Ok(0) => return Err(TransportError::Eof),
            Ok(n) => pos += n,
            // spurious readiness, wait again against the same deadline
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {},
            Err(e) => return Err(TransportError::Io(e)),
        }
    }

    let elapsed = start.elapsed();
    budget.charge(elapsed);
    trace!(
        "read {} bytes in {:?}, {:?} left",
        buf.len(),
        elapsed,
        budget.remaining()
    );
    Ok(())
}
