use std::{
    io::{self, Cursor, Read, Write},
    os::unix::net::UnixStream,
    thread,
    time::{Duration, Instant},
};

use navmon::{read_exact, TimeoutBudget, TransportError, WaitReadable};

fn delayed_writer(
    mut peer: UnixStream,
    delay: Duration,
    data: &'static [u8],
) -> thread::JoinHandle<UnixStream> {
    thread::spawn(move || {
        thread::sleep(delay);
        peer.write_all(data).unwrap();
        peer
    })
}

#[test]
fn budget_is_charged_for_elapsed_time() {
    let (mut rx, tx) = UnixStream::pair().unwrap();
    let writer = delayed_writer(tx, Duration::from_millis(40), b"12345678");

    let mut budget = TimeoutBudget::from_millis(100);
    let data = read_exact(&mut rx, 8, Some(&mut budget)).unwrap();
    assert_eq!(data, b"12345678");
    // about 60 ms left, the writer may start sleeping just before we read
    let left = budget.remaining();
    assert!(left <= Duration::from_millis(65), "{:?} left", left);
    assert!(left >= Duration::from_millis(40), "{:?} left", left);
    assert!(!budget.is_exhausted());
    writer.join().unwrap();
}

#[test]
fn silent_source_times_out() {
    let (mut rx, _tx) = UnixStream::pair().unwrap();

    let mut budget = TimeoutBudget::from_millis(10);
    let start = Instant::now();
    let res = read_exact(&mut rx, 4, Some(&mut budget));
    assert!(matches!(res, Err(TransportError::Timeout)));
    assert!(budget.is_exhausted());
    assert!(start.elapsed() >= Duration::from_millis(10));
}

#[test]
fn exhausted_budget_fails_before_reading() {
    let (mut rx, mut tx) = UnixStream::pair().unwrap();
    tx.write_all(b"ready").unwrap();

    let mut budget = TimeoutBudget::from_millis(0);
    assert!(matches!(
        read_exact(&mut rx, 5, Some(&mut budget)),
        Err(TransportError::Timeout)
    ));

    // the data is still there for the next reader
    assert_eq!(read_exact(&mut rx, 5, None).unwrap(), b"ready");
}

#[test]
fn closed_peer_is_eof() {
    let (mut rx, mut tx) = UnixStream::pair().unwrap();
    tx.write_all(b"ab").unwrap();
    drop(tx);

    let mut budget = TimeoutBudget::from_millis(1000);
    assert!(matches!(
        read_exact(&mut rx, 4, Some(&mut budget)),
        Err(TransportError::Eof)
    ));

    let (mut rx, tx) = UnixStream::pair().unwrap();
    drop(tx);
    assert!(matches!(read_exact(&mut rx, 1, None), Err(TransportError::Eof)));
}

#[test]
fn partial_reads_are_assembled() {
    let (mut rx, mut tx) = UnixStream::pair().unwrap();
    let writer = thread::spawn(move || {
        tx.write_all(b"bert").unwrap();
        thread::sleep(Duration::from_millis(15));
        tx.write_all(b"\x00\x05").unwrap();
        thread::sleep(Duration::from_millis(15));
        tx.write_all(b"hello").unwrap();
        tx
    });

    let mut budget = TimeoutBudget::from_millis(2000);
    let data = read_exact(&mut rx, 11, Some(&mut budget)).unwrap();
    assert_eq!(data, b"bert\x00\x05hello");
    assert!(budget.remaining() < Duration::from_millis(2000));
    writer.join().unwrap();
}

#[test]
fn no_budget_blocks_until_data() {
    let (mut rx, tx) = UnixStream::pair().unwrap();
    let writer = delayed_writer(tx, Duration::from_millis(20), b"xyz");
    assert_eq!(read_exact(&mut rx, 3, None).unwrap(), b"xyz");
    writer.join().unwrap();
}

#[test]
fn zero_length_read() {
    let (mut rx, _tx) = UnixStream::pair().unwrap();
    let mut budget = TimeoutBudget::from_millis(50);
    assert_eq!(read_exact(&mut rx, 0, Some(&mut budget)).unwrap(), b"");
}

/// Source claiming readiness but refusing every other read.
struct Spurious {
    data: Cursor<Vec<u8>>,
    refuse: bool,
}

impl Read for Spurious {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.refuse = !self.refuse;
        if self.refuse {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(2);
        self.data.read(&mut buf[..n])
    }
}

impl WaitReadable for Spurious {
    fn wait_readable(&self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

#[test]
fn would_block_after_readiness_waits_again() {
    let mut source = Spurious {
        data: Cursor::new(b"abcdef".to_vec()),
        refuse: false,
    };
    let mut budget = TimeoutBudget::from_millis(1000);
    assert_eq!(
        read_exact(&mut source, 6, Some(&mut budget)).unwrap(),
        b"abcdef"
    );
}
