use cu132_core::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Transport that raises the interrupt itself on a chosen read
///
/// Read number `cancel_on_read` (zero-based) cancels the token before
/// returning its chunk. Once the script is drained it returns empty reads.
struct InterruptingTransport {
    inbound: VecDeque<Vec<u8>>,
    reads: usize,
    cancel_on_read: usize,
    cancel: CancelToken,
    sent: Vec<u8>,
}

impl InterruptingTransport {
    fn new(chunks: &[&[u8]], cancel_on_read: usize, cancel: &CancelToken) -> Self {
        Self {
            inbound: chunks.iter().map(|c| c.to_vec()).collect(),
            reads: 0,
            cancel_on_read,
            cancel: cancel.clone(),
            sent: Vec::new(),
        }
    }
}

impl Write for InterruptingTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for InterruptingTransport {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        if self.reads == self.cancel_on_read {
            self.cancel.cancel();
        }
        self.reads += 1;
        Ok(self.inbound.pop_front().unwrap_or_default())
    }
}

fn interrupted_session(
    chunks: &[&[u8]],
    cancel_on_read: usize,
) -> Session<InterruptingTransport, ScriptedBits> {
    let cancel = CancelToken::new();
    let transport = InterruptingTransport::new(chunks, cancel_on_read, &cancel);
    let framer = Framer::new(transport, cancel).with_idle_poll(Duration::ZERO);
    Session::new(framer, Interpreter::new(ScriptedBits::default()))
}

#[test]
fn test_session_answers_until_cancelled() {
    let cancel = CancelToken::new();
    let transport = MemoryTransport::bytewise(b"\"0\"?\"ZX").stay_open();
    let framer = Framer::new(transport, cancel.clone()).with_idle_poll(Duration::from_millis(1));
    let mut session = Session::new(framer, Interpreter::new(ScriptedBits::constant(false)));

    let canceller = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            cancel.cancel();
        })
    };
    let stats = session.run().unwrap();
    canceller.join().unwrap();

    assert_eq!(
        stats,
        SessionStats {
            version: 1,
            status: 0,
            sensor: 1,
            unknown_command: 1,
            unknown_prefix: 1,
        }
    );

    let mut expected = b"0".to_vec();
    expected.extend(frame(b"5321"));
    expected.extend(b"?");
    expected.extend(frame(b"FBBBBBBBBG"));
    expected.extend(b"Z#");
    expected.extend(b"#");
    assert_eq!(session.framer().transport().written(), expected);
}

#[test]
fn test_session_ends_on_hang_up() {
    let framer = Framer::new(MemoryTransport::bytewise(b"\"0"), CancelToken::new());
    let mut session = Session::new(framer, Interpreter::new(RandomBits::seeded(9)));
    let err = session.run().unwrap_err();
    assert!(matches!(err, ProtocolError::IoError(_)));
    assert_eq!(session.stats().version, 1);
}

#[test]
fn test_run_once_outcomes() {
    let framer = Framer::new(MemoryTransport::bytewise(b"\"?\"?"), CancelToken::new());
    let mut session = Session::new(framer, Interpreter::new(ScriptedBits::new([true, false])));
    assert_eq!(session.run_once().unwrap(), Exchange::Poll(PollReply::Status));
    assert_eq!(session.run_once().unwrap(), Exchange::Poll(PollReply::Sensor));
    assert_eq!(session.stats().total(), 2);

    let transport = session.into_framer().into_inner();
    assert_eq!(transport.flushes(), 4);
}

#[test]
fn test_no_reply_to_bytes_arriving_with_interrupt() {
    let mut session = interrupted_session(&[b"X"], 0);
    let stats = session.run().unwrap();
    assert_eq!(stats.total(), 0);
    assert!(session.framer().transport().sent.is_empty());
}

#[test]
fn test_interrupt_after_prefix_ends_without_echo() {
    // Prefix read, then the interrupt lands while waiting for the command
    let mut session = interrupted_session(&[b"\""], 1);
    let stats = session.run().unwrap();
    assert_eq!(stats.total(), 0);
    assert!(session.framer().transport().sent.is_empty());
}

#[test]
fn test_command_arriving_with_interrupt_is_not_echoed() {
    let mut session = interrupted_session(&[b"\"", b"0"], 1);
    let stats = session.run().unwrap();
    assert_eq!(stats.total(), 0);
    assert!(session.framer().transport().sent.is_empty());
}

#[test]
fn test_interrupt_between_exchanges_keeps_earlier_replies() {
    let mut session = interrupted_session(&[b"\"", b"0", b"\"", b"0"], 2);
    let stats = session.run().unwrap();
    assert_eq!(stats.version, 1);
    assert_eq!(session.framer().transport().sent, b"05321;$".to_vec());
}
