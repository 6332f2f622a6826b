use crossbeam_channel::{Receiver, Sender, TryRecvError};
use serialport::SerialPort;
use std::collections::VecDeque;
use std::io::{self, Read, Stdout, Write};
use std::thread;

/// Byte-oriented duplex link the simulator answers on
pub trait Transport: Write + Send {
    /// Return whatever bytes are available right now, possibly none
    fn read_available(&mut self) -> io::Result<Vec<u8>>;
}

/// Serial port wrapper implementing Transport
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialTransport {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))? as usize;
        if available == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; available];
        match self.port.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Standard input/output wrapper implementing Transport
///
/// Input is read one byte at a time on a helper thread, so `read_available`
/// never blocks and returns one byte per call. A closed input is reported as
/// `UnexpectedEof` once every byte read before it has been delivered.
pub struct StdioTransport {
    inbound: Receiver<io::Result<u8>>,
    stdout: Stdout,
}

impl StdioTransport {
    /// Answer on the process's stdin/stdout
    pub fn new() -> Self {
        Self::with_input(io::stdin())
    }

    /// Read from `input` instead of stdin; replies still go to stdout
    pub fn with_input<R: Read + Send + 'static>(input: R) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        // A failed spawn drops the sender, which reads as a closed input
        if let Err(e) = thread::Builder::new()
            .name("cu132-stdin".to_string())
            .spawn(move || pump_bytes(input, tx))
        {
            tracing::error!("Failed to start input reader: {}", e);
        }

        Self {
            inbound: rx,
            stdout: io::stdout(),
        }
    }
}

/// Forward `input` byte by byte until it closes, fails, or nobody listens
fn pump_bytes<R: Read>(mut input: R, tx: Sender<io::Result<u8>>) {
    let mut byte = [0u8; 1];
    loop {
        let item = match input.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => Ok(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Err(e),
        };
        let failed = item.is_err();
        if tx.send(item).is_err() || failed {
            break;
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdioTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.lock().flush()
    }
}

impl Transport for StdioTransport {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        match self.inbound.try_recv() {
            Ok(Ok(byte)) => Ok(vec![byte]),
            Ok(Err(e)) => Err(e),
            Err(TryRecvError::Empty) => Ok(Vec::new()),
            Err(TryRecvError::Disconnected) => {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
            }
        }
    }
}

/// In-memory transport with scripted inbound chunks
///
/// Each scripted chunk is returned by exactly one `read_available` call.
/// Every `write` call is recorded separately so callers can check both the
/// bytes and how they were split.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    flushes: usize,
    stay_open: bool,
}

impl MemoryTransport {
    /// Create a transport that delivers `chunks` in order, then hangs up
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            inbound: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            ..Self::default()
        }
    }

    /// Create a transport that delivers every byte of `bytes` as its own chunk
    pub fn bytewise(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().map(|b| [*b]))
    }

    /// Keep returning empty reads instead of hanging up once drained
    pub fn stay_open(mut self) -> Self {
        self.stay_open = true;
        self
    }

    /// Queue another inbound chunk
    pub fn push_chunk(&mut self, chunk: impl AsRef<[u8]>) {
        self.inbound.push_back(chunk.as_ref().to_vec());
    }

    /// Outbound writes in call order
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All outbound bytes concatenated
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// Number of flush calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of inbound chunks not yet read
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Forget recorded writes
    pub fn clear_writes(&mut self) {
        self.writes.clear();
        self.flushes = 0;
    }
}

impl Write for MemoryTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        match self.inbound.pop_front() {
            Some(chunk) => Ok(chunk),
            None if self.stay_open => Ok(Vec::new()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "memory transport drained",
            )),
        }
    }
}
