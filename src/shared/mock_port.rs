// In-memory serial ports for exercising sessions and batches without hardware.

use crate::shared::session::PortOpener;
use anyhow::{Result, anyhow};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

// Everything observed on one mock port, readable after the port is dropped.
#[derive(Debug, Default)]
pub struct PortLog {
    pub written: Vec<u8>,
    pub write_calls: usize,
    pub reads: usize,
    pub released: bool,
}

pub struct MockPort {
    script: VecDeque<io::Result<Vec<u8>>>,
    fail_write: bool,
    log: Rc<RefCell<PortLog>>,
}

impl MockPort {
    pub fn new() -> (Self, Rc<RefCell<PortLog>>) {
        let log = Rc::new(RefCell::new(PortLog::default()));
        let port = Self {
            script: VecDeque::new(),
            fail_write: false,
            log: Rc::clone(&log),
        };
        (port, log)
    }

    pub fn reply(mut self, chunk: &[u8]) -> Self {
        self.script.push_back(Ok(chunk.to_vec()));
        self
    }

    pub fn read_error(mut self, kind: io::ErrorKind) -> Self {
        self.script.push_back(Err(io::Error::new(kind, "mock read failure")));
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_write = true;
        self
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.log.borrow_mut().reads += 1;
        match self.script.pop_front() {
            Some(Ok(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.script.push_front(Ok(chunk.split_off(n)));
                }
                Ok(n)
            }
            Some(Err(err)) => Err(err),
            // Running dry would otherwise spin forever in the drain loop.
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock script exhausted")),
        }
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        let mut log = self.log.borrow_mut();
        log.write_calls += 1;
        log.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MockPort {
    fn drop(&mut self) {
        self.log.borrow_mut().released = true;
    }
}

// Hands out pre-scripted ports in order and records every open request.
#[derive(Default)]
pub struct MockOpener {
    ports: VecDeque<MockPort>,
    pub opened: Vec<(String, u32)>,
    pub fail_open: bool,
}

impl MockOpener {
    pub fn with_ports(ports: Vec<MockPort>) -> Self {
        Self {
            ports: ports.into(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }
}

impl PortOpener for MockOpener {
    type Port = MockPort;

    fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<MockPort> {
        if self.fail_open {
            return Err(anyhow!("mock open failure: {port_name}"));
        }
        self.opened.push((port_name.to_string(), baud_rate));
        self.ports
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted port left for {port_name}"))
    }
}

// Ten complete lines, the point at which a drain stops.
pub fn ten_lines() -> Vec<u8> {
    let mut bytes = b"$PERDACK,PERDAPI,0,0*3D\r\n".to_vec();
    for idx in 0..9 {
        bytes.extend_from_slice(format!("$GPZDA,{idx}\r\n").as_bytes());
    }
    bytes
}
