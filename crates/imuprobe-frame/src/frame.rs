use std::fmt;

/// MSB of the address byte; set for reads, cleared for writes.
pub const READ_BIT: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    /// Address byte as it goes out on MOSI. The caller's own high bit is ignored.
    pub fn address_byte(&self, register: u8) -> u8 {
        match self {
            Direction::Read => register | READ_BIT,
            Direction::Write => register & !READ_BIT,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Read => "read",
            Direction::Write => "write",
        })
    }
}

/// One register access, laid out the way the sensor expects it on the wire:
/// an address byte followed by either dummy bytes (read) or payload (write).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFrame {
    pub address: u8,
    pub direction: Direction,
    pub payload: Vec<u8>,
}

impl RegisterFrame {
    /// A read of `length` bytes; the payload is the dummy bytes clocked out
    /// while the sensor shifts data back.
    pub fn read(register: u8, length: usize) -> Self {
        Self {
            address: register & !READ_BIT,
            direction: Direction::Read,
            payload: vec![0; length],
        }
    }

    pub fn write(register: u8, data: &[u8]) -> Self {
        Self {
            address: register & !READ_BIT,
            direction: Direction::Write,
            payload: data.to_vec(),
        }
    }

    pub fn address_byte(&self) -> u8 {
        self.direction.address_byte(self.address)
    }

    /// Number of bytes clocked on the bus for this frame.
    pub fn wire_len(&self) -> usize {
        1 + self.payload.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut tx = Vec::with_capacity(self.wire_len());
        tx.push(self.address_byte());
        tx.extend_from_slice(&self.payload);
        tx
    }

    /// Strips the byte received while the address was shifted out.
    ///
    /// Returns `None` when `rx` does not cover the whole frame.
    pub fn response<'a>(&self, rx: &'a [u8]) -> Option<&'a [u8]> {
        if rx.len() != self.wire_len() {
            return None;
        }
        Some(&rx[1..])
    }
}
