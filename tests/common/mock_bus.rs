//! Recording mock bus for exercising the driver without hardware

use mpu6000_capture::BusTransport;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

/// Records operations performed on the mock bus
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ReadBlock {
        address: u8,
        register: u8,
        length: usize,
    },
    ReadByte {
        address: u8,
        register: u8,
    },
    WriteByte {
        address: u8,
        register: u8,
        value: u8,
    },
}

#[derive(Debug, Default)]
struct MockState {
    /// Simulated register values (address, register) -> value
    registers: HashMap<(u8, u8), u8>,
    /// Addresses that NACK everything
    absent: Vec<u8>,
    operations: Vec<Operation>,
    fail_next_read: bool,
    fail_next_write: bool,
}

/// Cloneable handle; clones share state so tests can inspect a bus owned by a driver
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Rc<RefCell<MockState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every access to `address` fail
    pub fn remove_device(&self, address: u8) {
        self.state.borrow_mut().absent.push(address);
    }

    pub fn fail_next_read(&self) {
        self.state.borrow_mut().fail_next_read = true;
    }

    pub fn fail_next_write(&self) {
        self.state.borrow_mut().fail_next_write = true;
    }

    pub fn set_register(&self, address: u8, register: u8, value: u8) {
        self.state
            .borrow_mut()
            .registers
            .insert((address, register), value);
    }

    /// Load big-endian words into consecutive registers
    pub fn set_words(&self, address: u8, first_register: u8, words: &[i16]) {
        for (i, word) in words.iter().enumerate() {
            let [high, low] = word.to_be_bytes();
            let reg = first_register + 2 * i as u8;
            self.set_register(address, reg, high);
            self.set_register(address, reg + 1, low);
        }
    }

    pub fn register(&self, address: u8, register: u8) -> Option<u8> {
        self.state.borrow().registers.get(&(address, register)).copied()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    pub fn writes(&self) -> Vec<Operation> {
        self.operations()
            .into_iter()
            .filter(|op| matches!(op, Operation::WriteByte { .. }))
            .collect()
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }
}

fn nack(address: u8) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("no acknowledge from 0x{:02X}", address),
    )
}

impl BusTransport for MockBus {
    fn read_block(&mut self, address: u8, register: u8, length: usize) -> io::Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::ReadBlock {
            address,
            register,
            length,
        });
        if std::mem::take(&mut state.fail_next_read) || state.absent.contains(&address) {
            return Err(nack(address));
        }
        Ok((0..length)
            .map(|i| {
                let reg = register.wrapping_add(i as u8);
                state.registers.get(&(address, reg)).copied().unwrap_or(0)
            })
            .collect())
    }

    fn read_byte(&mut self, address: u8, register: u8) -> io::Result<u8> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::ReadByte { address, register });
        if std::mem::take(&mut state.fail_next_read) || state.absent.contains(&address) {
            return Err(nack(address));
        }
        Ok(state.registers.get(&(address, register)).copied().unwrap_or(0))
    }

    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::WriteByte {
            address,
            register,
            value,
        });
        if std::mem::take(&mut state.fail_next_write) || state.absent.contains(&address) {
            return Err(nack(address));
        }
        state.registers.insert((address, register), value);
        Ok(())
    }
}
