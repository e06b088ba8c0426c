//! Register-addressed bus boundary
//!
//! The driver only needs three primitives from the bus. Implementations
//! report failures as `io::Error`; the device layer wraps them with the
//! address they occurred at.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

/// Byte and block access to registers of devices on a shared bus
pub trait BusTransport {
    /// Read `length` consecutive registers starting at `register`
    fn read_block(&mut self, address: u8, register: u8, length: usize) -> io::Result<Vec<u8>>;

    /// Read a single register
    fn read_byte(&mut self, address: u8, register: u8) -> io::Result<u8>;

    /// Write a single register
    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> io::Result<()>;
}

/// Lets two devices time-multiplex one bus from a single thread
impl<T: BusTransport> BusTransport for Rc<RefCell<T>> {
    fn read_block(&mut self, address: u8, register: u8, length: usize) -> io::Result<Vec<u8>> {
        self.borrow_mut().read_block(address, register, length)
    }

    fn read_byte(&mut self, address: u8, register: u8) -> io::Result<u8> {
        self.borrow_mut().read_byte(address, register)
    }

    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> io::Result<()> {
        self.borrow_mut().write_byte(address, register, value)
    }
}
