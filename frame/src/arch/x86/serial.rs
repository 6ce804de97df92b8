// SPDX-License-Identifier: MPL-2.0

//! The console I/O.

use core::fmt::{self, Write};

use spin::Mutex;
use x86_64::instructions::port::{Port, PortReadOnly};

bitflags::bitflags! {
  struct LineSts: u8 {
    const INPUT_FULL = 1;
    const OUTPUT_EMPTY = 1 << 5;
  }
}

/// The base port of COM1.
const COM1_BASE: u16 = 0x3F8;

struct SerialPort {
    data: Port<u8>,
    line_status: PortReadOnly<u8>,
}

impl SerialPort {
    fn new(base: u16) -> Self {
        Self {
            data: Port::new(base),
            line_status: PortReadOnly::new(base + 5),
        }
    }

    fn line_status(&mut self) -> LineSts {
        // SAFETY: COM1's line status register is read-only and side-effect free.
        LineSts::from_bits_truncate(unsafe { self.line_status.read() })
    }

    fn send(&mut self, byte: u8) {
        while !self.line_status().contains(LineSts::OUTPUT_EMPTY) {
            core::hint::spin_loop();
        }
        // SAFETY: COM1 is owned by the console and the transmit buffer is empty.
        unsafe { self.data.write(byte) };
    }
}

// Serializes whole messages so that concurrent prints do not interleave.
static CONSOLE_COM1_LOCK: Mutex<()> = Mutex::new(());

struct Stdout<'a>(&'a mut SerialPort);

impl Write for Stdout<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &c in s.as_bytes() {
            if c == b'\n' {
                self.0.send(b'\r');
            }
            self.0.send(c);
        }
        Ok(())
    }
}

/// Prints the formatted arguments to the standard output using the serial port.
#[inline]
pub fn print(args: fmt::Arguments) {
    let _guard = CONSOLE_COM1_LOCK.lock();
    let mut port = SerialPort::new(COM1_BASE);
    // The serial writer never fails.
    let _ = Stdout(&mut port).write_fmt(args);
}
