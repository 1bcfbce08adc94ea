// Command port on UART1, 57600 8N1

use core::convert::Infallible;

use esp_hal::uart::Uart;
use esp_hal::Blocking;
use portable_atomic::{AtomicU32, Ordering};
use shared::peripheral::SerialPort;

pub const BAUD_RATE: u32 = 57_600;
// Hardware RX FIFO depth
const RX_FIFO_LEN: usize = 128;

/// Receive errors cleared so far
pub static RX_ERRORS: AtomicU32 = AtomicU32::new(0);

pub struct CommandPort {
    uart: Uart<'static, Blocking>,
}

impl CommandPort {
    pub fn new(uart: Uart<'static, Blocking>) -> Self {
        Self { uart }
    }

    // Throw away what is left in the receive FIFO, reception goes on from the next byte
    fn clear_rx(&mut self) {
        let mut scratch = [0u8; RX_FIFO_LEN];
        for _ in 0..2 {
            match self.uart.read_buffered_bytes(&mut scratch) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }
}

impl SerialPort for CommandPort {
    fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        let mut byte = [0u8; 1];
        match self.uart.read_buffered_bytes(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) => {
                // FIFO overflow or framing error
                let count = RX_ERRORS.fetch_add(1, Ordering::Relaxed) + 1;
                log::warn!("uart rx error {:?} ({} total)", e, count);
                self.clear_rx();
                Err(nb::Error::WouldBlock)
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        match self.uart.write_bytes(&[byte]) {
            Ok(1) => Ok(()),
            _ => Err(nb::Error::WouldBlock),
        }
    }
}
