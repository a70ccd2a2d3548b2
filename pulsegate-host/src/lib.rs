//! Host side of the Pulsegate serial protocol
//!
//! Runs on the computer the device is plugged into:
//!
//! - [`IoTransport`] adapts any `Read + Write` stream (serial port, TCP
//!   bridge, pipe) to the byte-level [`SerialPort`](pulsegate_hal::SerialPort)
//! - [`HostSession`] frames outgoing payloads and receives with a bounded
//!   timeout
//! - [`Dispatcher`] answers the device's instructions through a
//!   [`HostHandler`] and collects missed-deadline reports per pass
//!
//! Opening and closing the physical connection is left to the caller.

#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod stream;

pub use config::HostConfig;
pub use dispatch::{Dispatcher, HostHandler, MISSED_PREFIX};
pub use error::HostError;
pub use session::HostSession;
pub use stream::IoTransport;
