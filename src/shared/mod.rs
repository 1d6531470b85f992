// Protocol framing, serial session handling, and host-side helpers.
pub mod catalog;
pub mod discovery;
pub mod lock;
#[cfg(test)]
pub mod mock_port;
pub mod nmea;
pub mod sentence;
pub mod session;
pub mod signal;
