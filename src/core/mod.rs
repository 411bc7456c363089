//! Core traits, constants, and error types.

pub mod constants;
pub mod error;
pub mod traits;

pub use error::{DecapsulateError, EncapsulateError, FatalError, RecvError, SslError};
pub use traits::{ProtocolHooks, ReadOutcome, SecureSession, WirePacket, WriteOutcome};
