//! Transport trait definition.

use std::io::{Read, Write};

/// A blocking byte-stream transport carrying framed protocol messages.
///
/// The framing functions in [`crate::protocol`] consume any `Read + Write`
/// stream; this trait exists so pooled connections can be stored and handed
/// around as trait objects without naming the concrete socket type.
pub trait Transport: Read + Write + Send {}

/// Blanket implementation for any sendable byte stream.
impl<T: Read + Write + Send> Transport for T {}
