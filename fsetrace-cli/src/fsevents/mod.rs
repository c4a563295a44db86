// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Access to the kernel's filesystem-event queue: the wire protocol, the
//! buffer decoder, and the `/dev/fsevents` subscription.

use std::io;

pub mod decode;
mod device;
pub mod protocol;

pub use device::{FseDevice, subscribe};

/// Supplier of successive raw event buffers.
///
/// The decode pipeline is driven through this seam so tests can feed it
/// scripted buffers; in production it is a cloned fsevents descriptor.
pub trait ByteSource {
    /// Blocking read of the next buffer of encoded events into `buf`.
    /// `Ok(0)` means the stream has ended.
    fn read_events(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
