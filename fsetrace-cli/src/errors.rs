// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Failures while interpreting one buffer of encoded events.
///
/// Any of these aborts the rest of the buffer it occurred in: the wire format
/// carries no per-event length, so once a field is suspect there is no reliable
/// way to find the next event boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer truncated reading {field}: needed {needed} bytes, {remaining} remain")]
    TruncatedArgument {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("unrecognized argument tag 0x{0:04x}")]
    UnknownArgumentTag(u16),

    #[error("unrecognized event kind {0}")]
    UnknownEventKind(i32),
}

#[derive(Error, Debug)]
pub enum SubscribeError {
    #[error("unable to open {path} (running as root is required): {source}")]
    DeviceOpen {
        path: &'static str,
        source: nix::errno::Errno,
    },

    #[error("FSEVENTS_CLONE ioctl failed: {source}")]
    CloneSubscription { source: nix::errno::Errno },

    #[error("filesystem event monitoring is only available on macOS")]
    UnsupportedPlatform,
}
