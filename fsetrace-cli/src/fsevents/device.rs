// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Subscription to `/dev/fsevents`.
//!
//! The device itself is never read. Opening it and issuing `FSEVENTS_CLONE`
//! with a per-kind report/ignore table yields a second descriptor dedicated
//! to this consumer; that clone is what delivers event buffers. The kernel
//! queues events per clone up to the requested depth and silently drops
//! newer ones when the consumer falls behind.

use std::fs::File;
use std::io::{self, Read};

#[cfg(target_os = "macos")]
use std::os::fd::{FromRawFd, OwnedFd};

#[cfg(target_os = "macos")]
use log::debug;
#[cfg(target_os = "macos")]
use nix::fcntl::{OFlag, open};
#[cfg(target_os = "macos")]
use nix::sys::stat::Mode;
#[cfg(target_os = "macos")]
use nix::unistd;

use crate::errors::SubscribeError;
use crate::fsevents::ByteSource;
use crate::fsevents::protocol::EventKind;
#[cfg(target_os = "macos")]
use crate::fsevents::protocol::{FSE_MAX_EVENTS, report_table};

#[cfg(target_os = "macos")]
const FSEVENTS_DEVICE: &str = "/dev/fsevents";

/// Kernel argument block for `FSEVENTS_CLONE`; layout matches the kernel's
/// `fsevent_clone_args`.
#[cfg(target_os = "macos")]
#[repr(C)]
struct FseventCloneArgs {
    event_list: *mut i8,
    num_events: i32,
    event_queue_depth: i32,
    fd: *mut i32,
}

// FSEVENTS_CLONE is _IOW('s', 1, fsevent_clone_args)
#[cfg(target_os = "macos")]
nix::ioctl_write_ptr!(fsevents_clone, b's', 1, FseventCloneArgs);

/// A cloned read handle onto the kernel's event queue.
pub struct FseDevice {
    queue: File,
}

impl ByteSource for FseDevice {
    fn read_events(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.queue.read(buf)
    }
}

/// Subscribe to the filesystem event stream, reporting only `kinds`.
///
/// Requires root. The descriptor the returned device reads from only sees
/// events the kernel queued after this call.
#[cfg(target_os = "macos")]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn subscribe(kinds: &[EventKind], queue_depth: i32) -> Result<FseDevice, SubscribeError> {
    let dev_fd = open(FSEVENTS_DEVICE, OFlag::O_RDONLY, Mode::empty()).map_err(|source| {
        SubscribeError::DeviceOpen {
            path: FSEVENTS_DEVICE,
            source,
        }
    })?;

    let mut report_list = report_table(kinds);

    let mut cloned_fd: i32 = -1;
    let clone_args = FseventCloneArgs {
        event_list: report_list.as_mut_ptr(),
        num_events: FSE_MAX_EVENTS as i32,
        event_queue_depth: queue_depth,
        fd: &mut cloned_fd,
    };
    // SAFETY: clone_args and everything it points at outlive the call, and
    // the request code matches the struct the kernel expects.
    let cloned = unsafe { fsevents_clone(dev_fd, &clone_args) };

    // The original descriptor has served its purpose whether or not the
    // clone succeeded.
    let _ = unistd::close(dev_fd);
    cloned.map_err(|source| SubscribeError::CloneSubscription { source })?;

    debug!("cloned fsevents queue (fd {cloned_fd}, depth {queue_depth})");
    // SAFETY: a successful FSEVENTS_CLONE hands back a fresh descriptor that
    // nothing else owns.
    let queue = File::from(unsafe { OwnedFd::from_raw_fd(cloned_fd) });
    Ok(FseDevice { queue })
}

#[cfg(not(target_os = "macos"))]
pub fn subscribe(_kinds: &[EventKind], _queue_depth: i32) -> Result<FseDevice, SubscribeError> {
    Err(SubscribeError::UnsupportedPlatform)
}
