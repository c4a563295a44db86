// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! The fsevents wire protocol (the parts a consumer sees).
//!
//! A cloned `/dev/fsevents` descriptor yields buffers packed with
//! variable-length event records, back to back, in the producer's native byte
//! order:
//!
//! ```text
//! event:
//!   kind: int32
//!   pid:  int32
//!   arguments, repeated:
//!     tag:     uint16
//!     length:  uint16
//!     payload: length bytes
//!   terminator:
//!     tag: uint16 = 0xb33f (no length field follows)
//! ```
//!
//! There is no per-event length anywhere; the terminator tag is the only
//! record boundary. Text payloads (vnode, string, path) are null-terminated
//! and `length` includes the terminator.

use clap::ValueEnum;
use num_derive::FromPrimitive;

/// Argument-list terminator, read where a tag would be. Reserved; never a
/// valid argument tag.
pub const FSE_ARG_DONE: u16 = 0xb33f;

/// Kind code the kernel uses for an event slot it has invalidated.
pub const FSE_INVALID: i32 = -1;

/// Per-kind subscription table entry: ignore this kind.
pub const FSE_IGNORE: i8 = 0;

/// Per-kind subscription table entry: report this kind. The kernel queues an
/// event only when the subscriber's slot for its kind holds exactly this
/// value.
pub const FSE_REPORT: i8 = 1;

/// Number of entries in the subscription's report/ignore table.
pub const FSE_MAX_EVENTS: usize = 13;

/// The device refuses to return data for reads smaller than this.
pub const MIN_READ_SIZE: usize = 2048;

/// Default per-read buffer. Oversized on purpose: the kernel-side queue drops
/// events when the consumer lags, and fewer reads means less lag.
pub const DEFAULT_BUFFER_SIZE: usize = 0x2000;

/// Default depth requested for the kernel-side event queue.
pub const DEFAULT_QUEUE_DEPTH: i32 = 0x400;

/// Event kinds the producer emits. Discriminants are the wire codes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, FromPrimitive, ValueEnum)]
pub enum EventKind {
    CreateFile = 0,
    Delete = 1,
    StatChanged = 2,
    Rename = 3,
    ContentModified = 4,
    Exchange = 5,
    FinderInfoChanged = 6,
    CreateDir = 7,
    Chown = 8,
    XattrModified = 9,
    XattrRemoved = 10,
    DocidCreated = 11,
    DocidChanged = 12,
}

impl EventKind {
    /// Every kind, in wire-code order.
    pub const ALL: [EventKind; FSE_MAX_EVENTS] = [
        EventKind::CreateFile,
        EventKind::Delete,
        EventKind::StatChanged,
        EventKind::Rename,
        EventKind::ContentModified,
        EventKind::Exchange,
        EventKind::FinderInfoChanged,
        EventKind::CreateDir,
        EventKind::Chown,
        EventKind::XattrModified,
        EventKind::XattrRemoved,
        EventKind::DocidCreated,
        EventKind::DocidChanged,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EventKind::CreateFile => "CREATE FILE",
            EventKind::Delete => "DELETE",
            EventKind::StatChanged => "STAT CHANGED",
            EventKind::Rename => "RENAME",
            EventKind::ContentModified => "CONTENT MODIFIED",
            EventKind::Exchange => "EXCHANGE",
            EventKind::FinderInfoChanged => "FINDER INFO CHANGED",
            EventKind::CreateDir => "CREATE DIR",
            EventKind::Chown => "CHOWN",
            EventKind::XattrModified => "XATTR MODIFIED",
            EventKind::XattrRemoved => "XATTR REMOVED",
            EventKind::DocidCreated => "DOCID CREATED",
            EventKind::DocidChanged => "DOCID CHANGED",
        }
    }
}

/// Build the per-kind verdict table handed to the clone ioctl: [`FSE_REPORT`]
/// in the slot of every selected kind, [`FSE_IGNORE`] everywhere else. Every
/// slot gets an explicit verdict; the kernel reads all of them.
#[must_use]
pub fn report_table(kinds: &[EventKind]) -> [i8; FSE_MAX_EVENTS] {
    let mut table = [FSE_IGNORE; FSE_MAX_EVENTS];
    for kind in kinds {
        table[*kind as usize] = FSE_REPORT;
    }
    table
}

/// Argument tags the producer emits. Discriminants are the wire codes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, FromPrimitive)]
pub enum ArgTag {
    Vnode = 0x0001,
    String = 0x0002,
    /// Legacy alias of [`ArgTag::Vnode`]; current kernels never emit it.
    Path = 0x0003,
    Int32 = 0x0004,
    Int64 = 0x0005,
    Raw = 0x0006,
    Inode = 0x0007,
    UserId = 0x0008,
    DeviceId = 0x0009,
    Mode = 0x000a,
    GroupId = 0x000b,
}

impl ArgTag {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ArgTag::Vnode => "VNODE",
            ArgTag::String => "STRING",
            ArgTag::Path => "PATH",
            ArgTag::Int32 => "INT32",
            ArgTag::Int64 => "INT64",
            ArgTag::Raw => "RAW",
            ArgTag::Inode => "INODE",
            ArgTag::UserId => "UID",
            ArgTag::DeviceId => "DEV",
            ArgTag::Mode => "MODE",
            ArgTag::GroupId => "GID",
        }
    }
}
