// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Human-readable formatting of decoded events.
//!
//! One record per event: the kind, the producing process, then a table of
//! the event's arguments. Numeric ids are resolved to names through an
//! [`IdentityResolver`]; a failed lookup renders a placeholder and never
//! interrupts output.

use std::io::{self, Write};

use crate::fsevents::decode::{Argument, ArgumentValue, Event};
use crate::fsevents::protocol::FSE_ARG_DONE;
use crate::ident::IdentityResolver;

/// Shown when a pid, uid, or gid has no resolvable name.
const UNKNOWN: &str = "unknown";

/// Writes decoded events as multi-line text records.
pub struct Renderer<R: IdentityResolver> {
    resolver: R,
}

impl<R: IdentityResolver> Renderer<R> {
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Renderer { resolver }
    }

    /// Write one event as a record. Lookup failures degrade to
    /// placeholder text; only the output channel itself can fail.
    pub fn render<W: Write>(&self, out: &mut W, event: &Event<'_>) -> io::Result<()> {
        writeln!(out, "# Event")?;
        writeln!(out, "  type           = {}", event.kind.label())?;
        let name = self.resolver.process_name(event.pid);
        writeln!(
            out,
            "  pid            = {} ({})",
            event.pid,
            name.as_deref().unwrap_or(UNKNOWN)
        )?;
        writeln!(out, "  # Details")?;
        writeln!(out, "    # type       len  data")?;
        for arg in &event.args {
            self.render_argument(out, arg)?;
        }
        writeln!(out, "    DONE (0x{FSE_ARG_DONE:x})")?;
        Ok(())
    }

    // uid_t and gid_t are unsigned but have always been printed in their
    // signed form here (uid -2 for nobody, not 4294967294).
    #[allow(clippy::cast_possible_wrap)]
    fn render_argument<W: Write>(&self, out: &mut W, arg: &Argument<'_>) -> io::Result<()> {
        // The tag label and declared length share a 16-column field, lining
        // up with the "# type       len" table header above.
        let label = arg.tag.label();
        write!(out, "    {}{:>width$}", label, arg.len, width = 16 - label.len())?;
        match arg.value {
            ArgumentValue::Vnode(path) | ArgumentValue::Path(path) => {
                writeln!(out, "  path   = {}", String::from_utf8_lossy(path))
            }
            ArgumentValue::String(text) => {
                writeln!(out, "  string = {}", String::from_utf8_lossy(text))
            }
            ArgumentValue::Int32(Some(value)) => writeln!(out, "  int32  = {value}"),
            ArgumentValue::Int32(None) => writeln!(out, "  int32"),
            ArgumentValue::Int64(Some(value)) => writeln!(out, "  int64  = {value}"),
            ArgumentValue::Int64(None) => writeln!(out, "  int64"),
            ArgumentValue::Raw(_) => writeln!(out, "  raw"),
            ArgumentValue::Inode(Some(ino)) => writeln!(out, "  ino    = {ino}"),
            ArgumentValue::Inode(None) => writeln!(out, "  ino"),
            ArgumentValue::UserId(Some(uid)) => {
                let name = self.resolver.user_name(uid);
                writeln!(
                    out,
                    "  uid    = {} ({})",
                    uid as i32,
                    name.as_deref().unwrap_or(UNKNOWN)
                )
            }
            ArgumentValue::UserId(None) => writeln!(out, "  uid"),
            ArgumentValue::DeviceId(Some(device)) => {
                let (major, minor) = device_components(device);
                writeln!(out, "  dev    = 0x{device:x} (major {major}, minor {minor})")
            }
            ArgumentValue::DeviceId(None) => writeln!(out, "  dev"),
            ArgumentValue::Mode(Some(mode)) => writeln!(
                out,
                "  mode   = {} (0x{mode:06x}, vnode type {})",
                mode_string(mode),
                node_type_label(mode)
            ),
            ArgumentValue::Mode(None) => writeln!(out, "  mode"),
            ArgumentValue::GroupId(Some(gid)) => {
                let name = self.resolver.group_name(gid);
                writeln!(
                    out,
                    "  gid    = {} ({})",
                    gid as i32,
                    name.as_deref().unwrap_or(UNKNOWN)
                )
            }
            ArgumentValue::GroupId(None) => writeln!(out, "  gid"),
        }
    }
}

// File-type bits of st_mode, per sys/stat.h.
const S_IFMT: i32 = 0o170_000;
const S_IFIFO: i32 = 0o010_000;
const S_IFCHR: i32 = 0o020_000;
const S_IFDIR: i32 = 0o040_000;
const S_IFBLK: i32 = 0o060_000;
const S_IFLNK: i32 = 0o120_000;
const S_IFSOCK: i32 = 0o140_000;

/// Permission bits in display order: owner, group, other.
const PERMISSION_BITS: [(i32, char); 9] = [
    (0x100, 'r'),
    (0x80, 'w'),
    (0x40, 'x'),
    (0x20, 'r'),
    (0x10, 'w'),
    (0x08, 'x'),
    (0x04, 'r'),
    (0x02, 'w'),
    (0x01, 'x'),
];

/// `ls -l` style ten-character mode string: type flag, then the nine
/// permission flags. Total for any input, including reserved type bits.
fn mode_string(mode: i32) -> String {
    let mut chars = ['-'; 10];
    chars[0] = match mode & S_IFMT {
        S_IFIFO => 'p',
        S_IFCHR => 'c',
        S_IFDIR => 'd',
        S_IFBLK => 'b',
        S_IFLNK => 'l',
        S_IFSOCK => 's',
        _ => '-',
    };
    for (slot, &(bit, flag)) in chars[1..].iter_mut().zip(PERMISSION_BITS.iter()) {
        if mode & bit != 0 {
            *slot = flag;
        }
    }
    chars.iter().collect()
}

/// Node-type name for a mode value. Reserved type-bit patterns (and plain
/// files) both read as "regular".
fn node_type_label(mode: i32) -> &'static str {
    match mode & S_IFMT {
        S_IFIFO => "fifo",
        S_IFCHR => "character-device",
        S_IFDIR => "directory",
        S_IFBLK => "block-device",
        S_IFLNK => "symlink",
        S_IFSOCK => "socket",
        _ => "regular",
    }
}

/// Splits a device id into its major and minor components.
fn device_components(device: i32) -> (i32, i32) {
    ((device >> 24) & 0x00FF_FFFF, device & 0x00FF_FFFF)
}
