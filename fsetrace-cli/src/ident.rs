// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolution of the numeric ids carried by events into names.
//!
//! Lookups are best-effort: events routinely outlive the processes that
//! caused them, and uids/gids on the wire may have no local account. A
//! failed lookup is `None`, never an error.

use log::debug;
use nix::unistd::{Gid, Group, Uid, User};

/// Name lookups the renderer performs while formatting an event.
///
/// A trait so tests can substitute canned answers; [`SystemResolver`] asks
/// the operating system.
pub trait IdentityResolver {
    fn process_name(&self, pid: i32) -> Option<String>;
    fn user_name(&self, uid: u32) -> Option<String>;
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Resolver backed by the local user/group databases and process table.
pub struct SystemResolver;

impl IdentityResolver for SystemResolver {
    fn process_name(&self, pid: i32) -> Option<String> {
        platform_process_name(pid)
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => Some(user.name),
            Ok(None) => None,
            Err(errno) => {
                debug!("uid {uid} lookup failed: {errno}");
                None
            }
        }
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        match Group::from_gid(Gid::from_raw(gid)) {
            Ok(Some(group)) => Some(group.name),
            Ok(None) => None,
            Err(errno) => {
                debug!("gid {gid} lookup failed: {errno}");
                None
            }
        }
    }
}

/// Short command name of a live process, from the kernel's process table.
/// By the time an event is rendered its producer may already have exited.
#[cfg(target_os = "macos")]
#[allow(clippy::cast_sign_loss)]
fn platform_process_name(pid: i32) -> Option<String> {
    use nix::libc;

    let mut mib = [libc::CTL_KERN, libc::KERN_PROC, libc::KERN_PROC_PID, pid];
    let mut info: libc::kinfo_proc = unsafe { std::mem::zeroed() };
    let mut len = size_of::<libc::kinfo_proc>();
    // SAFETY: the mib array, the output struct, and the length all point at
    // live stack storage sized to match what the kernel writes.
    let rc = unsafe {
        libc::sysctl(
            mib.as_mut_ptr(),
            4,
            std::ptr::from_mut(&mut info).cast(),
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    // A missing pid is not an error: sysctl succeeds and writes nothing.
    if rc != 0 || len == 0 {
        return None;
    }
    let comm: Vec<u8> = info
        .kp_proc
        .p_comm
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    Some(String::from_utf8_lossy(&comm).into_owned())
}

#[cfg(target_os = "linux")]
fn platform_process_name(pid: i32) -> Option<String> {
    let comm = std::fs::read_to_string(format!("/proc/{pid}/comm")).ok()?;
    Some(comm.trim_end_matches('\n').to_string())
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn platform_process_name(_pid: i32) -> Option<String> {
    None
}
