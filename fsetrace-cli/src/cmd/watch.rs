// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};
use log::{error, warn};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use crate::fsevents::decode::decode_events;
use crate::fsevents::protocol::{EventKind, MIN_READ_SIZE};
use crate::fsevents::{ByteSource, FseDevice, subscribe};
use crate::ident::{IdentityResolver, SystemResolver};
use crate::render::Renderer;

use super::cli::WatchOptions;

// Design note: `cli` owns the interactive concerns (subscription, stdout,
// exit-code mapping) while the event loop itself lives in `pump_events`,
// which touches nothing but the handles passed to it and so can be driven
// by scripted sources in tests.
pub fn cli(options: &WatchOptions) -> ExitCode {
    let kinds = selected_kinds(&options.events);
    let buffer_size = effective_buffer_size(options.buffer_size);

    let device = match subscribe(&kinds, options.queue_depth) {
        Ok(device) => device,
        Err(error) => {
            error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    match watch_device(device, buffer_size) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn watch_device(mut device: FseDevice, buffer_size: usize) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "fsetrace ready")?;
    out.flush()?;
    let renderer = Renderer::new(SystemResolver);
    pump_events(&mut device, &mut out, &renderer, buffer_size)
}

fn selected_kinds(events: &[EventKind]) -> Vec<EventKind> {
    if events.is_empty() {
        EventKind::ALL.to_vec()
    } else {
        events.to_vec()
    }
}

fn effective_buffer_size(requested: usize) -> usize {
    if requested < MIN_READ_SIZE {
        // The device returns no data at all for short reads.
        warn!("buffer of {requested} bytes is below the device minimum, using {MIN_READ_SIZE}");
        MIN_READ_SIZE
    } else {
        requested
    }
}

/// Read, decode, and render until the source reports end-of-stream.
///
/// The kernel-side queue is bounded and silently discards events whenever
/// the reader lags, so after each buffer is handled the loop goes straight
/// back to `read_events`. Identity lookups happen during rendering, which
/// sits between reads; keep anything slower out of this path.
///
/// A decode error abandons the remainder of the current buffer only. The
/// next read starts a fresh decode. A read error is fatal: once the
/// subscription is broken there is nothing to resume.
pub fn pump_events<S, W, R>(
    source: &mut S,
    out: &mut W,
    renderer: &Renderer<R>,
    buffer_size: usize,
) -> Result<()>
where
    S: ByteSource,
    W: Write,
    R: IdentityResolver,
{
    let mut buf = vec![0u8; buffer_size];
    loop {
        let received = source
            .read_events(&mut buf)
            .context("reading from the event queue")?;
        if received == 0 {
            return Ok(());
        }
        writeln!(out, "=> received {received} bytes")?;
        for event in decode_events(&buf[..received]) {
            match event {
                Ok(event) => renderer.render(out, &event)?,
                Err(error) => {
                    warn!("dropping rest of buffer: {error}");
                    break;
                }
            }
        }
        // flush once per buffer, not per line
        out.flush()?;
    }
}
