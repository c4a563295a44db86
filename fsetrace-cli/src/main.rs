// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::process::ExitCode;

use fsetrace::cmd::cli::run_cli;

fn main() -> ExitCode {
    run_cli()
}
