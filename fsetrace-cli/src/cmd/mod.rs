// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod cli;
pub mod watch;
