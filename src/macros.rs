// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

mod check;
mod helpers;
