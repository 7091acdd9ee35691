// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

#[macro_export]
/// Returns early with `Err(err)` when `cond` is false.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $err:expr, $($arg:tt)+) => {
        if !$cond {
            #[cfg(debug_assertions)]
            $crate::trace::report_error_msg(
                file!(),
                line!(),
                $crate::status::Errno::from($err),
                format_args!($($arg)+),
            );
            return Err($err);
        }
    };
}
