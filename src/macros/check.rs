// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Terminates the process with a diagnostic when `cond` is false.
///
/// With the `checks` feature disabled the condition is type-checked but never
/// evaluated, so it must not carry side effects the caller depends on.
///
/// ```
/// krt::check!(1 + 1 == 2);
/// krt::check!(usize::BITS >= 32, "unsupported target: {} bits", usize::BITS);
/// ```
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        if $crate::check::CHECKS_ACTIVE && !$cond {
            $crate::check::assert_failed(&$crate::check::AssertionEvent::new(
                file!(),
                line!(),
                stringify!($cond),
                module_path!(),
            ));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if $crate::check::CHECKS_ACTIVE && !$cond {
            $crate::check::assert_failed(
                &$crate::check::AssertionEvent::new(
                    file!(),
                    line!(),
                    stringify!($cond),
                    module_path!(),
                )
                .with_message(format_args!($($arg)+)),
            );
        }
    };
}

/// Like [`check!`], reporting both operands when they differ.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr $(,)?) => {
        if $crate::check::CHECKS_ACTIVE {
            match (&$left, &$right) {
                (left, right) => {
                    if !(*left == *right) {
                        $crate::check::assert_failed(
                            &$crate::check::AssertionEvent::new(
                                file!(),
                                line!(),
                                concat!(stringify!($left), " == ", stringify!($right)),
                                module_path!(),
                            )
                            .with_message(format_args!("left: {:?}, right: {:?}", left, right)),
                        );
                    }
                }
            }
        }
    };
}
