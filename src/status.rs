// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::ffi::c_int;
use core::fmt;

pub type Errno = c_int;

pub const ESUCCESS: Errno = 0;
pub const ENOMEM: Errno = 12;
pub const EINVAL: Errno = 22;

pub type NTSTATUS = i32;

pub const STATUS_SUCCESS: NTSTATUS = 0;
pub const STATUS_INVALID_PARAMETER: NTSTATUS = 0xC000_000Du32 as i32;
pub const STATUS_INSUFFICIENT_RESOURCES: NTSTATUS = 0xC000_009Au32 as i32;

/// Recoverable failure of an aligned allocation request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AllocError {
    /// The underlying allocator returned null, or the padded request overflowed.
    OutOfMemory,
    /// The alignment is not a power of two multiple of the pointer size.
    InvalidAlignment,
}

impl AllocError {
    #[inline]
    pub const fn errno(self) -> Errno {
        match self {
            Self::OutOfMemory => ENOMEM,
            Self::InvalidAlignment => EINVAL,
        }
    }

    #[inline]
    pub const fn ntstatus(self) -> NTSTATUS {
        match self {
            Self::OutOfMemory => STATUS_INSUFFICIENT_RESOURCES,
            Self::InvalidAlignment => STATUS_INVALID_PARAMETER,
        }
    }

    /// Maps an errno back into the allocation error domain.
    ///
    /// Returns `None` for `ESUCCESS` and for codes the shim never produces.
    #[inline]
    pub const fn from_errno(errno: Errno) -> Option<Self> {
        match errno {
            ENOMEM => Some(Self::OutOfMemory),
            EINVAL => Some(Self::InvalidAlignment),
            _ => None,
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => f.write_str("out of memory"),
            Self::InvalidAlignment => f.write_str("invalid alignment"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AllocError {}

impl From<AllocError> for Errno {
    #[inline]
    fn from(value: AllocError) -> Self {
        value.errno()
    }
}

/// Collapses a fallible allocation into the POSIX status-code form.
#[inline]
pub fn errno_of<T>(result: Result<T, AllocError>) -> Errno {
    match result {
        Ok(_) => ESUCCESS,
        Err(err) => err.errno(),
    }
}

/// Collapses a fallible allocation into the kernel status-code form.
#[inline]
pub fn ntstatus_of<T>(result: Result<T, AllocError>) -> NTSTATUS {
    match result {
        Ok(_) => STATUS_SUCCESS,
        Err(err) => err.ntstatus(),
    }
}
