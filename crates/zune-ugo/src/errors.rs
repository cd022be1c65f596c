/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during decoding and encoding
use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

/// Possible errors that may occur during decoding or encoding
/// of Flipnote images
pub enum UgoErrors {
    /// The input buffer doesn't have enough bytes to fully
    /// reconstruct the image
    ///
    /// # Arguments
    /// - 1st argument is what we were reading when we ran out of bytes
    /// - 2nd argument is the number of bytes that read required
    TruncatedBuffer(&'static str, usize),
    /// The UGAR header is unusable, e.g. wrong magic bytes,
    /// wrong number of sections or bytes left after the last section
    MalformedHeader(&'static str),
    /// Width and height that cannot describe the buffer
    /// they were given with
    InvalidDimensions(usize, usize),
    /// Dimensions larger than what the decoder was configured
    /// to accept
    TooLargeDimensions(usize, usize),
    /// Not one of `ntft`, `nbf` or `npf`
    UnsupportedFormat(String),
    /// The quantizer returned more colors than the format can hold,
    /// or an index outside its palette
    ///
    /// # Arguments
    /// - 1st argument is what was found
    /// - 2nd argument is the maximum allowed
    PaletteOverflow(usize, usize),
    /// The buffer given to `decode_into` cannot hold the image
    ///
    /// # Arguments
    /// - 1st argument is the size required
    /// - 2nd argument is the size found
    TooSmallOutput(usize, usize),
    /// Generic message
    Generic(String),
    /// Generic message does not need heap allocation
    GenericStatic(&'static str),
    IoErrors(ZByteIoError)
}

impl Debug for UgoErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            UgoErrors::TruncatedBuffer(section, expected) => {
                writeln!(
                    f,
                    "Truncated buffer, reading {section} requires {expected} bytes but the stream ended early"
                )
            }
            UgoErrors::MalformedHeader(reason) => {
                writeln!(f, "Malformed UGAR header: {reason}")
            }
            UgoErrors::InvalidDimensions(width, height) => {
                writeln!(f, "Invalid image dimensions {width}x{height}")
            }
            UgoErrors::TooLargeDimensions(found, max) => {
                writeln!(
                    f,
                    "Image dimension {found} greater than max configured dimension {max}"
                )
            }
            UgoErrors::UnsupportedFormat(format) => {
                writeln!(
                    f,
                    "Unsupported format `{format}`, expected one of ntft, nbf or npf"
                )
            }
            UgoErrors::PaletteOverflow(found, max) => {
                writeln!(
                    f,
                    "Palette overflow, found {found} but the format allows at most {max}"
                )
            }
            UgoErrors::TooSmallOutput(expected, found) => {
                writeln!(
                    f,
                    "Too small output size, expected {expected}, but found {found}"
                )
            }
            UgoErrors::Generic(val) => {
                writeln!(f, "{val}")
            }
            UgoErrors::GenericStatic(val) => {
                writeln!(f, "{val}")
            }
            UgoErrors::IoErrors(value) => {
                writeln!(f, "I/O error {:?}", value)
            }
        }
    }
}

impl Display for UgoErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UgoErrors {}

impl From<&'static str> for UgoErrors {
    fn from(r: &'static str) -> Self {
        Self::GenericStatic(r)
    }
}

impl From<ZByteIoError> for UgoErrors {
    fn from(value: ZByteIoError) -> Self {
        UgoErrors::IoErrors(value)
    }
}
