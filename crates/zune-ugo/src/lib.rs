/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Decoding and encoding Flipnote Studio image formats
//!
//! Flipnote Studio (and the Flipnote Hatena/Sudomemo services built around it)
//! stores its theme and menu images in three small formats
//!
//! | Format | Bits/pixel          | Palette                          | Container |
//! |--------|---------------------|----------------------------------|-----------|
//! | NTFT   | 16, direct 5/5/5/1  | none                             | none      |
//! | NBF    | 8, indexed          | 256 entries, 5/5/5               | UGAR      |
//! | NPF    | 4, indexed          | 15 entries + transparent index 0 | UGAR      |
//!
//! None of the formats store their dimensions, the width and height
//! must always be supplied by the caller when decoding.
//!
//! Rows on the wire are always a power of two wide, images whose width
//! isn't one are edge padded when encoding and clipped when decoding.
//!
//! # Example
//! ```
//! use zune_ugo::{PixelBuffer, Pixel, UgoFormat};
//!
//! let image = PixelBuffer::new_filled(3, 2, Pixel::new(255, 0, 0, 255));
//! let bytes = zune_ugo::encode(UgoFormat::NTFT, &image).unwrap();
//! // rows are padded to 4 pixels of 2 bytes each
//! assert_eq!(bytes.len(), 4 * 2 * 2);
//!
//! let decoded = zune_ugo::decode(UgoFormat::NTFT, &bytes, 3, 2).unwrap();
//! assert_eq!(decoded, image);
//! ```
//!
//! # Features
//! - `std`: Enables `std::error::Error` on errors
//! - `log`: Forwards decoder traces to the `log` crate
//!
//! Without `std` the crate is `no_std` and needs `alloc`.
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;
extern crate core;

use alloc::vec::Vec;

pub use color::*;
pub use decoder::*;
pub use encoder::*;
pub use errors::*;
pub use format::*;
pub use geometry::*;
pub use image::*;
pub use quantize::*;
pub use ugar::*;
pub use zune_core;

mod color;
mod decoder;
mod encoder;
mod errors;
mod format;
mod geometry;
mod image;
mod quantize;
mod ugar;

/// Decode `bytes` stored in `format` into an image of `width` by `height` pixels
///
/// This is a shorthand for [`UgoFormat::decode`]
pub fn decode(
    format: UgoFormat, bytes: &[u8], width: usize, height: usize
) -> Result<PixelBuffer, UgoErrors> {
    format.decode(bytes, width, height)
}

/// Encode `image` into `format`, using the default [`MedianCutQuantizer`]
/// for the paletted formats
///
/// This is a shorthand for [`UgoFormat::encode`]
pub fn encode(format: UgoFormat, image: &PixelBuffer) -> Result<Vec<u8>, UgoErrors> {
    format.encode(image)
}
