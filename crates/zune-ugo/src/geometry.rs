/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Power of two row handling
//!
//! Every format stores rows whose width is a power of two, the
//! logical image width may be anything. Encoders pad rows by repeating
//! the last column, decoders clip the padding back off.
use alloc::vec::Vec;

use crate::errors::UgoErrors;

/// Return the width of a stored row for an image `width` pixels wide
///
/// This is `width` itself when it's already a power of two, otherwise
/// the next power of two above it.
///
/// A zero width image has zero width storage.
///
/// # Errors
/// If the next power of two cannot be represented in a `usize`
///
/// # Example
/// ```
/// use zune_ugo::storage_width;
/// assert_eq!(storage_width(200).unwrap(), 256);
/// assert_eq!(storage_width(256).unwrap(), 256);
/// assert_eq!(storage_width(0).unwrap(), 0);
/// ```
pub fn storage_width(width: usize) -> Result<usize, UgoErrors> {
    if width == 0 {
        return Ok(0);
    }
    width
        .checked_next_power_of_two()
        .ok_or(UgoErrors::InvalidDimensions(width, 0))
}

/// Return the number of elements a `width` by `height` image occupies
/// once its rows are padded to storage width
pub fn storage_len(width: usize, height: usize) -> Result<usize, UgoErrors> {
    storage_width(width)?
        .checked_mul(height)
        .ok_or(UgoErrors::InvalidDimensions(width, height))
}

/// Pad each row of a `width` by `height` buffer to storage width by
/// repeating the last element of the row
///
/// # Errors
/// If `data` doesn't hold exactly `width*height` elements
///
/// # Example
/// ```
/// use zune_ugo::pad;
/// let padded = pad(&[1, 2, 3, 4, 5, 6], 3, 2).unwrap();
/// assert_eq!(padded, [1, 2, 3, 3, 4, 5, 6, 6]);
/// ```
pub fn pad<T: Copy>(data: &[T], width: usize, height: usize) -> Result<Vec<T>, UgoErrors> {
    let expected = width
        .checked_mul(height)
        .ok_or(UgoErrors::InvalidDimensions(width, height))?;

    if data.len() != expected {
        return Err(UgoErrors::InvalidDimensions(width, height));
    }
    if expected == 0 {
        return Ok(Vec::new());
    }

    let stride = storage_width(width)?;

    if stride == width {
        return Ok(data.to_vec());
    }

    let mut output = Vec::with_capacity(storage_len(width, height)?);

    for row in data.chunks_exact(width) {
        output.extend_from_slice(row);
        // row is non empty since width > 0
        let edge = row[width - 1];
        output.resize(output.len() + (stride - width), edge);
    }
    Ok(output)
}

/// Clip a buffer with `stride` wide rows down to `width` by `height`
///
/// Rows past `height` are dropped.
///
/// # Errors
/// - [`InvalidDimensions`](UgoErrors::InvalidDimensions) if `stride` is less than `width`
/// - [`TruncatedBuffer`](UgoErrors::TruncatedBuffer) if `data` holds fewer than
///   `height` full rows
pub fn clip<T: Copy>(
    data: &[T], stride: usize, width: usize, height: usize
) -> Result<Vec<T>, UgoErrors> {
    if stride < width {
        return Err(UgoErrors::InvalidDimensions(width, height));
    }
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let required = stride
        .checked_mul(height)
        .ok_or(UgoErrors::InvalidDimensions(width, height))?;

    if data.len() < required {
        return Err(UgoErrors::TruncatedBuffer("image rows", required));
    }

    if stride == width {
        return Ok(data[..required].to_vec());
    }

    let mut output = Vec::with_capacity(width * height);

    for row in data.chunks_exact(stride).take(height) {
        output.extend_from_slice(&row[..width]);
    }
    Ok(output)
}
