/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;
use alloc::vec::Vec;

use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;

use crate::color::Pixel;
use crate::errors::UgoErrors;

/// An owned RGBA image, stored row major
///
/// Decoders hand these out and encoders consume them,
/// `pixels().len()` is always `width*height`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PixelBuffer {
    width:  usize,
    height: usize,
    pixels: Vec<Pixel>
}

impl PixelBuffer {
    /// Create an image from row major pixels
    ///
    /// # Errors
    /// If `pixels` doesn't hold exactly `width*height` pixels
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<PixelBuffer, UgoErrors> {
        match width.checked_mul(height) {
            Some(size) if size == pixels.len() => Ok(PixelBuffer {
                width,
                height,
                pixels
            }),
            _ => Err(UgoErrors::InvalidDimensions(width, height))
        }
    }

    /// Create an image where every pixel is `pixel`
    ///
    /// # Panics
    /// If `width*height` overflows a usize
    pub fn new_filled(width: usize, height: usize, pixel: Pixel) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixels: vec![pixel; width.checked_mul(height).unwrap()]
        }
    }

    /// Create an image from interleaved 8 bit RGBA bytes,
    /// the layout other zune decoders produce for [`ColorSpace::RGBA`]
    ///
    /// # Errors
    /// If `data` doesn't hold exactly `width*height*4` bytes
    pub fn from_rgba8(width: usize, height: usize, data: &[u8]) -> Result<PixelBuffer, UgoErrors> {
        let components = ColorSpace::RGBA.num_components();

        let expected = width
            .checked_mul(height)
            .and_then(|x| x.checked_mul(components))
            .ok_or(UgoErrors::InvalidDimensions(width, height))?;

        if data.len() != expected {
            return Err(UgoErrors::InvalidDimensions(width, height));
        }
        let pixels = data
            .chunks_exact(components)
            .map(|px| Pixel::new(px[0], px[1], px[2], px[3]))
            .collect();

        PixelBuffer::new(width, height, pixels)
    }

    /// Return interleaved 8 bit RGBA bytes of this image
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|px| px.to_array()).collect()
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Return the width and height of the image
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Colorspace of [`to_rgba8`](Self::to_rgba8) output,
    /// this is always RGBA
    pub const fn colorspace(&self) -> ColorSpace {
        ColorSpace::RGBA
    }

    /// Bit depth of [`to_rgba8`](Self::to_rgba8) output,
    /// this is always 8
    pub const fn bit_depth(&self) -> BitDepth {
        BitDepth::Eight
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Return the pixel at column `x` and row `y` or `None`
    /// if it's outside the image
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Iterate over the rows of this image
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        // chunks_exact panics on zero
        self.pixels.chunks_exact(self.width.max(1))
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
