/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Palette reduction used by the paletted encoders
//!
//! NBF and NPF can only store a handful of colors, so before encoding
//! the image is reduced to a palette by a [`Quantizer`].
//! Any algorithm works, the encoder only checks that the palette and
//! indices it gets back are in range.
use alloc::vec;
use alloc::vec::Vec;

use crate::color::Pixel;

/// Result of reducing an image to a palette
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Quantized {
    /// Palette colors, alpha is ignored
    pub palette: Vec<Pixel>,
    /// One palette index per input pixel
    pub indices: Vec<u8>
}

/// Reduces pixels to a palette of at most `max_colors` colors
///
/// Quantizers are shared by reference with encoders, which may run
/// on several threads at once.
pub trait Quantizer: Send + Sync {
    /// Reduce `pixels` to at most `max_colors` colors
    ///
    /// Implementations must return one index per pixel, each pointing
    /// into the returned palette. `max_colors` is never more than 256.
    fn quantize(&self, pixels: &[Pixel], max_colors: usize) -> Quantized;
}

/// Median cut palette reduction
///
/// Colors are first posterized to the 5 bits per channel the formats
/// store. If the remaining colors fit in the palette they are used as is,
/// otherwise the color space is split at the median of its widest
/// channel until there are enough boxes, and every box becomes the
/// weighted average of its colors.
#[derive(Copy, Clone, Debug, Default)]
pub struct MedianCutQuantizer;

impl MedianCutQuantizer {
    pub const fn new() -> MedianCutQuantizer {
        MedianCutQuantizer
    }
}

#[derive(Copy, Clone)]
struct ColorCount {
    // 5 bit per channel color
    rgb:   [u8; 3],
    count: u32
}

struct ColorBox {
    colors: Vec<ColorCount>
}

impl ColorBox {
    /// Return the widest channel and its range
    fn widest_channel(&self) -> (usize, u8) {
        let mut best = (0, 0);

        for channel in 0..3 {
            let (min, max) = self
                .colors
                .iter()
                .fold((u8::MAX, u8::MIN), |(min, max), c| {
                    (min.min(c.rgb[channel]), max.max(c.rgb[channel]))
                });
            let range = max.saturating_sub(min);

            if range > best.1 {
                best = (channel, range);
            }
        }
        best
    }

    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();

        self.colors.sort_unstable_by_key(|c| c.rgb[channel]);

        let total: u64 = self.colors.iter().map(|c| u64::from(c.count)).sum();
        let mut acc = 0;
        let mut split_idx = 0;

        for (i, c) in self.colors.iter().enumerate() {
            acc += u64::from(c.count);
            if acc * 2 >= total {
                split_idx = i;
                break;
            }
        }
        // both halves must keep at least one color
        split_idx = split_idx.min(self.colors.len() - 2);

        let right = self.colors.split_off(split_idx + 1);

        (self, ColorBox { colors: right })
    }

    /// Weighted average of the box, still in 5 bits per channel
    fn average(&self) -> [u8; 3] {
        let mut sums = [0_u64; 3];
        let mut total = 0_u64;

        for c in &self.colors {
            let count = u64::from(c.count);
            for (sum, value) in sums.iter_mut().zip(c.rgb) {
                *sum += u64::from(value) * count;
            }
            total += count;
        }
        if total == 0 {
            return [0; 3];
        }
        sums.map(|sum| (sum / total) as u8)
    }
}

#[inline(always)]
fn expand5(value: u8) -> u8 {
    (value << 3) | (value >> 2)
}

#[inline(always)]
fn key(rgb: [u8; 3]) -> usize {
    (usize::from(rgb[0]) << 10) | (usize::from(rgb[1]) << 5) | usize::from(rgb[2])
}

#[inline(always)]
fn posterize(pixel: &Pixel) -> [u8; 3] {
    [pixel.r >> 3, pixel.g >> 3, pixel.b >> 3]
}

fn nearest(color: [u8; 3], palette: &[[u8; 3]]) -> u8 {
    let mut best_idx = 0;
    let mut best_dist = u32::MAX;

    for (i, p) in palette.iter().enumerate() {
        let dist: u32 = color
            .iter()
            .zip(p)
            .map(|(a, b)| {
                let d = u32::from(a.abs_diff(*b));
                d * d
            })
            .sum();

        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }
    best_idx as u8
}

impl Quantizer for MedianCutQuantizer {
    fn quantize(&self, pixels: &[Pixel], max_colors: usize) -> Quantized {
        let max_colors = max_colors.clamp(1, 256);

        // histogram over every 15 bit color
        let mut histogram = vec![0_u32; 1 << 15];

        for pixel in pixels {
            let slot = &mut histogram[key(posterize(pixel))];
            *slot = slot.saturating_add(1);
        }

        let colors: Vec<ColorCount> = histogram
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(k, count)| ColorCount {
                rgb:   [(k >> 10) as u8 & 0x1F, (k >> 5) as u8 & 0x1F, k as u8 & 0x1F],
                count: *count
            })
            .collect();

        if colors.is_empty() {
            return Quantized::default();
        }

        let palette5: Vec<[u8; 3]> = if colors.len() <= max_colors {
            colors.iter().map(|c| c.rgb).collect()
        } else {
            let mut boxes = vec![ColorBox { colors }];

            while boxes.len() < max_colors {
                let Some(idx) = boxes
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.can_split())
                    .max_by_key(|(_, b)| b.widest_channel().1)
                    .map(|(i, _)| i)
                else {
                    break;
                };
                let (left, right) = boxes.swap_remove(idx).split();
                boxes.push(left);
                boxes.push(right);
            }
            boxes.iter().map(ColorBox::average).collect()
        };

        // the histogram is no longer needed, reuse it as a lookup table
        // holding index + 1 for every color already resolved
        histogram.iter_mut().for_each(|x| *x = 0);

        let indices = pixels
            .iter()
            .map(|pixel| {
                let color = posterize(pixel);
                let slot = &mut histogram[key(color)];

                if *slot == 0 {
                    *slot = u32::from(nearest(color, &palette5)) + 1;
                }
                (*slot - 1) as u8
            })
            .collect();

        let palette = palette5
            .iter()
            .map(|c| Pixel::new(expand5(c[0]), expand5(c[1]), expand5(c[2]), 255))
            .collect();

        Quantized { palette, indices }
    }
}
