/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion between 16 bit wire colors and RGBA8 pixels
//!
//! A wire color is laid out as
//! ```text
//! bit  15  14..10  9..5   4..0
//!      A   blue    green  red
//! ```
//! The alpha bit only carries meaning for NTFT pixels, palette entries
//! always leave it clear.
use alloc::vec::Vec;

const CHANNEL_MASK: u16 = 0x1F;
const ALPHA_BIT: u16 = 1 << 15;

/// A single RGBA pixel with 8 bits per channel
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8
}

impl Pixel {
    /// A fully transparent black pixel
    pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Pixel {
        Pixel { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_array(rgba: [u8; 4]) -> Pixel {
        Pixel::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Whether this pixel survives as opaque on the wire
    #[inline(always)]
    pub const fn is_opaque(self) -> bool {
        self.a >= 128
    }
}

/// Widen a 5 bit channel to 8 bits by replicating its top bits
/// into the low bits, so that `0x1F` maps to `0xFF`
#[inline(always)]
const fn expand_channel(value: u16) -> u8 {
    let c = (value & CHANNEL_MASK) as u8;
    (c << 3) | (c >> 2)
}

/// Unpack a 16 bit wire color into an RGBA pixel
///
/// # Arguments
/// - `word`: The packed color
/// - `use_alpha`: Read bit 15 as alpha, if false the pixel is always opaque
///
/// # Example
/// ```
/// use zune_ugo::{unpack_color, Pixel};
/// assert_eq!(unpack_color(0x001F, false), Pixel::new(255, 0, 0, 255));
/// assert_eq!(unpack_color(0x7FFF, true), Pixel::new(255, 255, 255, 0));
/// ```
#[inline]
pub const fn unpack_color(word: u16, use_alpha: bool) -> Pixel {
    let a = if use_alpha && (word & ALPHA_BIT) == 0 {
        0
    } else {
        255
    };
    Pixel {
        r: expand_channel(word),
        g: expand_channel(word >> 5),
        b: expand_channel(word >> 10),
        a
    }
}

/// Pack an RGBA pixel into a 16 bit wire color
///
/// Channels keep their top 5 bits. When `use_alpha` is set, bit 15 is set
/// for pixels with alpha of 128 and above, otherwise bit 15 is always clear.
#[inline]
pub const fn pack_color(pixel: Pixel, use_alpha: bool) -> u16 {
    let r = (pixel.r >> 3) as u16;
    let g = (pixel.g & 0xF8) as u16;
    let b = (pixel.b & 0xF8) as u16;

    let alpha = if use_alpha && pixel.is_opaque() {
        ALPHA_BIT
    } else {
        0
    };

    (b << 7) | (g << 2) | r | alpha
}

/// Unpack a little endian palette section into `slots` opaque colors
///
/// Missing entries are filled with opaque black,
/// bytes past `slots` entries and a dangling odd byte are ignored.
pub fn unpack_palette(bytes: &[u8], slots: usize) -> Vec<Pixel> {
    let mut palette: Vec<Pixel> = bytes
        .chunks_exact(2)
        .take(slots)
        .map(|word| unpack_color(u16::from_le_bytes([word[0], word[1]]), false))
        .collect();

    palette.resize(slots, unpack_color(0, false));
    palette
}

/// Pack `colors` into a little endian palette section of exactly `slots` words
///
/// Unused slots are written as zero, colors past `slots` are dropped.
pub fn pack_palette(colors: &[Pixel], slots: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(slots * 2);

    for color in colors.iter().take(slots) {
        bytes.extend_from_slice(&pack_color(*color, false).to_le_bytes());
    }
    bytes.resize(slots * 2, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::color::{pack_color, pack_palette, unpack_color, unpack_palette, Pixel};

    #[test]
    fn test_channel_expansion() {
        assert_eq!(unpack_color(0x0000, false), Pixel::new(0, 0, 0, 255));
        assert_eq!(unpack_color(0x001F, false), Pixel::new(255, 0, 0, 255));
        assert_eq!(unpack_color(0x03E0, false), Pixel::new(0, 255, 0, 255));
        assert_eq!(unpack_color(0x7C00, false), Pixel::new(0, 0, 255, 255));
        // 0b10000 -> 0b10000_100
        assert_eq!(unpack_color(0x0010, false).r, 0x84);
        // 0b00011 -> 0b00011_000
        assert_eq!(unpack_color(0x0003, false).r, 0x18);
    }

    #[test]
    fn test_alpha_bit() {
        assert_eq!(unpack_color(0x8000, true).a, 255);
        assert_eq!(unpack_color(0x0000, true).a, 0);
        // the bit is ignored when alpha is disabled
        assert_eq!(unpack_color(0x0000, false).a, 255);
        assert_eq!(unpack_color(0x8000, false), unpack_color(0x0000, false));

        assert_eq!(pack_color(Pixel::new(0, 0, 0, 128), true), 0x8000);
        assert_eq!(pack_color(Pixel::new(0, 0, 0, 127), true), 0x0000);
        assert_eq!(pack_color(Pixel::new(0, 0, 0, 255), false), 0x0000);
    }

    #[test]
    fn test_pack_layout() {
        assert_eq!(pack_color(Pixel::new(255, 0, 0, 255), false), 0x001F);
        assert_eq!(pack_color(Pixel::new(0, 255, 0, 255), false), 0x03E0);
        assert_eq!(pack_color(Pixel::new(0, 0, 255, 255), false), 0x7C00);
        assert_eq!(pack_color(Pixel::new(255, 255, 0, 0), false), 0x03FF);
        assert_eq!(pack_color(Pixel::new(255, 255, 255, 255), true), 0xFFFF);
        // the low three bits never survive
        assert_eq!(pack_color(Pixel::new(7, 7, 7, 255), false), 0);
    }

    #[test]
    fn test_round_trip_error_bound() {
        for value in 0..=255_u8 {
            for alpha in [0_u8, 255] {
                let pixel = Pixel::new(value, value.wrapping_mul(7), value.wrapping_mul(13), alpha);

                for use_alpha in [false, true] {
                    let back = unpack_color(pack_color(pixel, use_alpha), use_alpha);

                    assert!(back.r.abs_diff(pixel.r) < 8);
                    assert!(back.g.abs_diff(pixel.g) < 8);
                    assert!(back.b.abs_diff(pixel.b) < 8);

                    if use_alpha {
                        assert_eq!(back.a, pixel.a);
                    } else {
                        assert_eq!(back.a, 255);
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_word_is_stable() {
        // unpack then pack must reproduce every word exactly
        for word in 0..=u16::MAX {
            assert_eq!(pack_color(unpack_color(word, true), true), word);
            assert_eq!(
                pack_color(unpack_color(word, false), false),
                word & 0x7FFF
            );
        }
    }

    #[test]
    fn test_palette_fill() {
        let bytes = [0x1F, 0x00, 0xE0, 0x03, 0xAA];
        let palette = unpack_palette(&bytes, 4);

        assert_eq!(palette.len(), 4);
        assert_eq!(palette[0], Pixel::new(255, 0, 0, 255));
        assert_eq!(palette[1], Pixel::new(0, 255, 0, 255));
        assert_eq!(palette[2], Pixel::new(0, 0, 0, 255));
        assert_eq!(palette[3], Pixel::new(0, 0, 0, 255));

        let packed = pack_palette(&[Pixel::new(255, 0, 0, 255)], 3);
        assert_eq!(packed, vec![0x1F, 0x00, 0, 0, 0, 0]);
    }
}
