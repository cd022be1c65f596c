/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteWriterTrait, ZWriter};
use zune_core::log::trace;

use crate::color::{pack_color, pack_palette, Pixel};
use crate::errors::UgoErrors;
use crate::format::UgoFormat;
use crate::geometry::pad;
use crate::image::PixelBuffer;
use crate::quantize::{MedianCutQuantizer, Quantized, Quantizer};
use crate::ugar::write_header;

static DEFAULT_QUANTIZER: MedianCutQuantizer = MedianCutQuantizer::new();

/// Length the NPF header declares for its palette, 15 colors
const NPF_PALETTE_LENGTH: u32 = 30;

/// A Flipnote image encoder
///
/// # Example
/// - Encode a 100 by 100 image to NPF
///
/// ```
/// use zune_ugo::{Pixel, PixelBuffer, UgoEncoder, UgoErrors, UgoFormat};
///
/// fn main() -> Result<(), UgoErrors> {
///     let image = PixelBuffer::new_filled(100, 100, Pixel::new(0, 255, 0, 255));
///     let mut encoder = UgoEncoder::new(&image, UgoFormat::NPF);
///     let mut sink = vec![];
///     let size = encoder.encode(&mut sink)?;
///     assert_eq!(size, sink.len());
///     Ok(())
/// }
/// ```
pub struct UgoEncoder<'a> {
    image:     &'a PixelBuffer,
    format:    UgoFormat,
    quantizer: &'a dyn Quantizer
}

impl<'a> UgoEncoder<'a> {
    /// Create a new encoder for `image`
    ///
    /// Paletted formats use a [`MedianCutQuantizer`] unless another
    /// one is set with [`set_quantizer`](Self::set_quantizer)
    #[allow(clippy::redundant_field_names)]
    pub fn new(image: &'a PixelBuffer, format: UgoFormat) -> UgoEncoder<'a> {
        UgoEncoder {
            image:     image,
            format:    format,
            quantizer: &DEFAULT_QUANTIZER
        }
    }

    /// Set the quantizer NBF and NPF images are reduced with
    ///
    /// It is not used for NTFT
    pub fn set_quantizer(&mut self, quantizer: &'a dyn Quantizer) -> &mut Self {
        self.quantizer = quantizer;
        self
    }

    pub const fn format(&self) -> UgoFormat {
        self.format
    }

    /// Encode the image, writing it to `sink`
    ///
    /// # Returns
    /// - Ok(size): Bytes written to the sink
    /// - Err: The error encountered during encoding
    pub fn encode<T: ZByteWriterTrait>(&mut self, sink: T) -> Result<usize, UgoErrors> {
        let mut stream = ZWriter::new(sink);

        match self.format {
            UgoFormat::NTFT => self.encode_ntft(&mut stream)?,
            UgoFormat::NBF => self.encode_nbf(&mut stream)?,
            UgoFormat::NPF => self.encode_npf(&mut stream)?
        }

        let size = stream.bytes_written();

        trace!(
            "Encoded {}x{} {} image in {} bytes",
            self.image.width(),
            self.image.height(),
            self.format,
            size
        );

        Ok(size)
    }

    fn encode_ntft<T: ZByteWriterTrait>(&self, stream: &mut ZWriter<T>) -> Result<(), UgoErrors> {
        let (width, height) = self.image.dimensions();
        let padded = pad(self.image.pixels(), width, height)?;

        let mut output = Vec::with_capacity(padded.len() * 2);

        for pixel in &padded {
            output.extend_from_slice(&pack_color(*pixel, true).to_le_bytes());
        }
        stream.write_all(&output)?;

        Ok(())
    }

    fn encode_nbf<T: ZByteWriterTrait>(&self, stream: &mut ZWriter<T>) -> Result<(), UgoErrors> {
        let (width, height) = self.image.dimensions();
        let pixels = self.image.pixels();

        let max_colors = UgoFormat::NBF.palette_colors().unwrap_or(256);

        let quantized = self.quantizer.quantize(pixels, max_colors);
        check_quantized(&quantized, pixels.len(), max_colors)?;

        trace!("NBF palette has {} colors", quantized.palette.len());

        let palette = pack_palette(&quantized.palette, max_colors);
        let indices = pad(&quantized.indices, width, height)?;

        write_header(stream, &[section_length(&palette)?, section_length(&indices)?])?;
        stream.write_all(&palette)?;
        stream.write_all(&indices)?;

        Ok(())
    }

    fn encode_npf<T: ZByteWriterTrait>(&self, stream: &mut ZWriter<T>) -> Result<(), UgoErrors> {
        let (width, height) = self.image.dimensions();
        let pixels = self.image.pixels();

        let max_colors = UgoFormat::NPF.palette_colors().unwrap_or(15);

        // transparent pixels take index 0 and never reach the quantizer
        let opaque: Vec<Pixel> = pixels.iter().copied().filter(|x| x.is_opaque()).collect();

        let quantized = self.quantizer.quantize(&opaque, max_colors);
        check_quantized(&quantized, opaque.len(), max_colors)?;

        trace!(
            "NPF palette has {} colors for {} opaque pixels",
            quantized.palette.len(),
            opaque.len()
        );

        let mut indices = vec![0_u8; pixels.len()];

        let opaque_slots = indices
            .iter_mut()
            .zip(pixels)
            .filter(|(_, pixel)| pixel.is_opaque());

        // check_quantized confirmed one index per opaque pixel
        for ((slot, _), index) in opaque_slots.zip(&quantized.indices) {
            *slot = index + 1;
        }

        let indices = pad(&indices, width, height)?;

        // two pixels per byte, the even one in the low nibble
        let packed: Vec<u8> = indices
            .chunks(2)
            .map(|pair| pair[0] | (pair.get(1).copied().unwrap_or(0) << 4))
            .collect();

        // word 0 is reserved for the transparent index
        let mut palette = Vec::with_capacity(32);
        palette.extend_from_slice(&[0, 0]);
        palette.extend_from_slice(&pack_palette(&quantized.palette, max_colors));

        write_header(stream, &[NPF_PALETTE_LENGTH, section_length(&packed)?])?;
        stream.write_all(&palette)?;
        stream.write_all(&packed)?;

        Ok(())
    }
}

fn section_length(section: &[u8]) -> Result<u32, UgoErrors> {
    u32::try_from(section.len())
        .map_err(|_| UgoErrors::GenericStatic("Section too large for a UGAR header"))
}

/// Confirm a quantizer kept to its side of the contract
fn check_quantized(
    quantized: &Quantized, pixels: usize, max_colors: usize
) -> Result<(), UgoErrors> {
    let colors = quantized.palette.len();

    if colors > max_colors {
        return Err(UgoErrors::PaletteOverflow(colors, max_colors));
    }
    if quantized.indices.len() != pixels {
        return Err(UgoErrors::Generic(format!(
            "Quantizer returned {} indices for {} pixels",
            quantized.indices.len(),
            pixels
        )));
    }
    if let Some(index) = quantized
        .indices
        .iter()
        .find(|index| usize::from(**index) >= colors)
    {
        return Err(UgoErrors::PaletteOverflow(usize::from(*index), colors));
    }
    Ok(())
}
