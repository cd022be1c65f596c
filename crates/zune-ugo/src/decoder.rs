/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::color::{unpack_color, unpack_palette, Pixel};
use crate::errors::UgoErrors;
use crate::format::UgoFormat;
use crate::geometry::{clip, storage_len, storage_width};
use crate::image::PixelBuffer;
use crate::ugar::{read_header, SectionTable};

/// Entries in an NBF palette
const NBF_PALETTE_SLOTS: usize = 256;
/// Words in an NPF palette, word 0 is the transparent slot
const NPF_PALETTE_SLOTS: usize = 16;

/// Sections are read in chunks of this size so that a
/// lying header can't make us allocate more than the input holds
const SECTION_CHUNK: usize = 1 << 16;

/// A Flipnote image decoder
///
/// None of the formats store their dimensions, so the width and height
/// of the image are given when creating the decoder.
///
/// # Example
/// ```
/// use zune_core::bytestream::ZCursor;
/// use zune_ugo::{UgoDecoder, UgoFormat};
///
/// // a 2x1 NTFT image, one red and one transparent pixel
/// let data = [0x1F, 0x80, 0x00, 0x00];
/// let mut decoder = UgoDecoder::new(ZCursor::new(&data), UgoFormat::NTFT, 2, 1);
/// let image = decoder.decode().unwrap();
///
/// assert_eq!(image.get(0, 0).unwrap().to_array(), [255, 0, 0, 255]);
/// assert_eq!(image.get(1, 0).unwrap().a, 0);
/// ```
pub struct UgoDecoder<T>
where
    T: ZByteReaderTrait
{
    format:          UgoFormat,
    width:           usize,
    height:          usize,
    stride:          usize,
    sections:        Option<SectionTable>,
    decoded_headers: bool,
    stream:          ZReader<T>,
    options:         DecoderOptions
}

impl<T> UgoDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a new decoder with the default options
    ///
    /// # Arguments
    /// - `data`: The encoded image
    /// - `format`: Which of the formats `data` is in
    /// - `width`, `height`: Dimensions of the image
    pub fn new(data: T, format: UgoFormat, width: usize, height: usize) -> UgoDecoder<T> {
        UgoDecoder::new_with_options(data, format, width, height, DecoderOptions::default())
    }

    /// Create a new decoder that obeys specified restrictions
    ///
    /// E.g can be used to set width and height limits to prevent OOM attacks
    ///
    /// # Example
    /// ```
    /// use zune_core::bytestream::ZCursor;
    /// use zune_core::options::DecoderOptions;
    /// use zune_ugo::{UgoDecoder, UgoFormat};
    ///
    /// let options = DecoderOptions::default().set_max_width(10);
    /// let mut decoder = UgoDecoder::new_with_options(ZCursor::new(b""), UgoFormat::NBF, 256, 192, options);
    /// assert!(decoder.decode().is_err());
    /// ```
    #[allow(clippy::redundant_field_names)]
    pub fn new_with_options(
        data: T, format: UgoFormat, width: usize, height: usize, options: DecoderOptions
    ) -> UgoDecoder<T> {
        UgoDecoder {
            format:          format,
            width:           width,
            height:          height,
            stride:          0,
            sections:        None,
            decoded_headers: false,
            stream:          ZReader::new(data),
            options:         options
        }
    }

    /// Validate the dimensions and, for NBF and NPF, read the UGAR header
    ///
    /// # Returns
    ///
    /// - On success: Nothing
    /// - On error: The error encountered when decoding headers
    pub fn decode_headers(&mut self) -> Result<(), UgoErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        if self.width > self.options.max_width() {
            return Err(UgoErrors::TooLargeDimensions(
                self.width,
                self.options.max_width()
            ));
        }
        if self.height > self.options.max_height() {
            return Err(UgoErrors::TooLargeDimensions(
                self.height,
                self.options.max_height()
            ));
        }
        self.stride = storage_width(self.width)?;
        // confirm the storage size fits before anything is read
        storage_len(self.width, self.height)?;

        if self.format.has_container() {
            let table = read_header(&mut self.stream)?;

            if table.len() != 2 {
                return Err(UgoErrors::MalformedHeader(
                    "expected exactly two sections, palette and pixels"
                ));
            }
            self.sections = Some(table);
        }

        trace!("Image format: {}", self.format);
        trace!("Image width: {}", self.width);
        trace!("Image height: {}", self.height);
        trace!("Storage width: {}", self.stride);

        self.decoded_headers = true;
        Ok(())
    }

    /// Decode the image, returning its pixels or the error
    /// encountered during decoding
    pub fn decode(&mut self) -> Result<PixelBuffer, UgoErrors> {
        self.decode_headers()?;

        let pixels = self.decode_pixels()?;

        PixelBuffer::new(self.width, self.height, pixels)
    }

    /// Decode the image into `pixels` as interleaved 8 bit RGBA
    ///
    /// Returns an error if the buffer cannot hold the image,
    /// see [`output_buffer_size`](Self::output_buffer_size).
    /// Bytes past the image are left untouched.
    ///
    /// # Example
    /// ```
    /// use zune_core::bytestream::ZCursor;
    /// use zune_ugo::{UgoDecoder, UgoFormat};
    ///
    /// let data = [0x1F, 0x80, 0xE0, 0x83];
    /// let mut decoder = UgoDecoder::new(ZCursor::new(&data), UgoFormat::NTFT, 2, 1);
    /// let mut output = [0; 8];
    /// decoder.decode_into(&mut output).unwrap();
    ///
    /// assert_eq!(output, [255, 0, 0, 255, 0, 255, 0, 255]);
    /// ```
    pub fn decode_into(&mut self, pixels: &mut [u8]) -> Result<(), UgoErrors> {
        self.decode_headers()?;

        let size = self
            .output_buffer_size()
            .ok_or(UgoErrors::InvalidDimensions(self.width, self.height))?;

        if pixels.len() < size {
            return Err(UgoErrors::TooSmallOutput(size, pixels.len()));
        }
        let decoded = self.decode_pixels()?;

        let components = ColorSpace::RGBA.num_components();

        for (out, pixel) in pixels[..size].chunks_exact_mut(components).zip(&decoded) {
            out.copy_from_slice(&pixel.to_array());
        }
        Ok(())
    }

    /// Decode stored pixels and clip them to the image dimensions
    fn decode_pixels(&mut self) -> Result<Vec<Pixel>, UgoErrors> {
        let stored = match self.format {
            UgoFormat::NTFT => self.decode_ntft()?,
            UgoFormat::NBF => self.decode_nbf()?,
            UgoFormat::NPF => self.decode_npf()?
        };
        let pixels = clip(&stored, self.stride, self.width, self.height)?;

        trace!("Finished decoding image");

        Ok(pixels)
    }

    fn sections(&self) -> Result<(usize, usize), UgoErrors> {
        match &self.sections {
            Some(table) => match (table.get(0), table.get(1)) {
                (Some(palette), Some(pixels)) => Ok((palette, pixels)),
                _ => Err(UgoErrors::MalformedHeader("missing sections"))
            },
            None => Err(UgoErrors::GenericStatic("Headers not decoded"))
        }
    }

    /// Read a whole section into memory
    fn read_section(&mut self, length: usize, name: &'static str) -> Result<Vec<u8>, UgoErrors> {
        let mut data = Vec::with_capacity(length.min(SECTION_CHUNK));

        while data.len() < length {
            let start = data.len();
            let size = (length - start).min(SECTION_CHUNK);

            data.resize(start + size, 0);
            self.stream
                .read_exact_bytes(&mut data[start..])
                .map_err(|_| UgoErrors::TruncatedBuffer(name, length))?;
        }
        Ok(data)
    }

    /// Error out if bytes are left after the last section
    fn confirm_end(&mut self) -> Result<(), UgoErrors> {
        if !self.stream.eof()? {
            return Err(UgoErrors::MalformedHeader(
                "bytes remaining after the last section"
            ));
        }
        Ok(())
    }

    fn required_pixels(&self) -> Result<usize, UgoErrors> {
        storage_len(self.width, self.height)
    }

    fn decode_ntft(&mut self) -> Result<Vec<Pixel>, UgoErrors> {
        let length = self
            .required_pixels()?
            .checked_mul(2)
            .ok_or(UgoErrors::InvalidDimensions(self.width, self.height))?;

        let data = self.read_section(length, "NTFT pixels")?;

        if !self.stream.eof()? {
            warn!("Extra bytes after NTFT pixels, ignoring them");
        }

        let pixels = data
            .chunks_exact(2)
            .map(|word| unpack_color(u16::from_le_bytes([word[0], word[1]]), true))
            .collect();

        Ok(pixels)
    }

    fn decode_nbf(&mut self) -> Result<Vec<Pixel>, UgoErrors> {
        let (palette_len, pixel_len) = self.sections()?;

        if palette_len % 2 != 0 || palette_len > NBF_PALETTE_SLOTS * 2 {
            return Err(UgoErrors::MalformedHeader(
                "NBF palette must hold at most 256 16-bit entries"
            ));
        }
        if palette_len < NBF_PALETTE_SLOTS * 2 {
            warn!(
                "NBF palette has {} entries, filling the rest",
                palette_len / 2
            );
        }
        let palette_bytes = self.read_section(palette_len, "NBF palette")?;
        let indices = self.read_section(pixel_len, "NBF pixels")?;

        self.confirm_end()?;

        let required = self.required_pixels()?;

        if indices.len() < required {
            return Err(UgoErrors::TruncatedBuffer("NBF pixels", required));
        }
        if indices.len() > required {
            warn!("Dropping {} extra NBF pixels", indices.len() - required);
        }

        let palette = unpack_palette(&palette_bytes, NBF_PALETTE_SLOTS);

        let pixels = indices[..required]
            .iter()
            .map(|index| palette[usize::from(*index)])
            .collect();

        Ok(pixels)
    }

    fn decode_npf(&mut self) -> Result<Vec<Pixel>, UgoErrors> {
        let (palette_len, pixel_len) = self.sections()?;

        // the header stores the unpadded length, but the palette
        // occupies the next power of two on disk
        let occupied = storage_width(palette_len)?;

        if occupied > NPF_PALETTE_SLOTS * 2 {
            warn!("NPF palette occupies {occupied} bytes, only 16 entries are used");
        }

        let palette_bytes = self.read_section(occupied, "NPF palette")?;
        let packed = self.read_section(pixel_len, "NPF pixels")?;

        self.confirm_end()?;

        let required = self.required_pixels()?;
        let required_bytes = required.div_ceil(2);

        if packed.len() < required_bytes {
            return Err(UgoErrors::TruncatedBuffer("NPF pixels", required_bytes));
        }
        if packed.len() > required_bytes {
            warn!(
                "Dropping {} extra NPF pixel bytes",
                packed.len() - required_bytes
            );
        }

        // word 0 is never read, index 0 is always transparent
        let palette = unpack_palette(&palette_bytes, NPF_PALETTE_SLOTS);

        let lookup = |index: u8| -> Pixel {
            if index == 0 {
                Pixel::TRANSPARENT
            } else {
                palette[usize::from(index)]
            }
        };

        let mut pixels = Vec::with_capacity(required_bytes * 2);

        // low nibble is the even pixel, high nibble the odd one
        for byte in &packed[..required_bytes] {
            pixels.push(lookup(byte & 0x0F));
            pixels.push(lookup(byte >> 4));
        }
        pixels.truncate(required);

        Ok(pixels)
    }

    /// Return the number of bytes required to hold the decoded image
    /// as interleaved RGBA
    ///
    /// # Returns
    ///  - `Some(usize)`: Minimum size for a buffer needed to decode the image
    ///  - `None`: Indicates the headers were not decoded or the size overflows
    pub fn output_buffer_size(&self) -> Option<usize> {
        if self.decoded_headers {
            self.width
                .checked_mul(self.height)?
                .checked_mul(ColorSpace::RGBA.num_components())
        } else {
            None
        }
    }

    /// Return the width and height of the image
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Return the power of two row width and the height the image
    /// is stored with, or `None` if headers haven't been decoded
    pub const fn storage_dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            return Some((self.stride, self.height));
        }
        None
    }

    /// Return the UGAR section table, present after decoding
    /// headers of NBF and NPF images
    pub const fn section_table(&self) -> Option<&SectionTable> {
        self.sections.as_ref()
    }

    pub const fn format(&self) -> UgoFormat {
        self.format
    }

    /// Return the colorspace of decoded images
    ///
    /// This is always RGBA
    pub const fn colorspace(&self) -> ColorSpace {
        ColorSpace::RGBA
    }

    /// Return the bit depth of decoded images
    ///
    /// This is always 8
    pub const fn bit_depth(&self) -> BitDepth {
        BitDepth::Eight
    }
}
