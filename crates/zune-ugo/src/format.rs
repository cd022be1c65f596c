/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Entry point for the three Flipnote formats
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use core::str::FromStr;

use zune_core::bytestream::ZCursor;

use crate::decoder::UgoDecoder;
use crate::encoder::UgoEncoder;
use crate::errors::UgoErrors;
use crate::image::PixelBuffer;
use crate::quantize::Quantizer;

/// All supported Flipnote image formats
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum UgoFormat {
    /// 16 bit direct color, one alpha bit per pixel
    NTFT,
    /// 8 bit indexed color with a 256 entry palette
    NBF,
    /// 4 bit indexed color with 15 colors and a transparent index
    NPF
}

impl UgoFormat {
    /// Return the format for a file extension, ignoring case
    ///
    /// # Example
    /// ```
    /// use zune_ugo::UgoFormat;
    /// assert_eq!(UgoFormat::from_extension("NPF").unwrap(), UgoFormat::NPF);
    /// assert!(UgoFormat::from_extension("png").is_err());
    /// ```
    pub fn from_extension<P: AsRef<str>>(extension: P) -> Result<UgoFormat, UgoErrors> {
        let extension = extension.as_ref();

        if extension.eq_ignore_ascii_case("ntft") {
            Ok(UgoFormat::NTFT)
        } else if extension.eq_ignore_ascii_case("nbf") {
            Ok(UgoFormat::NBF)
        } else if extension.eq_ignore_ascii_case("npf") {
            Ok(UgoFormat::NPF)
        } else {
            Err(UgoErrors::UnsupportedFormat(extension.to_string()))
        }
    }

    /// The lowercase file extension of this format
    pub const fn extension(self) -> &'static str {
        match self {
            UgoFormat::NTFT => "ntft",
            UgoFormat::NBF => "nbf",
            UgoFormat::NPF => "npf"
        }
    }

    /// Whether the format is wrapped in a UGAR header
    pub const fn has_container(self) -> bool {
        !matches!(self, UgoFormat::NTFT)
    }

    /// Number of colors the palette can hold or `None` for direct color
    ///
    /// For NPF this excludes the transparent index.
    pub const fn palette_colors(self) -> Option<usize> {
        match self {
            UgoFormat::NTFT => None,
            UgoFormat::NBF => Some(256),
            UgoFormat::NPF => Some(15)
        }
    }

    /// Decode `bytes` into a `width` by `height` image
    pub fn decode(self, bytes: &[u8], width: usize, height: usize) -> Result<PixelBuffer, UgoErrors> {
        UgoDecoder::new(ZCursor::new(bytes), self, width, height).decode()
    }

    /// Encode `image` into this format with the default quantizer
    pub fn encode(self, image: &PixelBuffer) -> Result<Vec<u8>, UgoErrors> {
        let mut sink = Vec::new();
        UgoEncoder::new(image, self).encode(&mut sink)?;
        Ok(sink)
    }

    /// Encode `image` into this format, reducing colors with `quantizer`
    pub fn encode_with_quantizer(
        self, image: &PixelBuffer, quantizer: &dyn Quantizer
    ) -> Result<Vec<u8>, UgoErrors> {
        let mut sink = Vec::new();
        UgoEncoder::new(image, self)
            .set_quantizer(quantizer)
            .encode(&mut sink)?;
        Ok(sink)
    }
}

impl FromStr for UgoFormat {
    type Err = UgoErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UgoFormat::from_extension(s)
    }
}

impl Display for UgoFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            UgoFormat::NTFT => write!(f, "NTFT"),
            UgoFormat::NBF => write!(f, "NBF"),
            UgoFormat::NPF => write!(f, "NPF")
        }
    }
}
