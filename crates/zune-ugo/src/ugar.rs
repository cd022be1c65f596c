/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! UGAR container header shared by NBF and NPF images
//!
//! ```text
//! ╔════════════╤══════════════════════════════════════════╗
//! ║ Bytes      │ Description                              ║
//! ╠════════════╪══════════════════════════════════════════╣
//! ║ 4          │ "UGAR" magic value                       ║
//! ╟────────────┼──────────────────────────────────────────╢
//! ║ 4          │ 32-Bit LE section count (n)              ║
//! ╟────────────┼──────────────────────────────────────────╢
//! ║ 4 * n      │ 32-Bit LE length of each section         ║
//! ╟────────────┼──────────────────────────────────────────╢
//! ║ ...        │ section bytes, in table order            ║
//! ╚════════════╧══════════════════════════════════════════╝
//! ```
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};
use zune_core::log::trace;

use crate::errors::UgoErrors;

/// Magic bytes starting every UGAR container
pub const UGAR_MAGIC: [u8; 4] = *b"UGAR";

/// The section lengths read from, or written to a UGAR header
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SectionTable {
    lengths: Vec<u32>
}

impl SectionTable {
    pub fn new(lengths: Vec<u32>) -> SectionTable {
        SectionTable { lengths }
    }
    /// Lengths of each section as stored in the header
    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }
    /// Length of section `index` or `None` if the table is shorter
    pub fn get(&self, index: usize) -> Option<usize> {
        self.lengths.get(index).map(|x| *x as usize)
    }
    /// Number of sections in the table
    pub fn len(&self) -> usize {
        self.lengths.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
    /// Size in bytes of the header that describes this table
    pub fn header_size(&self) -> usize {
        4 /*magic*/ + 4 /*count*/ + 4 * self.lengths.len()
    }
}

/// Write a UGAR header describing sections of `lengths` bytes
///
/// # Returns
/// - Ok(size): Bytes written for the header
pub fn write_header<T: ZByteWriterTrait>(
    writer: &mut ZWriter<T>, lengths: &[u32]
) -> Result<usize, UgoErrors> {
    let count = u32::try_from(lengths.len())
        .map_err(|_| UgoErrors::GenericStatic("Too many sections for a UGAR header"))?;

    writer.write_all(&UGAR_MAGIC)?;
    writer.write_u32_le_err(count)?;

    for length in lengths {
        writer.write_u32_le_err(*length)?;
    }
    Ok(4 + 4 + 4 * lengths.len())
}

/// Read a UGAR header, leaving the stream at the start of the first section
///
/// # Errors
/// - Wrong magic bytes
/// - Fewer bytes than the declared section count requires
pub fn read_header<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>
) -> Result<SectionTable, UgoErrors> {
    let magic = reader
        .read_fixed_bytes_or_error::<4>()
        .map_err(|_| UgoErrors::MalformedHeader("not enough bytes for magic"))?;

    if magic != UGAR_MAGIC {
        return Err(UgoErrors::MalformedHeader(
            "wrong magic bytes, expected `UGAR`"
        ));
    }

    let count = reader
        .get_u32_le_err()
        .map_err(|_| UgoErrors::MalformedHeader("not enough bytes for section count"))?;

    // the count is untrusted, only grow the table as lengths are actually read
    let mut lengths = Vec::with_capacity((count as usize).min(16));

    for _ in 0..count {
        let length = reader
            .get_u32_le_err()
            .map_err(|_| UgoErrors::MalformedHeader("section table is truncated"))?;
        lengths.push(length);
    }

    trace!("UGAR sections: {:?}", lengths);

    Ok(SectionTable::new(lengths))
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use zune_core::bytestream::{ZCursor, ZReader, ZWriter};

    use crate::errors::UgoErrors;
    use crate::ugar::{read_header, write_header, SectionTable};

    fn header_bytes(lengths: &[u32]) -> Vec<u8> {
        let mut output = vec![];
        let mut writer = ZWriter::new(&mut output);
        write_header(&mut writer, lengths).unwrap();
        output
    }

    #[test]
    fn test_layout() {
        let bytes = header_bytes(&[512, 49152]);
        assert_eq!(
            bytes,
            [b'U', b'G', b'A', b'R', 2, 0, 0, 0, 0, 2, 0, 0, 0, 0xC0, 0, 0]
        );
    }

    #[test]
    fn test_round_trip() {
        for lengths in [
            vec![0],
            vec![30, 128],
            vec![512, 49152],
            vec![1, 2, 3, 4, 5, u32::MAX]
        ] {
            let bytes = header_bytes(&lengths);
            let mut reader = ZReader::new(ZCursor::new(&bytes));
            let table = read_header(&mut reader).unwrap();

            assert_eq!(table, SectionTable::new(lengths.clone()));
            assert_eq!(table.header_size(), bytes.len());
        }
    }

    #[test]
    fn test_wrong_magic() {
        let mut bytes = header_bytes(&[2, 2]);
        bytes[0] = b'X';
        let mut reader = ZReader::new(ZCursor::new(&bytes));

        assert!(matches!(
            read_header(&mut reader),
            Err(UgoErrors::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_truncated_table() {
        let bytes = header_bytes(&[2, 2, 2]);

        for end in 0..bytes.len() {
            let mut reader = ZReader::new(ZCursor::new(&bytes[..end]));
            assert!(matches!(
                read_header(&mut reader),
                Err(UgoErrors::MalformedHeader(_))
            ));
        }
    }

    #[test]
    fn test_huge_count_does_not_allocate() {
        let bytes = [b'U', b'G', b'A', b'R', 0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 0, 0];
        let mut reader = ZReader::new(ZCursor::new(&bytes));

        assert!(read_header(&mut reader).is_err());
    }
}
