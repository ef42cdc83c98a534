use crate::consts::BLOCK_SIZE;

use core::ops::Range;

/// Health register data block.
pub type HealthData = [u8; BLOCK_SIZE];

/// Byte layout of the SanDisk health register.
pub mod layout {
    use core::ops::Range;

    pub const SD_IDENTIFIER: Range<usize> = 0..2;
    pub const MANUFACTURE_DATE: Range<usize> = 2..8;
    pub const PERCENT_USED: usize = 8;
    pub const FEATURE_REVISION: Range<usize> = 12..14;
    pub const GENERATION_IDENTIFIER: usize = 14;
    pub const PRODUCT_STRING: Range<usize> = 49..81;
}

/// Identifier reported by SanDisk cards, "DS".
pub const SANDISK_IDENTIFIER: [u8; 2] = [0x44, 0x53];

/// Decode policy for text fields: ASCII passes through, anything else is
/// replaced, nothing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecode {
    ReplaceNonAscii,
}

impl TextDecode {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextDecode::ReplaceNonAscii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }
}

/// Decoded health register fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRegister {
    pub sd_identifier: [u8; 2],
    pub manufacture_date: String,
    pub percent_used: u8,
    pub feature_revision: [u8; 2],
    pub generation_identifier: u8,
    pub product_string: String,
}

impl HealthRegister {
    const TEXT_DECODE: TextDecode = TextDecode::ReplaceNonAscii;

    /// Slice the register block into its fields.
    pub fn parse(data: &HealthData) -> Self {
        let pair = |range: Range<usize>| [data[range.start], data[range.start + 1]];

        HealthRegister {
            sd_identifier: pair(layout::SD_IDENTIFIER),
            manufacture_date: Self::TEXT_DECODE.decode(&data[layout::MANUFACTURE_DATE]),
            percent_used: data[layout::PERCENT_USED],
            feature_revision: pair(layout::FEATURE_REVISION),
            generation_identifier: data[layout::GENERATION_IDENTIFIER],
            product_string: Self::TEXT_DECODE
                .decode(&data[layout::PRODUCT_STRING])
                .trim_end()
                .to_owned(),
        }
    }

    pub fn is_sandisk(&self) -> bool {
        self.sd_identifier == SANDISK_IDENTIFIER
    }

    /// Identifier bytes rendered as "0x44 0x53".
    pub fn signature(&self) -> String {
        format!(
            "0x{:02X} 0x{:02X}",
            self.sd_identifier[0], self.sd_identifier[1]
        )
    }

    /// Feature revision rendered as "0x0102".
    pub fn feature_revision_hex(&self) -> String {
        format!(
            "0x{:02X}{:02X}",
            self.feature_revision[0], self.feature_revision[1]
        )
    }
}
