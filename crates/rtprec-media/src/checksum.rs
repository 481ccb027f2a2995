//! Ogg page checksum.
//!
//! Ogg uses a non-reflected CRC-32 with polynomial `0x04c11db7`, initial value
//! 0 and no final XOR. The checksum covers the whole page (header, segment
//! table and payload) with the checksum field itself zeroed.

/// Generator polynomial of the Ogg page checksum.
pub const OGG_POLYNOMIAL: u32 = 0x04c1_1db7;

/// Precomputed 256-entry lookup table for a MSB-first CRC-32.
#[derive(Clone)]
pub struct ChecksumTable {
    table: [u32; 256],
}

impl ChecksumTable {
    /// Build the table for `polynomial`.
    pub fn new(polynomial: u32) -> Self {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut r = (i as u32) << 24;
            for _ in 0..8 {
                r = if r & 0x8000_0000 != 0 {
                    (r << 1) ^ polynomial
                } else {
                    r << 1
                };
            }
            *entry = r;
        }
        Self { table }
    }

    /// Table for the Ogg page checksum.
    pub fn ogg() -> Self {
        Self::new(OGG_POLYNOMIAL)
    }

    /// Checksum of `bytes`, starting from zero.
    pub fn checksum(&self, bytes: &[u8]) -> u32 {
        self.update(0, bytes)
    }

    /// Continue a running checksum over more bytes.
    pub fn update(&self, crc: u32, bytes: &[u8]) -> u32 {
        bytes.iter().fold(crc, |crc, &byte| {
            (crc << 8) ^ self.table[((crc >> 24) as u8 ^ byte) as usize]
        })
    }

    /// Raw table entry.
    pub fn entry(&self, index: u8) -> u32 {
        self.table[index as usize]
    }
}

impl Default for ChecksumTable {
    fn default() -> Self {
        Self::ogg()
    }
}

impl std::fmt::Debug for ChecksumTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumTable")
            .field("polynomial", &format_args!("{:#010x}", self.table[1]))
            .finish()
    }
}
