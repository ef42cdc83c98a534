pub mod commands {
    /// Mask of the command index inside the first command byte.
    pub const INDEX_MASK: u8 = 0x3F;
    /// GO_IDLE_STATE - init card in spi mode if CS low.
    pub const CMD0: u8 = 0;
    /// SEND_IF_COND - verify SD Memory Card interface operating condition.
    pub const CMD8: u8 = 8;
    /// APP_CMD - escape for application specific command.
    pub const CMD55: u8 = 55;
    /// GEN_CMD - general purpose command, vendor health register on SanDisk cards.
    pub const CMD56: u8 = 56;
    /// SD_SEND_OP_COMD - Sends host capacity support information and activates
    /// the card's initialization process.
    pub const ACMD41: u8 = 41;
}

pub mod crcs {
    //! Precomputed CRC bytes (CRC7 + end bit) for the fixed command set.

    pub const CMD0: u8 = 0x95;
    pub const CMD8: u8 = 0x87;
    pub const CMD55: u8 = 0x65;
    pub const CMD56: u8 = 0x01;
    pub const ACMD41: u8 = 0x77;
}

pub mod args {
    /// 2.7-3.6V supply with check pattern 0xAA.
    pub const CMD8_VOLTAGE_CHECK: u32 = 0x0000_01AA;
    /// HCS bit, host supports high capacity cards.
    pub const ACMD41_HCS: u32 = 0x4000_0000;
    /// Read the health register block.
    pub const CMD56_READ_HEALTH: u32 = 0x0000_0001;
}

pub mod tokens {
    /// Start data token for read or write single block.
    pub const DATA_START_BLOCK: u8 = 0xFE;
    /// Idle bus level, also clocked out while receiving.
    pub const IDLE: u8 = 0xFF;
    /// Bit set in every byte that is not an R1 response.
    pub const R1_INVALID_MASK: u8 = 0x80;
}

/// Data block payload size.
pub const BLOCK_SIZE: usize = 512;
/// Size of the CRC trailer following a data block.
pub const BLOCK_CRC_SIZE: usize = 2;
/// Count of R7 bytes following the R1 of CMD8.
pub const CMD8_ECHO_SIZE: usize = 4;
/// SPI clock rate during card power up.
pub const INIT_CLOCK_HZ: u32 = 400_000;
/// Default SPI device, bus 0 and chip select 0.
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";
