use crate::consts::{args, commands, crcs};

use bitfield::bitfield;

/// Raw command packet.
pub type CommandPacket = [u8; 6];

bitfield! {
    /// First byte of a command packet.
    struct CommandHead(u8);
    _, set_start_bit: 7;
    _, set_transmission_bit: 6;
    u8, _, set_index: 5, 0;
}

/// SD command with a caller supplied CRC byte.
///
/// CRC checking is off in SPI mode for everything but CMD0 and CMD8, so the
/// CRC byte is never computed, only carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub index: u8,
    pub argument: u32,
    pub crc: u8,
}

impl Command {
    /// GO_IDLE_STATE.
    pub const GO_IDLE_STATE: Self = Command::new(commands::CMD0, 0x0000_0000, crcs::CMD0);
    /// SEND_IF_COND with the 2.7-3.6V check pattern.
    pub const SEND_IF_COND: Self =
        Command::new(commands::CMD8, args::CMD8_VOLTAGE_CHECK, crcs::CMD8);
    /// APP_CMD.
    pub const APP_CMD: Self = Command::new(commands::CMD55, 0x0000_0000, crcs::CMD55);
    /// SD_SEND_OP_COND with host capacity support.
    pub const SD_SEND_OP_COND: Self =
        Command::new(commands::ACMD41, args::ACMD41_HCS, crcs::ACMD41);
    /// GEN_CMD requesting the vendor health register.
    pub const READ_HEALTH: Self =
        Command::new(commands::CMD56, args::CMD56_READ_HEALTH, crcs::CMD56);

    /// Creates a new [`Command`].
    ///
    /// `index` must fit in 6 bits.
    pub const fn new(index: u8, argument: u32, crc: u8) -> Self {
        Command {
            index,
            argument,
            crc,
        }
    }

    /// Frame the command: head byte, big endian argument, CRC byte.
    pub fn to_bytes(&self) -> CommandPacket {
        debug_assert!(self.index <= commands::INDEX_MASK);

        let mut head = CommandHead(0);
        head.set_start_bit(false);
        head.set_transmission_bit(true);
        head.set_index(self.index & commands::INDEX_MASK);

        let arg = self.argument.to_be_bytes();

        [head.0, arg[0], arg[1], arg[2], arg[3], self.crc]
    }
}
