use crate::consts::tokens;

use bitfield::bitfield;

bitfield! {
    /// R1 response bitset.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct R1Response(u8);
    impl Debug;
    pub in_idle_state, _: 0;
    pub erase_reset, _: 1;
    pub illigal_command, _: 2;
    pub command_crc_error, _: 3;
    pub erase_sequence_error, _: 4;
    pub address_error, _: 5;
    pub parameter_error, _: 6;
}

impl R1Response {
    /// Card is ready, no error flags.
    pub const READY_STATE: Self = R1Response(0x00);
    /// Card is in idle state, no error flags.
    pub const IN_IDLE_STATE: Self = R1Response(0x01);

    /// R1 always has its most significant bit cleared.
    pub fn is_valid(&self) -> bool {
        self.0 & tokens::R1_INVALID_MASK == 0
    }
}
