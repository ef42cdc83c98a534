/// Represents config for [`SdSpi`](crate::SdSpi).
pub trait SdSpiConfig {
    /// Max bytes polled for an R1 response after a command.
    const READ_R1_ATTEMPTS: usize;
    /// Max ACMD41 attempts while waiting for the card to leave idle state.
    const INIT_ATTEMPTS: usize;
    /// Delay between ACMD41 attempts, in milliseconds.
    const INIT_RETRY_DELAY_MS: u32;
    /// Max bytes polled for the data start token.
    const DATA_TOKEN_ATTEMPTS: usize;
    /// Delay between data start token polls, in milliseconds.
    const DATA_TOKEN_DELAY_MS: u32;
}

/// Default implementation of [`SdSpiConfig`](crate::SdSpiConfig).
pub struct DefaultSdSpiConfig;

impl SdSpiConfig for DefaultSdSpiConfig {
    const READ_R1_ATTEMPTS: usize = 10;
    const INIT_ATTEMPTS: usize = 100;
    const INIT_RETRY_DELAY_MS: u32 = 100;
    const DATA_TOKEN_ATTEMPTS: usize = 1000;
    const DATA_TOKEN_DELAY_MS: u32 = 1;
}
