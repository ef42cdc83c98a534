//! SD card health register reader written in Rust, built on the SPI driver
//! design of [sdmmc-spi](https://crates.io/crates/sdmmc-spi).
//!
//! This crate is intended to bring up an SD card on a SPI bus and read the
//! vendor health register (CMD56) of SanDisk cards.

pub mod bus;
mod command;
mod config;
mod consts;
mod health;
mod report;
mod response;
mod utils;

pub use crate::command::{Command, CommandPacket};
pub use crate::config::{DefaultSdSpiConfig, SdSpiConfig};
pub use crate::consts::{BLOCK_SIZE, DEFAULT_DEVICE, INIT_CLOCK_HZ};
pub use crate::health::{HealthData, HealthRegister, TextDecode, SANDISK_IDENTIFIER};
pub use crate::report::{os_version, Environment, Report, METHOD, UNKNOWN_VERSION};
pub use crate::response::R1Response;
pub use crate::utils::hexdump;

use crate::consts::{tokens, BLOCK_CRC_SIZE, CMD8_ECHO_SIZE};

use core::{cell::RefCell, fmt, marker::PhantomData};
use embedded_hal::blocking::{delay::DelayMs, spi::Transfer};
use log::{debug, error, info, warn};
use switch_hal::OutputSwitch;

/// [`SdSpi`] result error.
///
/// `T` - transport error type.
/// `S` - select switch type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<T, S> {
    /// Error from the SPI peripheral.
    Transport(T),
    /// Couldn't set a select.
    SelectError(S),
    /// Card didn't complete the power up handshake.
    InitFailed,
    /// Health register command answered with anything but ready, or not at all.
    CommandRejected(Option<R1Response>),
    /// No start token when reading data from the card.
    TimeoutReadBuffer,
}

impl<T, S> Error<T, S> {
    /// Whether the card itself refused, as opposed to a bus fault.
    pub fn is_card_fault(&self) -> bool {
        matches!(
            self,
            Error::InitFailed | Error::CommandRejected(_) | Error::TimeoutReadBuffer
        )
    }
}

impl<T: fmt::Debug, S: fmt::Debug> fmt::Display for Error<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "SPI transfer failed: {:?}", err),
            Error::SelectError(err) => write!(f, "Chip select failed: {:?}", err),
            Error::InitFailed => f.write_str("Card initialization failed"),
            Error::CommandRejected(_) => f.write_str("CMD56 not accepted or unsupported"),
            Error::TimeoutReadBuffer => f.write_str("No data block received"),
        }
    }
}

impl<T: fmt::Debug, S: fmt::Debug> std::error::Error for Error<T, S> {}

/// Card state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    NotInitialized,
    Ready,
    Failed,
}

/// Power up handshake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BringUp {
    GoIdle,
    CheckVoltage,
    AppOpCond(usize),
    Ready,
    Failed,
}

/// Error type alias.
type ErrorFor<Spi, Cs> = Error<<Spi as Transfer<u8>>::Error, <Cs as OutputSwitch>::Error>;

/// SD Card SPI driver.
///
/// `Spi` - SPI.
/// `Cs` - Chip select output switch.
/// `Delay` - millisecond delay provider.
/// `Config` - Config implementation of driver config trait.
pub struct SdSpi<Spi, Cs, Delay, Config = DefaultSdSpiConfig>
where
    Spi: Transfer<u8>,
    Cs: OutputSwitch,
    Delay: DelayMs<u32>,
    Config: SdSpiConfig,
{
    spi: RefCell<Spi>,
    cs: RefCell<Cs>,
    delay: RefCell<Delay>,
    state: CardState,
    config: PhantomData<Config>,
}

impl<Spi, Cs, Delay, Config> SdSpi<Spi, Cs, Delay, Config>
where
    Spi: Transfer<u8>,
    Cs: OutputSwitch,
    Delay: DelayMs<u32>,
    Config: SdSpiConfig,
    Spi::Error: fmt::Debug,
    Cs::Error: fmt::Debug,
{
    /// Init sequence value.
    const INIT_SET_VALUE: u8 = 0xFF;
    /// Init sequence size.
    const INIT_SET_SIZE: usize = 10;
    /// Receive transfer token.
    const RECEIVE_TRANSFER_TOKEN: u8 = tokens::IDLE;

    /// Creates a new [`SdSpi<Spi, Cs, Delay, Config>`].
    ///
    /// `spi` - SPI instance, already clocked at [`INIT_CLOCK_HZ`].
    /// `cs` - chip select output switch.
    /// `delay` - delay provider for the retry loops.
    pub fn new(spi: Spi, cs: Cs, delay: Delay) -> Self {
        SdSpi {
            spi: RefCell::new(spi),
            cs: RefCell::new(cs),
            delay: RefCell::new(delay),
            state: CardState::NotInitialized,
            config: PhantomData::<Config>,
        }
    }

    /// Current card state.
    pub fn state(&self) -> CardState {
        self.state
    }

    /// Release the peripherals.
    pub fn release(self) -> (Spi, Cs, Delay) {
        (
            self.spi.into_inner(),
            self.cs.into_inner(),
            self.delay.into_inner(),
        )
    }

    /// Delay.
    fn delay_ms(&self, ms: u32) {
        self.delay.borrow_mut().delay_ms(ms);
    }

    /// Activate chip select.
    fn select(&self) -> Result<(), ErrorFor<Spi, Cs>> {
        self.cs.borrow_mut().on().map_err(Error::SelectError)
    }

    /// Deactivate chip select.
    fn unselect(&self) -> Result<(), ErrorFor<Spi, Cs>> {
        self.cs.borrow_mut().off().map_err(Error::SelectError)
    }

    /// CS scope.
    fn cs_scope<F, R>(&self, f: F) -> Result<R, ErrorFor<Spi, Cs>>
    where
        F: FnOnce(&Self) -> Result<R, ErrorFor<Spi, Cs>>,
    {
        self.select()?;
        let result = f(self);
        self.unselect()?;

        result
    }

    /// Send one byte and receive one byte.
    fn transfer(&self, data: u8) -> Result<u8, ErrorFor<Spi, Cs>> {
        self.spi
            .borrow_mut()
            .transfer(&mut [data])
            .map(|b| b[0])
            .map_err(Error::Transport)
    }

    /// Receive a byte from the SD card by clocking in an 0xFF byte.
    fn receive(&self) -> Result<u8, ErrorFor<Spi, Cs>> {
        self.transfer(Self::RECEIVE_TRANSFER_TOKEN)
    }

    /// Send a byte to the SD card.
    fn send(&self, data: u8) -> Result<(), ErrorFor<Spi, Cs>> {
        self.transfer(data).map(|_| ())
    }

    /// Receive a slice from the SD card in a single transfer.
    fn receive_slice(&self, data: &mut [u8]) -> Result<(), ErrorFor<Spi, Cs>> {
        data.fill(Self::RECEIVE_TRANSFER_TOKEN);

        self.spi
            .borrow_mut()
            .transfer(data)
            .map(|_| ())
            .map_err(Error::Transport)
    }

    /// Send a slice to the SD card.
    fn send_slice(&self, data: &[u8]) -> Result<(), ErrorFor<Spi, Cs>> {
        for byte in data.iter() {
            self.send(*byte)?;
        }

        Ok(())
    }

    /// Clock the card with chip select released so it finishes power on reset.
    pub fn power_up(&self) -> Result<(), ErrorFor<Spi, Cs>> {
        self.unselect()?;

        for _ in 0..Self::INIT_SET_SIZE {
            self.send(Self::INIT_SET_VALUE)?;
        }

        Ok(())
    }

    /// Send command.
    ///
    /// Returns the first valid R1 within [`SdSpiConfig::READ_R1_ATTEMPTS`]
    /// polled bytes, `None` if there was none.
    pub fn send_command(&self, cmd: Command) -> Result<Option<R1Response>, ErrorFor<Spi, Cs>> {
        self.send(tokens::IDLE)?;
        self.send_slice(&cmd.to_bytes())?;

        for _ in 0..Config::READ_R1_ATTEMPTS {
            let r1 = R1Response(self.receive()?);

            if r1.is_valid() {
                debug!("CMD{} -> 0x{:02X}", cmd.index, r1.0);
                return Ok(Some(r1));
            }
        }

        debug!("CMD{} -> no response", cmd.index);
        Ok(None)
    }

    /// Read a data block, `None` if the start token never came.
    ///
    /// The CRC trailer is drained and not checked.
    pub fn read_data_block(&self) -> Result<Option<HealthData>, ErrorFor<Spi, Cs>> {
        let mut found = false;

        for _ in 0..Config::DATA_TOKEN_ATTEMPTS {
            if self.receive()? == tokens::DATA_START_BLOCK {
                found = true;
                break;
            }

            self.delay_ms(Config::DATA_TOKEN_DELAY_MS);
        }

        if !found {
            warn!(
                "No start token after {} attempts",
                Config::DATA_TOKEN_ATTEMPTS
            );
            return Ok(None);
        }

        let mut buf = [0u8; BLOCK_SIZE + BLOCK_CRC_SIZE];
        self.receive_slice(&mut buf)?;

        let mut data = [0u8; BLOCK_SIZE];
        data.copy_from_slice(&buf[..BLOCK_SIZE]);

        Ok(Some(data))
    }

    /// Run one step of the power up handshake.
    fn step(&self, state: BringUp) -> Result<BringUp, ErrorFor<Spi, Cs>> {
        Ok(match state {
            BringUp::GoIdle => match self.send_command(Command::GO_IDLE_STATE)? {
                Some(R1Response::IN_IDLE_STATE) => BringUp::CheckVoltage,
                r => {
                    warn!("Wrong response from CMD0: {:?}", r);
                    BringUp::Failed
                }
            },
            BringUp::CheckVoltage => match self.send_command(Command::SEND_IF_COND)? {
                Some(R1Response::IN_IDLE_STATE) => {
                    let mut echo = [0u8; CMD8_ECHO_SIZE];
                    self.receive_slice(&mut echo)?;
                    BringUp::AppOpCond(0)
                }
                r => {
                    warn!("Wrong response from CMD8: {:?}", r);
                    BringUp::Failed
                }
            },
            BringUp::AppOpCond(attempt) if attempt >= Config::INIT_ATTEMPTS => {
                warn!("Card still idle after {} ACMD41 attempts", attempt);
                BringUp::Failed
            }
            BringUp::AppOpCond(attempt) => {
                self.send_command(Command::APP_CMD)?;

                match self.send_command(Command::SD_SEND_OP_COND)? {
                    Some(R1Response::READY_STATE) => BringUp::Ready,
                    _ => {
                        self.delay_ms(Config::INIT_RETRY_DELAY_MS);
                        BringUp::AppOpCond(attempt + 1)
                    }
                }
            }
            BringUp::Ready | BringUp::Failed => state,
        })
    }

    /// Drive the handshake to a terminal step.
    fn bring_up(&self) -> Result<bool, ErrorFor<Spi, Cs>> {
        let mut state = BringUp::GoIdle;

        loop {
            state = self.step(state)?;

            match state {
                BringUp::Ready => return Ok(true),
                BringUp::Failed => return Ok(false),
                _ => {}
            }
        }
    }

    /// Initialize SD.
    pub fn initialize(&mut self) -> Result<(), ErrorFor<Spi, Cs>> {
        info!("SD initialize started");

        self.power_up()?;

        let ready = self.cs_scope(|s| s.bring_up())?;

        if ready {
            info!("SD successfully initialized");
            self.state = CardState::Ready;
            Ok(())
        } else {
            error!("Failed to initialize SD");
            self.state = CardState::Failed;
            Err(Error::InitFailed)
        }
    }

    /// Read the vendor health register, initializing the card first if needed.
    pub fn read_health_register(&mut self) -> Result<HealthData, ErrorFor<Spi, Cs>> {
        if self.state != CardState::Ready {
            self.initialize()?;
        }

        self.cs_scope(|s| {
            match s.send_command(Command::READ_HEALTH)? {
                Some(R1Response::READY_STATE) => {}
                r => {
                    error!("CMD56 rejected: {:?}", r);
                    return Err(Error::CommandRejected(r));
                }
            }

            s.read_data_block()?.ok_or(Error::TimeoutReadBuffer)
        })
    }
}
