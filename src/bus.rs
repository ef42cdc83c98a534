//! Linux `spidev` transport.

use crate::consts::INIT_CLOCK_HZ;

use core::convert::Infallible;
use std::{io, path::Path};

use linux_embedded_hal::{
    spidev::{SpiModeFlags, SpidevOptions},
    Spidev,
};
use log::info;
use switch_hal::OutputSwitch;

/// Open a spidev device in SPI mode 0 at the power up clock rate.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Spidev> {
    let mut spi = Spidev::open(path.as_ref())?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(INIT_CLOCK_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();

    spi.configure(&options)?;

    info!(
        "Opened {} at {} Hz",
        path.as_ref().display(),
        INIT_CLOCK_HZ
    );

    Ok(spi)
}

/// Chip select driven by the spidev kernel driver around every transfer.
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelSelect;

impl OutputSwitch for KernelSelect {
    type Error = Infallible;

    fn on(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn off(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_select_never_fails() {
        let mut cs = KernelSelect;
        assert_eq!(cs.on(), Ok(()));
        assert_eq!(cs.off(), Ok(()));
    }

    #[test]
    fn open_missing_device_fails() {
        assert!(open("/dev/spidev-does-not-exist").is_err());
    }
}
