use sdhealth_spi::{
    bus::{self, KernelSelect},
    hexdump, Environment, Report, SdSpi, DEFAULT_DEVICE,
};

use std::error::Error;

use clap::Parser;
use linux_embedded_hal::Delay;
use log::info;

/// Read the SanDisk health register (CMD56) of an SD card wired to a SPI bus.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// spidev device the card is attached to
    #[arg(short, long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Don't print the raw register hex dump
    #[arg(long)]
    no_dump: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let spi = bus::open(&args.device)?;
    let mut sd: SdSpi<_, _, _> = SdSpi::new(spi, KernelSelect, Delay);

    let result = sd.read_health_register();

    match &result {
        Ok(data) if !args.no_dump => print!("{}", hexdump(data)),
        Err(err) if err.is_card_fault() => println!("[-] {}", err),
        _ => {}
    }

    let report = Report::assemble(result, Environment::capture(&args.device))?;
    info!("Report assembled, success: {}", report.success);

    println!("{}", report.to_pretty_json()?);

    Ok(())
}
