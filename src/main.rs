/*
 *  main.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Boot-time OLED bring-up
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use std::thread;
use std::time::Duration;

use lymons_bringup::config::{self, Cli};
use lymons_bringup::display::{
    BringupController,
    BringupError,
    BusProvider,
    DeviceBinder,
    LinuxI2cProvider,
    Ssd1306Binder,
};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn bring_up<P, B>(bringup: &mut BringupController<P, B>, devno: u32) -> Result<(), BringupError>
where
    P: BusProvider,
    B: DeviceBinder<P::Bus>,
{
    bringup.initialize()?;
    let display = bringup.get_device(devno)?;
    let (width, height) = display.dimensions();
    info!(
        "Display {} up: {}x{}, power {}, contrast {}",
        devno, width, height, display.power(), display.contrast()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli)?;

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let board = cfg.board();
    let provider = match board.i2c_path.as_deref() {
        Some(template) => LinuxI2cProvider::new(template),
        None => LinuxI2cProvider::default(),
    };
    let binder = Ssd1306Binder::from_board(&board);
    let mut bringup = BringupController::from_board(&board, provider, binder);
    let devno = cfg.devno.unwrap_or(0);

    // no display is not fatal, the rest of the system carries on without one
    match bring_up(&mut bringup, devno) {
        Ok(()) => {
            if cli.hold_secs > 0 {
                info!("Holding display {} for {}s", devno, cli.hold_secs);
                thread::sleep(Duration::from_secs(cli.hold_secs));
            }
        }
        Err(e) => warn!("Continuing without display: {}", e),
    }

    bringup.uninitialize();
    info!("Display bring-up state: {:?}", bringup.state());
    Ok(())
}
