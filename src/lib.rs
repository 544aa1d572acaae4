/*
 *  lib.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  OLED bring-up: binds the display controller to its I2C bus
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

//! # LyMonS OLED bring-up
//!
//! Acquires the I2C bus a panel hangs off, binds the display controller to
//! it, powers it on and hands the device to whatever renders on it.
//!
//! ```ignore
//! let board = config.board();
//! let mut bringup = BringupController::from_board(
//!     &board,
//!     LinuxI2cProvider::default(),
//!     Ssd1306Binder::from_board(&board),
//! );
//! bringup.initialize()?;
//! let display = bringup.get_device(0)?;
//! ```

pub mod config;
pub mod display;

pub use display::{BringupController, BringupError, BringupState, LcdDevice};
