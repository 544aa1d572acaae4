/*
 *  display/mod.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - board bring-up of the OLED and its bus
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod bus;

// Bring-up lifecycle
pub mod bringup;

// Display drivers (conditionally compiled based on features)
pub mod drivers;

// Re-exports for convenience
pub use traits::{BoxedDevice, BusProvider, ColorDepth, DeviceBinder, DisplayCapabilities, LcdDevice};
pub use error::{BringupError, DisplayError};
pub use bus::{BusHandle, BusRef, BusRefError, LinuxI2cProvider};
pub use bringup::{BringupController, BringupState};

#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::{Ssd1306Binder, Ssd1306Device};
