/*
 *  display/traits.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for bus and display device abstraction
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

use crate::display::bus::BusRef;
use crate::display::error::DisplayError;

/// Color depth capabilities of different display drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// Monochrome displays (1-bit per pixel)
    /// Used by: SSD1306
    Monochrome,
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Color depth
    pub color_depth: ColorDepth,

    /// Highest accepted power level
    pub max_power: u32,
}

/// Generic capability set handed to the display subsystem once a device is bound
///
/// Power follows the usual LCD convention: `0` switches the panel off and any
/// level up to `max_power` switches it on.
pub trait LcdDevice: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Current power level
    fn power(&self) -> u32;

    /// Set the power level (0..=max_power)
    fn set_power(&mut self, level: u32) -> Result<(), DisplayError>;

    /// Current contrast (0-255)
    fn contrast(&self) -> u8;

    /// Set contrast (0-255)
    ///
    /// Returns an error if the display doesn't support contrast control.
    fn set_contrast(&mut self, _value: u8) -> Result<(), DisplayError> {
        Err(DisplayError::Other("contrast control not supported".to_string()))
    }
}

/// Type alias for boxed display device trait objects
pub type BoxedDevice = Box<dyn LcdDevice>;

/// Acquires and releases the bus transport a display sits on
pub trait BusProvider {
    /// The open bus transport
    type Bus: Send + 'static;

    /// Open the transport for the given bus index
    fn acquire(&mut self, index: u32) -> Result<Self::Bus, DisplayError>;

    /// Give the transport back. The default just closes it by dropping.
    fn release(&mut self, index: u32, bus: Self::Bus) -> Result<(), DisplayError> {
        let _ = index;
        drop(bus);
        Ok(())
    }
}

/// Binds a display controller device to an acquired bus
pub trait DeviceBinder<Bus> {
    /// Construct device `devno` on the bus. The device only borrows the bus
    /// through `bus`; it must not keep it alive.
    fn bind(&mut self, bus: BusRef<Bus>, devno: u32) -> Result<BoxedDevice, DisplayError>;
}
