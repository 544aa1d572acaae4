/*
 *  display/drivers/ssd1306.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED display driver implementation
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

use embedded_hal::i2c::I2c;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::*,
    size::{DisplaySize128x64, DisplaySize128x32},
    I2CDisplayInterface,
    Ssd1306,
};

use crate::config::{BoardConfig, DisplayConfig as PanelConfig};
use crate::display::bus::BusRef;
use crate::display::error::DisplayError;
use crate::display::traits::{BoxedDevice, ColorDepth, DeviceBinder, DisplayCapabilities, LcdDevice};

use log::{debug, info};

type Interface<I> = I2CInterface<BusRef<I>>;

/// SSD1306 bound to a shared I2C bus
pub struct Ssd1306Device<I> {
    /// The underlying ssd1306 driver
    display: Ssd1306Variants<I>,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    devno: u32,
    power: u32,
    contrast: u8,
}

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants<I> {
    Size128x64(Ssd1306<Interface<I>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>),
    Size128x32(Ssd1306<Interface<I>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>),
}

impl<I: I2c + Send + 'static> Ssd1306Device<I> {
    /// Bind an SSD1306 on `bus` and run its init sequence
    ///
    /// The panel is left switched off; power is applied separately.
    pub fn new(
        bus: BusRef<I>,
        devno: u32,
        panel: &PanelConfig,
        max_power: u32,
    ) -> Result<Self, DisplayError> {
        if !bus.is_live() {
            return Err(DisplayError::BusReleased);
        }

        let address = panel.address();
        let width = panel.width.unwrap_or(128);
        let height = panel.height.unwrap_or(64);
        debug!("Binding SSD1306 {}x{} at 0x{:02X} as display {}", width, height, address, devno);

        let interface = I2CDisplayInterface::new_custom_address(bus, address);
        let display = match (width, height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            _ => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", width, height)
                ));
            }
        };

        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth: ColorDepth::Monochrome,
            max_power,
        };

        let mut device = Self {
            display,
            capabilities,
            devno,
            power: 0,
            contrast: u8::MAX,
        };

        // a panel that doesn't ack here isn't there
        device.init()?;
        device.set_display_on(false)?;

        if let Some(rotation) = panel.rotate_deg {
            device.set_rotation(rotation)?;
        }
        if let Some(contrast) = panel.contrast {
            device.set_contrast(contrast)?;
        }

        info!("SSD1306 display {} ready ({}x{} at 0x{:02X})", devno, width, height, address);
        Ok(device)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let result = match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.init(),
            Ssd1306Variants::Size128x32(display) => display.init(),
        };
        result.map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))
    }

    fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_display_on(on)?,
            Ssd1306Variants::Size128x32(display) => display.set_display_on(on)?,
        }
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = match degrees {
            0 => DisplayRotation::Rotate0,
            90 => DisplayRotation::Rotate90,
            180 => DisplayRotation::Rotate180,
            270 => DisplayRotation::Rotate270,
            _ => return Err(DisplayError::InvalidConfiguration(
                format!("Invalid rotation angle: {}", degrees)
            )),
        };

        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_rotation(rotation)?,
            Ssd1306Variants::Size128x32(display) => display.set_rotation(rotation)?,
        }
        Ok(())
    }
}

/// Map 0-255 onto the controller's contrast presets
fn brightness_for(value: u8) -> Brightness {
    match value {
        0..=63 => Brightness::DIMMEST,
        64..=127 => Brightness::DIM,
        128..=191 => Brightness::NORMAL,
        _ => Brightness::BRIGHTEST,
    }
}

impl<I: I2c + Send + 'static> LcdDevice for Ssd1306Device<I> {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn power(&self) -> u32 {
        self.power
    }

    fn set_power(&mut self, level: u32) -> Result<(), DisplayError> {
        if level > self.capabilities.max_power {
            return Err(DisplayError::InvalidPower {
                requested: level,
                max: self.capabilities.max_power,
            });
        }
        self.set_display_on(level > 0)?;
        self.power = level;
        debug!("SSD1306 display {} power {}", self.devno, level);
        Ok(())
    }

    fn contrast(&self) -> u8 {
        self.contrast
    }

    fn set_contrast(&mut self, value: u8) -> Result<(), DisplayError> {
        let brightness = brightness_for(value);
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_brightness(brightness)?,
            Ssd1306Variants::Size128x32(display) => display.set_brightness(brightness)?,
        }
        self.contrast = value;
        Ok(())
    }
}

/// Binds SSD1306 panels listed in the board config, `devno` indexes the list
#[derive(Debug, Clone)]
pub struct Ssd1306Binder {
    panels: Vec<PanelConfig>,
    max_power: u32,
}

impl Ssd1306Binder {
    pub fn new(panels: Vec<PanelConfig>, max_power: u32) -> Self {
        Self { panels, max_power }
    }

    pub fn from_board(board: &BoardConfig) -> Self {
        Self::new(board.devices(), board.max_power())
    }
}

impl<I: I2c + Send + 'static> DeviceBinder<I> for Ssd1306Binder {
    fn bind(&mut self, bus: BusRef<I>, devno: u32) -> Result<BoxedDevice, DisplayError> {
        let panel = self
            .panels
            .get(devno as usize)
            .ok_or(DisplayError::NoSuchDevice(devno))?;
        let device = Ssd1306Device::new(bus, devno, panel, self.max_power)?;
        Ok(Box::new(device))
    }
}
