/*
 *  display/bringup.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Board display bring-up: bus acquisition, device bind, power, teardown
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

use crate::config::BoardConfig;
use crate::display::bus::BusHandle;
use crate::display::error::{BringupError, DisplayError};
use crate::display::traits::{BoxedDevice, BusProvider, DeviceBinder, LcdDevice};

use log::{debug, error, info, warn};

/// Where the controller is in the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringupState {
    Uninitialized,
    BusReady,
    DeviceBound,
}

struct BoundDevice {
    devno: u32,
    device: BoxedDevice,
}

/// Owns the display bus and the display device bound on it
///
/// The boot sequence holds one of these and drives it through
/// `initialize` → `get_device` → `uninitialize`. The device only ever sees a
/// weak reference to the bus, so dropping the bus here is what ends its
/// access to the hardware.
pub struct BringupController<P: BusProvider, B: DeviceBinder<P::Bus>> {
    bus_index: u32,
    max_power: u32,
    provider: P,
    binder: B,
    bus: Option<BusHandle<P::Bus>>,
    device: Option<BoundDevice>,
}

impl<P: BusProvider, B: DeviceBinder<P::Bus>> BringupController<P, B> {
    pub fn new(bus_index: u32, max_power: u32, provider: P, binder: B) -> Self {
        Self {
            bus_index,
            max_power,
            provider,
            binder,
            bus: None,
            device: None,
        }
    }

    pub fn from_board(board: &BoardConfig, provider: P, binder: B) -> Self {
        Self::new(board.bus_index(), board.max_power(), provider, binder)
    }

    pub fn state(&self) -> BringupState {
        match (&self.bus, &self.device) {
            (None, _) => BringupState::Uninitialized,
            (Some(_), None) => BringupState::BusReady,
            (Some(_), Some(_)) => BringupState::DeviceBound,
        }
    }

    pub fn bus_index(&self) -> u32 {
        self.bus_index
    }

    pub fn max_power(&self) -> u32 {
        self.max_power
    }

    /// Number of the currently bound display, if any
    pub fn devno(&self) -> Option<u32> {
        self.device.as_ref().map(|bound| bound.devno)
    }

    /// Acquire the bus transport
    ///
    /// Calling this again while the bus is held keeps the existing handle.
    pub fn initialize(&mut self) -> Result<(), BringupError> {
        if self.bus.is_some() {
            debug!("I2C bus {} already initialized", self.bus_index);
            return Ok(());
        }

        match self.provider.acquire(self.bus_index) {
            Ok(bus) => {
                self.bus = Some(BusHandle::new(self.bus_index, bus));
                info!("Initialized I2C bus {}", self.bus_index);
                Ok(())
            }
            Err(e) => {
                error!("Failed to initialize I2C bus {}: {}", self.bus_index, e);
                Err(BringupError::DeviceNotFound {
                    bus: self.bus_index,
                    source: e,
                })
            }
        }
    }

    /// Bind display `devno` on the bus and switch it on at `max_power`
    ///
    /// A display that is already bound is powered off, dropped and the
    /// requested one bound in its place.
    pub fn get_device(&mut self, devno: u32) -> Result<&mut dyn LcdDevice, BringupError> {
        let Some(bus) = self.bus.as_ref() else {
            error!("Cannot bind display {}: I2C bus {} not initialized", devno, self.bus_index);
            return Err(BringupError::DeviceNotFound {
                bus: self.bus_index,
                source: DisplayError::BusNotInitialized,
            });
        };

        if let Some(mut previous) = self.device.take() {
            debug!("Rebinding display {} (dropping display {})", devno, previous.devno);
            if let Err(e) = previous.device.set_power(0) {
                warn!("Failed to power off display {}: {}", previous.devno, e);
            }
        }

        let mut device = match self.binder.bind(bus.downgrade(), devno) {
            Ok(device) => device,
            Err(e) => {
                error!("Failed to bind I2C bus {} to display {}: {}", self.bus_index, devno, e);
                return Err(BringupError::BindFailed {
                    bus: self.bus_index,
                    devno,
                    source: e,
                });
            }
        };

        if let Err(e) = device.set_power(self.max_power) {
            error!("Failed to power on display {} on I2C bus {}: {}", devno, self.bus_index, e);
            return Err(BringupError::BindFailed {
                bus: self.bus_index,
                devno,
                source: e,
            });
        }

        info!("Bound I2C bus {} to display {}", self.bus_index, devno);
        let bound = self.device.insert(BoundDevice { devno, device });
        let device: &mut dyn LcdDevice = bound.device.as_mut();
        Ok(device)
    }

    /// The bound display, without rebinding it
    pub fn device(&mut self) -> Option<&mut dyn LcdDevice> {
        let bound = self.device.as_mut()?;
        let device: &mut dyn LcdDevice = bound.device.as_mut();
        Some(device)
    }

    /// Power the display off and release it and the bus
    ///
    /// Never fails. Each failed step is logged and teardown carries on.
    pub fn uninitialize(&mut self) {
        if self.bus.is_none() && self.device.is_none() {
            debug!("Display bring-up already uninitialized");
            return;
        }

        if let Some(mut bound) = self.device.take() {
            if let Err(e) = bound.device.set_power(0) {
                warn!("Failed to power off display {}: {}", bound.devno, e);
            }
            info!("Released display {}", bound.devno);
        }

        if let Some(handle) = self.bus.take() {
            let index = handle.index();
            match handle.into_inner() {
                Ok(bus) => match self.provider.release(index, bus) {
                    Ok(()) => info!("Released I2C bus {}", index),
                    Err(e) => warn!("Failed to release I2C bus {}: {}", index, e),
                },
                Err(_handle) => {
                    warn!("I2C bus {} still in use, dropping it without release", index);
                }
            }
        }
    }
}

impl<P: BusProvider, B: DeviceBinder<P::Bus>> Drop for BringupController<P, B> {
    fn drop(&mut self) {
        if self.bus.is_some() || self.device.is_some() {
            self.uninitialize();
        }
    }
}
