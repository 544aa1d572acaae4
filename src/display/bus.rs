/*
 *  display/bus.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bus transport ownership and non-owning device references
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

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use linux_embedded_hal::I2cdev;
use log::{debug, info};

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::display::error::DisplayError;
use crate::display::traits::BusProvider;

/// Default device node pattern, `{bus}` is replaced by the bus index
pub const DEFAULT_I2C_PATH_TEMPLATE: &str = "/dev/i2c-{bus}";

/// The owning side of an acquired bus. Only the bring-up controller holds one.
pub struct BusHandle<B> {
    index: u32,
    bus: Arc<Mutex<B>>,
}

impl<B> BusHandle<B> {
    pub fn new(index: u32, bus: B) -> Self {
        Self {
            index,
            bus: Arc::new(Mutex::new(bus)),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Hand out a reference a device can use without extending the bus lifetime
    pub fn downgrade(&self) -> BusRef<B> {
        BusRef {
            bus: Arc::downgrade(&self.bus),
        }
    }

    /// Take the transport back out, failing if something still holds a strong reference
    pub fn into_inner(self) -> Result<B, Self> {
        let index = self.index;
        match Arc::try_unwrap(self.bus) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())),
            Err(bus) => Err(Self { index, bus }),
        }
    }
}

impl<B> fmt::Debug for BusHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusHandle")
            .field("index", &self.index)
            .finish()
    }
}

/// Non-owning reference from a display device to the bus it sits on
///
/// Transfers through a reference whose bus has been released fail with
/// [`BusRefError::Released`].
pub struct BusRef<B> {
    bus: Weak<Mutex<B>>,
}

impl<B> BusRef<B> {
    /// A reference that was never attached to a bus
    pub fn detached() -> Self {
        Self { bus: Weak::new() }
    }

    /// Whether the bus behind this reference is still held by its owner
    pub fn is_live(&self) -> bool {
        self.bus.strong_count() > 0
    }

    /// Run `f` with exclusive access to the bus
    pub fn with_bus<T>(&self, f: impl FnOnce(&mut B) -> T) -> Result<T, DisplayError> {
        let bus = self.bus.upgrade().ok_or(DisplayError::BusReleased)?;
        let mut guard = bus
            .lock()
            .map_err(|_| DisplayError::Other("bus lock poisoned".to_string()))?;
        Ok(f(&mut *guard))
    }
}

impl<B> Clone for BusRef<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Weak::clone(&self.bus),
        }
    }
}

impl<B> fmt::Debug for BusRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusRef")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Errors from transfers through a [`BusRef`]
#[derive(Debug)]
pub enum BusRefError<E> {
    /// The owning controller released the bus
    Released,
    /// Another user panicked while holding the bus
    Poisoned,
    /// The transport itself failed
    Bus(E),
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for BusRefError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            BusRefError::Bus(e) => e.kind(),
            _ => ErrorKind::Other,
        }
    }
}

impl<B: I2c> ErrorType for BusRef<B> {
    type Error = BusRefError<B::Error>;
}

impl<B: I2c> I2c for BusRef<B> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let bus = self.bus.upgrade().ok_or(BusRefError::Released)?;
        let mut guard = bus.lock().map_err(|_| BusRefError::Poisoned)?;
        guard.transaction(address, operations).map_err(BusRefError::Bus)
    }
}

/// Opens Linux I2C character devices (`/dev/i2c-N`)
#[derive(Debug, Clone)]
pub struct LinuxI2cProvider {
    path_template: String,
}

impl LinuxI2cProvider {
    pub fn new(path_template: impl Into<String>) -> Self {
        Self {
            path_template: path_template.into(),
        }
    }

    /// Device node for a bus index
    pub fn path_for(&self, index: u32) -> String {
        self.path_template.replace("{bus}", &index.to_string())
    }
}

impl Default for LinuxI2cProvider {
    fn default() -> Self {
        Self::new(DEFAULT_I2C_PATH_TEMPLATE)
    }
}

impl BusProvider for LinuxI2cProvider {
    type Bus = I2cdev;

    fn acquire(&mut self, index: u32) -> Result<I2cdev, DisplayError> {
        let path = self.path_for(index);
        debug!("Opening I2C bus {} at {}", index, path);
        let i2c = I2cdev::new(&path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", path, e)))?;
        info!("Opened I2C bus {} ({})", index, path);
        Ok(i2c)
    }

    fn release(&mut self, index: u32, bus: I2cdev) -> Result<(), DisplayError> {
        // closing the file descriptor is all there is to it
        drop(bus);
        info!("Closed I2C bus {} ({})", index, self.path_for(index));
        Ok(())
    }
}
