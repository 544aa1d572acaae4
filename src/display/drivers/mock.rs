/*
 *  display/drivers/mock.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock bus and display driver for testing without hardware
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

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};

use crate::display::bus::BusRef;
use crate::display::error::DisplayError;
use crate::display::traits::{BoxedDevice, BusProvider, ColorDepth, DeviceBinder, DisplayCapabilities, LcdDevice};

use std::sync::{Arc, Mutex};

/// I2C transport that records every write
#[derive(Debug, Default)]
pub struct MockI2c {
    /// (address, bytes) per write, in order
    pub writes: Vec<(u8, Vec<u8>)>,

    /// NACK every transfer, as an absent device would
    pub nack: bool,
}

impl MockI2c {
    pub fn nacking() -> Self {
        Self {
            nack: true,
            ..Default::default()
        }
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.nack {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                self.writes.push((address, bytes.to_vec()));
            }
        }
        Ok(())
    }
}

/// Shared state for the mock bus provider (inspect from tests)
#[derive(Debug, Default)]
pub struct MockBusState {
    /// Number of successful acquire() calls
    pub acquire_count: usize,

    /// Number of release() calls
    pub release_count: usize,

    /// Bus index of the last acquire() attempt
    pub last_index: Option<u32>,

    /// Simulate failures (for error testing)
    pub simulate_acquire_failure: bool,
    pub simulate_release_failure: bool,
}

/// Bus provider handing out [`MockI2c`] transports
#[derive(Debug, Clone, Default)]
pub struct MockBusProvider {
    state: Arc<Mutex<MockBusState>>,
}

impl MockBusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockBusState>> {
        Arc::clone(&self.state)
    }
}

impl BusProvider for MockBusProvider {
    type Bus = MockI2c;

    fn acquire(&mut self, index: u32) -> Result<MockI2c, DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.last_index = Some(index);
        if state.simulate_acquire_failure {
            return Err(DisplayError::I2cError(format!("Simulated: no I2C bus {}", index)));
        }
        state.acquire_count += 1;
        Ok(MockI2c::default())
    }

    fn release(&mut self, _index: u32, bus: MockI2c) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.release_count += 1;
        drop(bus);
        if state.simulate_release_failure {
            return Err(DisplayError::Other("Simulated release failure".to_string()));
        }
        Ok(())
    }
}

/// Shared state for the mock binder and the devices it creates
#[derive(Debug, Default)]
pub struct MockBinderState {
    /// Number of bind() attempts
    pub bind_count: usize,

    /// Number of devices dropped
    pub drop_count: usize,

    /// (devno, level) for every successful set_power()
    pub power_log: Vec<(u32, u32)>,

    /// Devices beyond this number don't exist
    pub device_count: u32,

    /// Simulate failures (for error testing)
    pub simulate_bind_failure: bool,
    pub simulate_power_failure: bool,
}

/// Binder producing [`MockDevice`]s
#[derive(Debug, Clone)]
pub struct MockBinder {
    state: Arc<Mutex<MockBinderState>>,
    max_power: u32,
}

impl MockBinder {
    pub fn new(max_power: u32) -> Self {
        let state = MockBinderState {
            device_count: 1,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            max_power,
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockBinderState>> {
        Arc::clone(&self.state)
    }
}

impl DeviceBinder<MockI2c> for MockBinder {
    fn bind(&mut self, bus: BusRef<MockI2c>, devno: u32) -> Result<BoxedDevice, DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.bind_count += 1;
        if state.simulate_bind_failure {
            return Err(DisplayError::InitializationFailed("Simulated bind failure".to_string()));
        }
        if devno >= state.device_count {
            return Err(DisplayError::NoSuchDevice(devno));
        }
        if !bus.is_live() {
            return Err(DisplayError::BusReleased);
        }
        drop(state);

        Ok(Box::new(MockDevice {
            bus,
            devno,
            power: 0,
            contrast: u8::MAX,
            capabilities: DisplayCapabilities {
                width: 128,
                height: 64,
                color_depth: ColorDepth::Monochrome,
                max_power: self.max_power,
            },
            state: Arc::clone(&self.state),
        }))
    }
}

/// Display device that talks to a [`MockI2c`] through its bus reference
#[derive(Debug)]
pub struct MockDevice {
    bus: BusRef<MockI2c>,
    devno: u32,
    power: u32,
    contrast: u8,
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockBinderState>>,
}

impl LcdDevice for MockDevice {
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
        if self.state.lock().unwrap().simulate_power_failure {
            return Err(DisplayError::Other("Simulated power failure".to_string()));
        }
        let cmd = if level > 0 { 0xAF } else { 0xAE };
        self.bus
            .with_bus(|bus| bus.write(0x3C, &[0x00, cmd]))?
            .map_err(|e| DisplayError::I2cError(format!("{:?}", e)))?;
        self.power = level;
        self.state.lock().unwrap().power_log.push((self.devno, level));
        Ok(())
    }

    fn contrast(&self) -> u8 {
        self.contrast
    }

    fn set_contrast(&mut self, value: u8) -> Result<(), DisplayError> {
        self.contrast = value;
        Ok(())
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.drop_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::bus::BusHandle;

    #[test]
    fn test_mock_provider_acquire() {
        let mut provider = MockBusProvider::new();
        provider.acquire(0).unwrap();
        assert_eq!(provider.state().lock().unwrap().acquire_count, 1);

        provider.state().lock().unwrap().simulate_acquire_failure = true;
        assert!(provider.acquire(0).is_err());
        assert_eq!(provider.state().lock().unwrap().acquire_count, 1);
    }

    #[test]
    fn test_mock_device_power_goes_over_bus() {
        let handle = BusHandle::new(0, MockI2c::default());
        let mut binder = MockBinder::new(1);
        let mut device = binder.bind(handle.downgrade(), 0).unwrap();

        device.set_power(1).unwrap();

        let writes = handle.downgrade().with_bus(|bus| bus.writes.clone()).unwrap();
        assert_eq!(writes, vec![(0x3C, vec![0x00, 0xAF])]);
        assert_eq!(binder.state().lock().unwrap().power_log, vec![(0, 1)]);
    }

    #[test]
    fn test_mock_device_stale_bus() {
        let handle = BusHandle::new(0, MockI2c::default());
        let mut binder = MockBinder::new(1);
        let mut device = binder.bind(handle.downgrade(), 0).unwrap();

        drop(handle);

        assert!(matches!(device.set_power(1), Err(DisplayError::BusReleased)));
        assert_eq!(device.power(), 0);
    }

    #[test]
    fn test_mock_device_drop_counted() {
        let handle = BusHandle::new(0, MockI2c::default());
        let mut binder = MockBinder::new(1);
        let device = binder.bind(handle.downgrade(), 0).unwrap();
        drop(device);
        assert_eq!(binder.state().lock().unwrap().drop_count, 1);
    }
}
