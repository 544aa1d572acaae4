/*
 *  display/error.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for display bring-up
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

use std::fmt;
use std::error::Error;

/// Errors raised by the bus transport and display driver layers
#[derive(Debug)]
pub enum DisplayError {
    /// No bus transport has been acquired yet
    BusNotInitialized,

    /// The bus a device referenced has been released
    BusReleased,

    /// I2C communication error
    I2cError(String),

    /// Controller init sequence failed (panel not responding)
    InitializationFailed(String),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Power level outside 0..=max
    InvalidPower { requested: u32, max: u32 },

    /// No device configured under this number
    NoSuchDevice(u32),

    /// Display interface error
    InterfaceError(display_interface::DisplayError),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::BusNotInitialized =>
                write!(f, "Bus transport not initialized"),
            DisplayError::BusReleased =>
                write!(f, "Bus transport has been released"),
            DisplayError::I2cError(msg) =>
                write!(f, "I2C communication error: {}", msg),
            DisplayError::InitializationFailed(msg) =>
                write!(f, "Display initialization failed: {}", msg),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::InvalidPower { requested, max } =>
                write!(f, "Invalid power level: {} (must be 0..={})", requested, max),
            DisplayError::NoSuchDevice(devno) =>
                write!(f, "No display configured as device {}", devno),
            DisplayError::InterfaceError(err) =>
                write!(f, "Display interface error: {:?}", err),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {
    // display_interface::DisplayError doesn't implement std::error::Error
    // so we can't provide it as a source
}

impl From<display_interface::DisplayError> for DisplayError {
    fn from(err: display_interface::DisplayError) -> Self {
        DisplayError::InterfaceError(err)
    }
}

/// Errors surfaced by the bring-up lifecycle.
///
/// The lower layer's error is carried untouched as the source; this layer
/// only attaches the bus index and device number.
#[derive(Debug, thiserror::Error)]
pub enum BringupError {
    #[error("no bus transport on I2C bus {bus}: {source}")]
    DeviceNotFound {
        bus: u32,
        #[source]
        source: DisplayError,
    },

    #[error("failed to bind I2C bus {bus} to display {devno}: {source}")]
    BindFailed {
        bus: u32,
        devno: u32,
        #[source]
        source: DisplayError,
    },
}

impl BringupError {
    /// The lower-layer error that caused this failure
    pub fn cause(&self) -> &DisplayError {
        match self {
            BringupError::DeviceNotFound { source, .. } => source,
            BringupError::BindFailed { source, .. } => source,
        }
    }
}
