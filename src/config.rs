//! Global configuration options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the nclayout crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Convert Char
///  > default: [`true`]
///
/// If enabled, [`DataType::Char`](crate::data_type::DataType::Char) data is widened to [`char`] after it is read.
/// Otherwise it is returned as bytes.
///
/// ## Validate Byte Ranges
///  > default: [`true`]
///
/// If enabled, the byte range of every chunk is checked against the size of the storage before it is read or written.
/// A chunk outside of the storage is an error rather than a short read.
///
/// ## Bit Reader Buffer Size
///  > default: `4096`
///
/// The number of bytes a [`BitReader`](crate::bit_reader::BitReader) fetches from its storage at a time.
#[derive(Debug)]
pub struct Config {
    convert_char: bool,
    validate_byte_ranges: bool,
    bit_reader_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            convert_char: true,
            validate_byte_ranges: true,
            bit_reader_buffer_size: 4096,
        }
    }
}

impl Config {
    /// Get the [convert char](#convert-char) configuration.
    #[must_use]
    pub fn convert_char(&self) -> bool {
        self.convert_char
    }

    /// Set the [convert char](#convert-char) configuration.
    pub fn set_convert_char(&mut self, convert_char: bool) {
        self.convert_char = convert_char;
    }

    /// Get the [validate byte ranges](#validate-byte-ranges) configuration.
    #[must_use]
    pub fn validate_byte_ranges(&self) -> bool {
        self.validate_byte_ranges
    }

    /// Set the [validate byte ranges](#validate-byte-ranges) configuration.
    pub fn set_validate_byte_ranges(&mut self, validate_byte_ranges: bool) {
        self.validate_byte_ranges = validate_byte_ranges;
    }

    /// Get the [bit reader buffer size](#bit-reader-buffer-size) configuration.
    #[must_use]
    pub fn bit_reader_buffer_size(&self) -> usize {
        self.bit_reader_buffer_size
    }

    /// Set the [bit reader buffer size](#bit-reader-buffer-size) configuration.
    ///
    /// A size of zero is treated as one.
    pub fn set_bit_reader_buffer_size(&mut self, bit_reader_buffer_size: usize) {
        self.bit_reader_buffer_size = bit_reader_buffer_size.max(1);
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global nclayout configuration.
///
/// This might deadlock if the global config is already mutably held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global nclayout configuration.
///
/// This might deadlock if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}
