use derive_more::Display;

/// The byte order of multi-byte elements in storage, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,

    /// Big endian.
    #[display("big")]
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

impl Default for Endianness {
    /// Big endian, the byte order of classic netCDF and GRIB.
    fn default() -> Self {
        Self::Big
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Reverse the byte order of each `element_size` byte element of `bytes`.
pub(crate) fn reverse_endianness(bytes: &mut [u8], element_size: usize) {
    if element_size > 1 {
        bytes
            .chunks_exact_mut(element_size)
            .for_each(<[u8]>::reverse);
    }
}
