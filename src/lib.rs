//! A rust library for planning and performing reads of sections of multidimensional arrays from their physical storage layouts.
//!
//! The library addresses the layouts used by scientific data formats such as netCDF-3, HDF5 and GRIB.
//! A reader supplies the shape of a variable, the wanted [`Section`](section::Section) and the parameters of its physical layout.
//! A [layout](layout) then yields chunks, each a run of elements that is contiguous in both storage and the destination array.
//!
//! ## Getting Started
//! - [`chunker::IndexChunker`] plans the chunks of a section of a contiguous row-major array.
//! - [`chunker::IndexChunkerTiled`] plans the chunks of the intersection of a section with a tile.
//! - [`layout`] maps chunks to byte positions in regular, record segmented, segmented and tiled layouts.
//! - [`iosp`] transfers typed data between [`storage`] and primitive arrays by draining a layout.
//! - [`bit_reader::BitReader`] reads bit-packed fields.
//!
//! ## Example
//! ```rust
//! # use nclayout::{data_type::{DataType, Endianness}, iosp::{read_data_fill, PrimitiveArray}, layout::LayoutRegular, section::SectionSpec};
//! // A 4x3 array of big endian 32-bit integers at byte 16
//! let mut bytes = vec![0u8; 16];
//! for value in 0..12i32 {
//!     bytes.extend(value.to_be_bytes());
//! }
//!
//! // Read the middle column
//! let want: SectionSpec = "(:,1)".parse()?;
//! let mut layout = LayoutRegular::new(16, 4, &[4, 3], &want.fill(&[4, 3])?)?;
//! let data = read_data_fill(&bytes, &mut layout, DataType::Int, None, Endianness::Big)?;
//! assert_eq!(data, PrimitiveArray::Int(vec![1, 4, 7, 10]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Licence
//! `nclayout` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
// #![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]

pub mod bit_reader;
pub mod byte_range;
pub mod chunker;
pub mod config;
pub mod data_type;
pub mod iosp;
pub mod layout;
pub mod section;
pub mod storage;
