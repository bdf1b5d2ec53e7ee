use crate::{
    layout::Layout,
    section::SizeOverflowError,
    storage::{ReadableStorageTraits, StorageError},
};

use super::{dest_range, PrimitiveArray, TransferError};

/// Resolves heap references of variable length elements to their bytes.
///
/// Variable length strings are stored as fixed size references into a heap elsewhere in the file.
/// The format reader that owns the heap implements this trait.
pub trait HeapResolver {
    /// Return the bytes referenced by `reference`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the reference is invalid or the heap cannot be read.
    fn resolve(&mut self, reference: &[u8]) -> Result<Vec<u8>, StorageError>;
}

impl<F> HeapResolver for F
where
    F: FnMut(&[u8]) -> Result<Vec<u8>, StorageError>,
{
    fn resolve(&mut self, reference: &[u8]) -> Result<Vec<u8>, StorageError> {
        self(reference)
    }
}

/// Read variable length strings from the wanted section of a variable.
///
/// Every element of the layout is a heap reference of [`Layout::element_size`] bytes, which is resolved one element at a time.
/// Resolved bytes are decoded as UTF-8, replacing invalid sequences.
/// Elements not covered by the layout are set to `fill_value` (or empty).
///
/// # Errors
/// Returns a [`TransferError`] on a layout or storage error, or if a reference cannot be resolved.
pub fn read_strings<S, L, R>(
    source: &S,
    layout: &mut L,
    resolver: &mut R,
    fill_value: Option<&str>,
) -> Result<PrimitiveArray, TransferError>
where
    S: ReadableStorageTraits + ?Sized,
    L: Layout + ?Sized,
    R: HeapResolver + ?Sized,
{
    let size = usize::try_from(layout.total_elements())
        .map_err(|_| SizeOverflowError)?;
    let mut strings = vec![fill_value.unwrap_or_default().to_string(); size];
    let ref_size = usize::try_from(layout.element_size())
        .map_err(|_| SizeOverflowError)?;
    let mut reference = vec![0; ref_size];
    while layout.has_next()? {
        let chunk = layout.next_chunk()?;
        let range = dest_range(chunk.dest_elem, chunk.num_elements, 1, strings.len())?;
        let mut pos = chunk.src_pos;
        for string in &mut strings[range] {
            source.read_checked(pos, &mut reference)?;
            let bytes = resolver.resolve(&reference)?;
            *string = String::from_utf8_lossy(&bytes).into_owned();
            pos += ref_size as u64;
        }
    }
    tracing::trace!("resolved {size} strings");
    Ok(PrimitiveArray::String(strings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{layout::LayoutRegular, section::Section};

    #[test]
    fn read_strings_heap() {
        // references are 4 byte big endian indexes into a heap of names
        let heap = ["alpha", "beta", "gamma", "delta"];
        let storage: Vec<u8> = [3u32, 2, 1, 0]
            .iter()
            .flat_map(|i| i.to_be_bytes())
            .collect();
        let mut resolver = |reference: &[u8]| -> Result<Vec<u8>, StorageError> {
            let index = u32::from_be_bytes(reference.try_into().unwrap()) as usize;
            heap.get(index)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| StorageError::from("invalid heap reference"))
        };
        let want = Section::new_with_origin_shape(&[1], &[3]).unwrap();
        let mut layout = LayoutRegular::new(0, 4, &[4], &want).unwrap();
        let strings = read_strings(&storage, &mut layout, &mut resolver, None).unwrap();
        assert_eq!(
            strings,
            PrimitiveArray::from(vec![
                "gamma".to_string(),
                "beta".to_string(),
                "alpha".to_string()
            ])
        );

        let storage: Vec<u8> = 9u32.to_be_bytes().to_vec();
        let want = Section::new_with_shape(&[1]);
        let mut layout = LayoutRegular::new(0, 4, &[1], &want).unwrap();
        assert!(matches!(
            read_strings(&storage, &mut layout, &mut resolver, Some("-")),
            Err(TransferError::StorageError(StorageError::Other(_)))
        ));
    }
}
