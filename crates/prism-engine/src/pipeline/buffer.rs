use bytemuck::Pod;

/// Read-only view over a typed vertex or instance array.
///
/// The stride is the size of the element type the buffer was created from.
#[derive(Debug, Copy, Clone)]
pub struct VertexBuffer<'a> {
    bytes: &'a [u8],
    stride: usize,
}

impl<'a> VertexBuffer<'a> {
    pub fn new<T: Pod>(records: &'a [T]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(records),
            stride: size_of::<T>(),
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of whole records.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len().checked_div(self.stride).unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of record `index`.
    #[inline]
    pub fn record(&self, index: usize) -> Option<&'a [u8]> {
        let start = index.checked_mul(self.stride)?;
        self.bytes.get(start..start + self.stride)
    }
}

/// 32-bit index list.
#[derive(Debug, Copy, Clone)]
pub struct IndexBuffer<'a> {
    indices: &'a [u32],
}

impl<'a> IndexBuffer<'a> {
    pub fn new(indices: &'a [u32]) -> Self {
        Self { indices }
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u32] {
        self.indices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_and_len_follow_element_type() {
        let data = [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let buf = VertexBuffer::new(&data);
        assert_eq!(buf.stride(), 12);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn record_slices_one_element() {
        let data = [1u32, 2, 3];
        let buf = VertexBuffer::new(&data);
        assert_eq!(buf.record(1), Some(&2u32.to_ne_bytes()[..]));
        assert_eq!(buf.record(3), None);
    }
}
