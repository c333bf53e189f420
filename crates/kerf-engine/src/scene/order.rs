/// Z-ordering key for draw items.
///
/// Higher values appear on top of lower values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZIndex(pub i32);

impl ZIndex {
    /// Panel backgrounds (ruler strips).
    pub const PANEL: ZIndex = ZIndex(0);
    /// Text drawn over panels.
    pub const LABEL: ZIndex = ZIndex(10);

    #[inline]
    pub const fn new(v: i32) -> Self {
        Self(v)
    }
}

/// Stable sort key for draw items.
///
/// Derived ordering compares `z` first, then insertion `order`, so items on the
/// same layer keep the order they were pushed in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey {
    pub z: ZIndex,
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(z: ZIndex, order: u32) -> Self {
        Self { z, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_dominates_insertion_order() {
        let back = SortKey::new(ZIndex::PANEL, 7);
        let front = SortKey::new(ZIndex::LABEL, 0);
        assert!(back < front);
        assert!(SortKey::new(ZIndex::PANEL, 1) < SortKey::new(ZIndex::PANEL, 2));
    }
}
