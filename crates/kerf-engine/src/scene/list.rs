use super::{DrawCmd, SortKey, ZIndex};

/// A single draw item: sort key + command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
}

/// Recorded pixel-space draw stream for a frame.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame allocation once warmed
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    /// Pushes a draw command with the given z-index.
    #[inline]
    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
        });

        self.sorted_dirty = true;
    }

    /// Iterates items in paint order without cloning draw commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        let items = &self.items;
        self.sorted_indices.sort_by_key(|&i| items[i].key);

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::coords::{Rect, Vec2};
    use crate::paint::Color;
    use crate::text::FontId;

    use super::*;

    #[test]
    fn paint_order_follows_z_then_insertion() {
        let mut list = DrawList::new();
        let font = FontId(0);
        list.push_text(ZIndex::LABEL, "10", font, 12.0, Color::white(), Vec2::zero());
        list.push_rect(ZIndex::PANEL, Rect::new(0.0, 0.0, 5.0, 5.0), Color::black());
        list.push_rect(ZIndex::PANEL, Rect::new(5.0, 0.0, 5.0, 5.0), Color::white());

        let kinds: Vec<_> = list
            .iter_in_paint_order()
            .map(|item| match &item.cmd {
                DrawCmd::Rect(r) => r.rect.origin.x as i32,
                DrawCmd::Text(_) => -1,
            })
            .collect();
        assert_eq!(kinds, vec![0, 5, -1]);
    }

    #[test]
    fn empty_rects_are_not_recorded() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex::PANEL, Rect::new(0.0, 0.0, 0.0, 30.0), Color::white());
        assert!(list.is_empty());
    }

    #[test]
    fn clear_resets_order() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex::PANEL, Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        list.clear();
        list.push_rect(ZIndex::PANEL, Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        assert_eq!(list.items()[0].key.order, 0);
    }
}
