//! Paged windows over DAW collections
//!
//! A [`Bank`] is a fixed-size window (the page) sliding over a larger ordered
//! collection of tracks, sends, scenes or parameter pages:
//!
//! ```text
//! items:   0 1 2 3 4 5 6 7 8 9 10 11 12
//!                  [4 5 6 7]              page_size 4, position 4
//! ```
//!
//! Paging moves by whole pages and lands on page boundaries; scrolling moves
//! by one item. What happens at the ends (wrap to the start, stay put) is
//! decided by the caller through [`Overflow`], because different controls
//! want different behaviour.

/// Fallback when a page move would run past either end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Stay on the current page
    Clamp,
    /// Jump to the opposite end
    Wrap,
}

/// Paged window over an ordered collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    page_size: usize,
    position: usize,
    item_count: usize,
}

impl Bank {
    /// Create an empty bank
    ///
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            position: 0,
            item_count: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn scroll_position(&self) -> usize {
        self.position
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Update the size of the underlying collection
    ///
    /// Keeps the position inside the collection: if it now points past the
    /// end, it moves to the start of the last page.
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
        if count == 0 {
            self.position = 0;
        } else if self.position >= count {
            self.position = self.last_page_start();
        }
    }

    pub fn can_scroll_page_forwards(&self) -> bool {
        self.position + self.page_size < self.item_count
    }

    pub fn can_scroll_page_backwards(&self) -> bool {
        self.position > 0
    }

    /// Move forward by one page, onto a page boundary
    ///
    /// Returns false (and does nothing) at the end.
    pub fn select_next_page(&mut self) -> bool {
        if !self.can_scroll_page_forwards() {
            return false;
        }
        self.position = (self.position / self.page_size + 1) * self.page_size;
        true
    }

    /// Move back by one page, onto a page boundary
    ///
    /// From a position between boundaries this lands on the boundary below.
    pub fn select_previous_page(&mut self) -> bool {
        if !self.can_scroll_page_backwards() {
            return false;
        }
        let pages_before = self.position.div_ceil(self.page_size);
        self.position = (pages_before - 1) * self.page_size;
        true
    }

    /// Page forward, applying `overflow` at the end
    pub fn next_page(&mut self, overflow: Overflow) -> bool {
        if self.select_next_page() {
            return true;
        }
        match overflow {
            Overflow::Clamp => false,
            Overflow::Wrap => {
                let moved = self.position != 0;
                self.position = 0;
                moved
            }
        }
    }

    /// Page backward, applying `overflow` at the start
    pub fn previous_page(&mut self, overflow: Overflow) -> bool {
        if self.select_previous_page() {
            return true;
        }
        match overflow {
            Overflow::Clamp => false,
            Overflow::Wrap => {
                let last = self.last_page_start();
                let moved = self.position != last;
                self.position = last;
                moved
            }
        }
    }

    /// Scroll by a single item (no page rounding)
    pub fn scroll_forwards(&mut self) -> bool {
        if !self.can_scroll_page_forwards() {
            return false;
        }
        self.position += 1;
        true
    }

    pub fn scroll_backwards(&mut self) -> bool {
        if !self.can_scroll_page_backwards() {
            return false;
        }
        self.position -= 1;
        true
    }

    /// Jump directly to a position, clamped into the collection
    pub fn scroll_to(&mut self, position: usize) {
        self.position = position.min(self.item_count.saturating_sub(1));
    }

    /// Start of the last full or partial page
    pub fn last_page_start(&self) -> usize {
        if self.item_count == 0 {
            0
        } else {
            (self.item_count - 1) / self.page_size * self.page_size
        }
    }

    /// Map a slot in the window to an absolute collection index
    ///
    /// `None` if the slot is outside the page or past the end of the collection.
    pub fn absolute(&self, slot: usize) -> Option<usize> {
        if slot >= self.page_size {
            return None;
        }
        let index = self.position + slot;
        (index < self.item_count).then_some(index)
    }

    /// Map an absolute collection index to its slot in the window
    pub fn slot_of(&self, index: usize) -> Option<usize> {
        if index < self.position || index >= self.item_count {
            return None;
        }
        let slot = index - self.position;
        (slot < self.page_size).then_some(slot)
    }

    /// Scroll the minimum amount needed to bring `index` into the window
    pub fn reveal(&mut self, index: usize) {
        if index >= self.item_count {
            return;
        }
        if index < self.position {
            self.position = index;
        } else if index >= self.position + self.page_size {
            self.position = index + 1 - self.page_size;
        }
    }
}

/// Every bank the engine pages over
#[derive(Debug, Clone)]
pub struct Banks {
    /// Tracks shown on the track-select row and the session grid columns
    pub tracks: Bank,
    /// Scenes shown as session grid rows
    pub scenes: Bank,
    /// Sends shown on the send half of the mode menu
    pub sends: Bank,
    /// Devices of the selected track
    pub devices: Bank,
    /// Parameter pages of the cursor device
    pub parameter_pages: Bank,
    /// Send slots show the second half of an eight-send window (Shift toggle)
    pub sends_toggled: bool,
}

/// Sends visible at once on the mode menu
pub const SEND_PAGE_SIZE: usize = 4;

impl Default for Banks {
    fn default() -> Self {
        Self {
            tracks: Bank::new(8),
            scenes: Bank::new(8),
            sends: Bank::new(SEND_PAGE_SIZE),
            devices: Bank::new(8),
            parameter_pages: Bank::new(8),
            sends_toggled: false,
        }
    }
}

impl Banks {
    /// Refresh every collection size from the model
    pub fn sync(&mut self, daw: &dyn crate::model::DawModel) {
        self.tracks.set_item_count(daw.track_count());
        self.scenes.set_item_count(daw.scene_count());
        self.sends.set_item_count(daw.send_count());
        self.devices.set_item_count(daw.device_count());
        self.parameter_pages.set_item_count(daw.parameter_page_count());
    }

    /// Absolute send index behind send slot `slot` (0-3), if that send exists
    pub fn send_index(&self, slot: usize) -> Option<usize> {
        if slot >= SEND_PAGE_SIZE {
            return None;
        }
        let offset = if self.sends_toggled { SEND_PAGE_SIZE } else { 0 };
        let index = self.sends.scroll_position() + offset + slot;
        (index < self.sends.item_count()).then_some(index)
    }
}
