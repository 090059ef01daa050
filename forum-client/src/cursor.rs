use crate::{api::Cursor, Error};

/// Cursor history of a paginated top-level listing.
///
/// `history[i]` is the cursor that was sent to fetch page `i`, so
/// `history[0]` is always `None`. Cursors mean "after this point", which is
/// why going back re-requests with the previous page's own cursor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageCursorStore {
    history: Vec<Option<Cursor>>,
    current_index: usize,

    // continuation of the page currently shown
    next_cursor: Option<Cursor>,
    has_more: bool,
}

impl Default for PageCursorStore {
    fn default() -> PageCursorStore {
        PageCursorStore::new()
    }
}

impl PageCursorStore {
    pub fn new() -> PageCursorStore {
        PageCursorStore {
            history: vec![None],
            current_index: 0,
            next_cursor: None,
            has_more: false,
        }
    }

    pub fn history(&self) -> &[Option<Cursor>] {
        &self.history
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based number of the current page
    pub fn page_number(&self) -> usize {
        self.current_index + 1
    }

    /// Cursor that fetched the current page
    pub fn current_cursor(&self) -> Option<&Cursor> {
        self.history[self.current_index].as_ref()
    }

    /// Cursor to send for the page after the current one
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    /// Cursor that `retreat` would re-request with, if going back is possible
    pub fn previous_cursor(&self) -> Option<Option<&Cursor>> {
        match self.can_go_back() {
            true => Some(self.history[self.current_index - 1].as_ref()),
            false => None,
        }
    }

    /// Records that the page fetched with `used` is now shown, along with
    /// the continuation the server returned for it.
    pub fn advance(&mut self, used: Option<Cursor>, next: Option<Cursor>, has_more: bool) {
        let slot = self.current_index + 1;
        if self.history.get(slot) != Some(&used) {
            self.history.truncate(slot);
            self.history.push(used);
        }
        self.current_index = slot;
        self.record(next, has_more);
    }

    /// Steps back one page, keeping the forward history. Returns the cursor
    /// to re-request the now-current page with.
    pub fn retreat(&mut self) -> Result<Option<Cursor>, Error> {
        if !self.can_go_back() {
            return Err(Error::NoPreviousPage);
        }
        self.current_index -= 1;
        // the continuation is only known again once the page is re-fetched
        self.next_cursor = self.history.get(self.current_index + 1).cloned().flatten();
        self.has_more = self.next_cursor.is_some();
        Ok(self.history[self.current_index].clone())
    }

    /// Updates the continuation of the current page after (re-)fetching it.
    /// A page that claims more results without a cursor ends the listing.
    pub fn record(&mut self, next: Option<Cursor>, has_more: bool) {
        self.has_more = has_more && next.is_some();
        self.next_cursor = match self.has_more {
            true => next,
            false => None,
        };
    }

    pub fn reset(&mut self) {
        *self = PageCursorStore::new();
    }
}
