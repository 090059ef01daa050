use crate::api::{Sort, SortDirection, SortField};

/// Session-scoped user preferences that outlive a single thread view
pub trait Preferences {
    fn load_sort(&self) -> Option<Sort>;
    fn store_sort(&mut self, sort: Sort) -> anyhow::Result<()>;
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryPreferences {
    pub sort: Option<Sort>,
}

impl Preferences for MemoryPreferences {
    fn load_sort(&self) -> Option<Sort> {
        self.sort
    }

    fn store_sort(&mut self, sort: Sort) -> anyhow::Result<()> {
        self.sort = Some(sort);
        Ok(())
    }
}

/// Owns the active sort of a thread view and persists every change.
#[derive(Debug)]
pub struct SortController<P> {
    prefs: P,
    current: Sort,
}

impl<P: Preferences> SortController<P> {
    /// Starts from the last stored sort, or `Sort::default()`
    pub fn new(prefs: P) -> SortController<P> {
        let current = prefs.load_sort().unwrap_or_default();
        SortController { prefs, current }
    }

    pub fn current(&self) -> Sort {
        self.current
    }

    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    /// Selecting the active field flips the direction, selecting another
    /// field starts it in descending order.
    pub fn toggled(&self, field: SortField) -> Sort {
        match field == self.current.field {
            true => Sort {
                field,
                direction: self.current.direction.flip(),
            },
            false => Sort {
                field,
                direction: SortDirection::Desc,
            },
        }
    }

    /// Applies `toggled(field)` and returns the new sort
    pub fn select(&mut self, field: SortField) -> Sort {
        let next = self.toggled(field);
        self.set(next);
        next
    }

    /// Returns whether the sort changed
    pub fn set(&mut self, sort: Sort) -> bool {
        if sort == self.current {
            return false;
        }
        self.current = sort;
        if let Err(err) = self.prefs.store_sort(sort) {
            tracing::error!(?err, ?sort, "failed persisting sort preference");
        }
        true
    }
}
