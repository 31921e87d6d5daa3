use crate::core::{Page, RawRecord};
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const DEFAULT_PAGE_CAPACITY: usize = 9;

/// Streams records into fixed-size pages.
///
/// Each record is repeated `copies` times in input order; a page is sealed
/// as soon as it holds `capacity` entries and only the last page may be short.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    capacity: NonZeroUsize,
}

impl Paginator {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn paginate<I>(&self, records: I) -> Vec<Page>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut builder = self.builder();
        for record in records {
            builder.push(record);
        }
        builder.finish()
    }

    /// Incremental form of [`Paginator::paginate`], for callers that pull
    /// records from a fallible source.
    pub fn builder(&self) -> PageBuilder {
        PageBuilder {
            capacity: self.capacity.get(),
            pages: Vec::new(),
            current: Page::with_capacity(self.capacity.get()),
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_PAGE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

pub struct PageBuilder {
    capacity: usize,
    pages: Vec<Page>,
    current: Page,
}

impl PageBuilder {
    pub fn push(&mut self, record: RawRecord) {
        let copies = record.copies();
        if copies == 0 {
            return;
        }

        let record = Arc::new(record);
        for _ in 0..copies {
            self.current.push(Arc::clone(&record));
            if self.current.len() == self.capacity {
                let sealed =
                    std::mem::replace(&mut self.current, Page::with_capacity(self.capacity));
                self.pages.push(sealed);
            }
        }
    }

    pub fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
