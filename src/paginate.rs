//! Fixed-size pages over a filtered record set.

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Up to `batch_size` records starting at `page_index * batch_size`.
///
/// Pages past the end are empty rather than an error.
pub fn page<T>(records: &[T], page_index: usize, batch_size: usize) -> &[T] {
    let Some(start) = page_index.checked_mul(batch_size) else {
        return &[];
    };
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(batch_size).min(records.len());
    &records[start..end]
}

/// Walks a record set one page at a time.
#[derive(Debug)]
pub struct Paginator<'a, T> {
    records: &'a [T],
    batch_size: usize,
    next_page: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(records: &'a [T]) -> Self {
        Self::with_batch_size(records, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(records: &'a [T], batch_size: usize) -> Self {
        Self {
            records,
            batch_size: batch_size.max(1),
            next_page: 0,
        }
    }

    /// Zero-based index of the page the next call to [`Paginator::next_page`] returns.
    pub fn page_index(&self) -> usize {
        self.next_page
    }

    pub fn has_more(&self) -> bool {
        self.next_page.saturating_mul(self.batch_size) < self.records.len()
    }

    pub fn next_page(&mut self) -> &'a [T] {
        let batch = page(self.records, self.next_page, self.batch_size);
        self.next_page += 1;
        batch
    }
}
