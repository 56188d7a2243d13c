use tracing::debug;

use crate::{
    error::{Error, Result},
    store::{Document, DocumentStoreClient},
};

/// Batch size for page listings. A store tuning knob, not a correctness
/// parameter.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Enumerates every page of a space through the store's paginated listing.
pub struct DocumentPaginator<'a, C: ?Sized> {
    client: &'a C,
    page_size: usize,
}

impl<'a, C: DocumentStoreClient + ?Sized> DocumentPaginator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch batches sequentially until one comes back empty or short.
    ///
    /// Any failure discards what was collected so far: callers never score
    /// against a partial space.
    pub fn list_all(&self, space_key: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut start = 0;

        loop {
            let batch = self
                .client
                .list_page(space_key, start, self.page_size)
                .map_err(|e| Error::listing_failed(space_key, e))?;
            let batch_len = batch.len();
            documents.extend(batch);

            if batch_len < self.page_size {
                break;
            }
            start += self.page_size;
        }

        debug!(space = space_key, count = documents.len(), "listed pages");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::StubStore;

    fn titles(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Page {i}")).collect()
    }

    fn store_with(n: usize) -> StubStore {
        let names = titles(n);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        StubStore::with_titles(&refs)
    }

    #[test]
    fn empty_space() {
        let store = StubStore::default();
        let docs = DocumentPaginator::new(&store).list_all("ENG").unwrap();
        assert!(docs.is_empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[test]
    fn short_page_stops_enumeration() {
        let store = store_with(5);
        let docs = DocumentPaginator::new(&store)
            .with_page_size(2)
            .list_all("ENG")
            .unwrap();
        assert_eq!(docs.len(), 5);
        // [0,2) [2,4) [4,5)
        assert_eq!(store.list_calls(), 3);
    }

    #[test]
    fn exact_multiple_needs_one_empty_fetch() {
        let store = store_with(4);
        let docs = DocumentPaginator::new(&store)
            .with_page_size(2)
            .list_all("ENG")
            .unwrap();
        assert_eq!(docs.len(), 4);
        assert_eq!(store.list_calls(), 3);
    }

    #[test]
    fn preserves_store_order() {
        let store = store_with(7);
        let docs = DocumentPaginator::new(&store)
            .with_page_size(3)
            .list_all("ENG")
            .unwrap();
        let got: Vec<_> = docs.iter().map(|d| d.title.clone()).collect();
        assert_eq!(got, titles(7));
    }

    #[test]
    fn failure_mid_enumeration_discards_everything() {
        let mut store = store_with(10);
        store.fail_listing_after = Some(2);
        let err = DocumentPaginator::new(&store)
            .with_page_size(3)
            .list_all("ENG")
            .unwrap_err();
        match err {
            Error::ListingFailed { space, .. } => assert_eq!(space, "ENG"),
            other => panic!("expected ListingFailed, got {other:?}"),
        }
        assert_eq!(store.list_calls(), 3);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let store = store_with(3);
        let docs = DocumentPaginator::new(&store)
            .with_page_size(0)
            .list_all("ENG")
            .unwrap();
        assert_eq!(docs.len(), 3);
    }
}
