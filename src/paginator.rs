/// Split a result list into fixed-size pages.
///
/// The last page may be shorter. A page size of zero yields no pages.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Vec<T>> {
    if page_size == 0 {
        return Vec::new();
    }
    items.chunks(page_size).map(<[T]>::to_vec).collect()
}
