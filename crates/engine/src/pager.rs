//! Stable page extraction without a full sort.
//!
//! [`page_stable`] returns exactly the `[offset, offset + limit)` slice a
//! full stable sort would produce, in expected O(n) time. Only one page is
//! ever needed per request, so ordering the rest of the collection is
//! wasted work.
//!
//! The comparator is a strict `less` relation. Elements that compare
//! neither-less-than each other are tied and keep their original relative
//! order in the output, matching stable-sort semantics exactly.

use std::cmp::Ordering;

/// Return the `[offset, offset + limit)` page of `items` under `less`,
/// equal to the same slice of a full stable sort.
///
/// Out-of-range requests degrade the way slicing does: an offset at or
/// past the end yields an empty page, and a page that runs past the end is
/// truncated.
#[must_use]
pub fn page_stable<T, F>(items: &[T], less: F, offset: usize, limit: usize) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let n = items.len();
    if limit == 0 || offset >= n {
        return Vec::new();
    }
    let end = offset.saturating_add(limit).min(n);

    // Work on positions so element moves are cheap and the original
    // position stays available for tie-breaking.
    let mut order: Vec<usize> = (0..n).collect();

    // Two quickselect passes put the boundary elements of the page at
    // their final ranks. Selecting the upper rank first means the second
    // pass can stay inside [0, end) without disturbing it.
    quickselect(&mut order, items, &less, end - 1);
    if offset < end - 1 {
        quickselect(&mut order[..end - 1], items, &less, offset);
    }
    let low = order[offset];
    let high = order[end - 1];

    // The selections placed ranks, not ties: elements tied with either
    // boundary value may sit anywhere in the outer partitions, and those
    // ties must be resolved by original position, not by where the
    // partitioning happened to leave them. One pass over the collection
    // absorbs every element between the boundary values inclusive of ties,
    // and counts how many ranks sit strictly below the block.
    let mut below = 0usize;
    let mut block: Vec<usize> = Vec::new();
    for (pos, item) in items.iter().enumerate() {
        if less(item, &items[low]) {
            below += 1;
        } else if !less(&items[high], item) {
            block.push(pos);
        }
    }

    // The block is small (the page plus boundary ties), so sorting it is
    // cheap regardless of collection size. Built in scan order, a stable
    // sort on `less` alone keeps ties in original-position order.
    block.sort_by(|&a, &b| {
        if less(&items[a], &items[b]) {
            Ordering::Less
        } else if less(&items[b], &items[a]) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });

    // Element j of the sorted block has global rank `below + j`; trim to
    // the ranks the caller asked for.
    let start = offset - below;
    block[start..start + (end - offset)]
        .iter()
        .map(|&pos| items[pos].clone())
        .collect()
}

/// Move the element of rank `k` (under `less`) to `order[k]`, partitioning
/// the rest of `order` around it.
fn quickselect<T, F>(order: &mut [usize], items: &[T], less: &F, k: usize)
where
    F: Fn(&T, &T) -> bool,
{
    let mut lo = 0;
    let mut hi = order.len() - 1;
    while lo < hi {
        let p = partition(order, items, less, lo, hi);
        if k <= p {
            hi = p;
        } else {
            lo = p + 1;
        }
    }
}

/// Hoare partition with the middle element as pivot. Returns `p` such that
/// every element of `order[lo..=p]` is <= every element of
/// `order[p + 1..=hi]`, with `lo <= p < hi`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn partition<T, F>(order: &mut [usize], items: &[T], less: &F, lo: usize, hi: usize) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    // `pivot` is the element's position in `items`, so swaps inside
    // `order` cannot move the pivot value out from under the comparisons.
    let pivot = order[lo + (hi - lo) / 2];
    // Sentinel cursors one step outside the range.
    let mut i = lo as isize - 1;
    let mut j = hi as isize + 1;
    loop {
        loop {
            i += 1;
            if !less(&items[order[i as usize]], &items[pivot]) {
                break;
            }
        }
        loop {
            j -= 1;
            if !less(&items[pivot], &items[order[j as usize]]) {
                break;
            }
        }
        if i >= j {
            return j as usize;
        }
        order.swap(i as usize, j as usize);
    }
}
