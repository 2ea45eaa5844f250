//! Small collection helpers

use std::collections::BTreeSet;

/// Every combination that picks one element from each input collection.
///
/// Combinations are sets, so picking the same element twice collapses it.
/// No input collections yields no combinations.
pub fn cartesian_product<T, I>(collections: impl IntoIterator<Item = I>) -> BTreeSet<BTreeSet<T>>
where
    I: IntoIterator<Item = T>,
    T: Ord + Clone,
{
    let mut collections = collections.into_iter();
    let Some(first) = collections.next() else {
        return BTreeSet::new();
    };

    let seed: Vec<BTreeSet<T>> = first.into_iter().map(|x| BTreeSet::from([x])).collect();
    collections
        .fold(seed, |acc, items| {
            let items: Vec<T> = items.into_iter().collect();
            acc.iter()
                .flat_map(|combination| {
                    items.iter().map(move |item| {
                        let mut next = combination.clone();
                        next.insert(item.clone());
                        next
                    })
                })
                .collect()
        })
        .into_iter()
        .collect()
}

/// The larger of two optional values; a missing side is ignored.
pub fn max_opt<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b > a { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}
