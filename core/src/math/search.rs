/// Position of a target key relative to a sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Empty,
    /// Strictly before the first key.
    Below,
    /// Strictly after the last key.
    Above,
    Exact(usize),
    /// Tightest pair `(before, after)` with `key(before) < target < key(after)`.
    Between(usize, usize),
}

/// Binary search over `items` sorted ascending by `key`.
///
/// When several items share the target key, the last of them is reported as the exact match.
pub fn bracket<T, K, F>(items: &[T], target: K, key: F) -> Bracket
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    if items.is_empty() {
        return Bracket::Empty;
    }

    let upper = items.partition_point(|item| key(item) <= target);
    if upper == 0 {
        return Bracket::Below;
    }

    let lower = upper - 1;
    if key(&items[lower]) == target {
        Bracket::Exact(lower)
    } else if upper == items.len() {
        Bracket::Above
    } else {
        Bracket::Between(lower, upper)
    }
}
