//! Merge trait and the field-level fill helpers shared by every impl

/// Fold `other` into `self` without clobbering what `self` already knows.
pub trait Merge<Rhs: ?Sized = Self> {
    fn merge(&mut self, other: &Rhs);
}

/// Take `other` when `target` is empty.
pub fn fill_string(target: &mut String, other: &str) {
    if target.trim().is_empty() && !other.trim().is_empty() {
        *target = other.to_string();
    }
}

/// Take `other` when `target` is `None` or blank.
pub fn fill_text(target: &mut Option<String>, other: &Option<String>) {
    let missing = target.as_deref().is_none_or(|s| s.trim().is_empty());
    if let Some(value) = other.as_deref().filter(|s| !s.trim().is_empty()) {
        if missing {
            *target = Some(value.to_string());
        }
    }
}

pub fn fill_option<T: Clone>(target: &mut Option<T>, other: &Option<T>) {
    if target.is_none() {
        target.clone_from(other);
    }
}

/// Numbers `<= 0` are unknown.
pub fn fill_positive(target: &mut i32, other: i32) {
    if *target <= 0 && other > 0 {
        *target = other;
    }
}

pub fn fill_nonzero(target: &mut u32, other: u32) {
    if *target == 0 {
        *target = other;
    }
}

/// Like [`fill_positive`] for optional values.
pub fn fill_positive_option(target: &mut Option<i32>, other: Option<i32>) {
    let known = target.is_some_and(|v| v > 0);
    if !known {
        if let Some(value) = other.filter(|v| *v > 0) {
            *target = Some(value);
        }
    }
}

pub fn fill_nonzero_option(target: &mut Option<u64>, other: Option<u64>) {
    let known = target.is_some_and(|v| v > 0);
    if !known {
        if let Some(value) = other.filter(|v| *v > 0) {
            *target = Some(value);
        }
    }
}

/// Append every value of `other` not present in `target`.
pub fn merge_values<T: PartialEq + Clone>(target: &mut Vec<T>, other: &[T]) {
    for value in other {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}

/// Upsert `other` into `target` by key: matching entries are replaced, new ones appended.
pub fn merge_by_key<T, K, F>(target: &mut Vec<T>, other: &[T], key: F)
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    for value in other {
        let k = key(value);
        match target.iter_mut().find(|existing| key(existing) == k) {
            Some(existing) => *existing = value.clone(),
            None => target.push(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_text_treats_blank_as_missing() {
        let mut target = Some("  ".to_string());
        fill_text(&mut target, &Some("HBO".into()));
        assert_eq!(target.as_deref(), Some("HBO"));

        fill_text(&mut target, &Some("AMC".into()));
        assert_eq!(target.as_deref(), Some("HBO"));

        let mut empty = None;
        fill_text(&mut empty, &Some(String::new()));
        assert_eq!(empty, None);
    }

    #[test]
    fn test_fill_positive() {
        let mut n = 0;
        fill_positive(&mut n, -1);
        assert_eq!(n, 0);
        fill_positive(&mut n, 3);
        assert_eq!(n, 3);
        fill_positive(&mut n, 4);
        assert_eq!(n, 3);

        let mut unknown = -1;
        fill_positive(&mut unknown, 2);
        assert_eq!(unknown, 2);
    }

    #[test]
    fn test_merge_by_key_replaces_in_place() {
        let mut target = vec![("a", 1), ("b", 2)];
        merge_by_key(&mut target, &[("b", 5), ("c", 3)], |(k, _)| *k);
        assert_eq!(target, vec![("a", 1), ("b", 5), ("c", 3)]);
    }
}
