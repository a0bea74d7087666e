//! Linear merge over two sorted, de-duplicated slices.

/// Which side of the merge a value was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetSide<T> {
    OnlyLeft(T),
    OnlyRight(T),
    Both(T),
}

/// Visits the union of `left` and `right` in ascending order, tagging each
/// value with the side(s) it came from. Both inputs must be sorted and free of
/// duplicates.
pub fn visit_set_difference<T, F>(left: &[T], right: &[T], mut visit: F)
where
    T: Ord + Copy,
    F: FnMut(SetSide<T>),
{
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        let (l, r) = (left[i], right[j]);
        match l.cmp(&r) {
            std::cmp::Ordering::Less => {
                visit(SetSide::OnlyLeft(l));
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                visit(SetSide::OnlyRight(r));
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                visit(SetSide::Both(l));
                i += 1;
                j += 1;
            }
        }
    }
    left[i..].iter().for_each(|&l| visit(SetSide::OnlyLeft(l)));
    right[j..].iter().for_each(|&r| visit(SetSide::OnlyRight(r)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut seen = Vec::new();
        visit_set_difference(&[1, 2, 5], &[2, 3, 6, 7], |side| seen.push(side));
        assert_eq!(
            seen,
            vec![
                SetSide::OnlyLeft(1),
                SetSide::Both(2),
                SetSide::OnlyRight(3),
                SetSide::OnlyLeft(5),
                SetSide::OnlyRight(6),
                SetSide::OnlyRight(7),
            ]
        );
    }
}
