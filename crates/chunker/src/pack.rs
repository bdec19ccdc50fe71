//! Greedy size-bounded packing.
//!
//! All three accumulation passes (class attributes, method groups, final
//! record batches) are the same fold: walk an ordered sequence left to
//! right, flush the open group when the next item would overflow the
//! budget. Isolating it here lets the packing behavior be tested without
//! parsing any real source.

/// When an open group is considered full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowRule {
    /// Flush when adding the next item would go strictly over the budget.
    /// Used for attribute and method grouping.
    Exceed,
    /// Flush when adding the next item would reach or exceed the budget.
    /// Used for final batch packing.
    Reach,
}

/// Pack an ordered sequence into groups whose summed sizes respect the
/// budget under the given rule.
///
/// A single item larger than the budget still forms its own group: logical
/// units are never subdivided here, only grouped.
pub fn pack_by_size<T>(
    items: impl IntoIterator<Item = T>,
    budget: usize,
    size: impl Fn(&T) -> usize,
    rule: OverflowRule,
) -> Vec<Vec<T>> {
    let mut groups = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_size = 0usize;

    for item in items {
        let item_size = size(&item);
        let overflows = match rule {
            OverflowRule::Exceed => current_size + item_size > budget,
            OverflowRule::Reach => current_size + item_size >= budget,
        };
        if overflows && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            current_size = 0;
        }
        current_size += item_size;
        current.push(item);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sizes(groups: &[Vec<usize>]) -> Vec<Vec<usize>> {
        groups.to_vec()
    }

    #[test]
    fn packs_under_budget_into_one_group() {
        let groups = pack_by_size([10, 20, 30], 100, |n| *n, OverflowRule::Exceed);
        assert_eq!(sizes(&groups), vec![vec![10, 20, 30]]);
    }

    #[test]
    fn exceed_rule_allows_exact_fit() {
        let groups = pack_by_size([50, 50], 100, |n| *n, OverflowRule::Exceed);
        assert_eq!(sizes(&groups), vec![vec![50, 50]]);
    }

    #[test]
    fn reach_rule_flushes_at_exact_budget() {
        let groups = pack_by_size([50, 50], 100, |n| *n, OverflowRule::Reach);
        assert_eq!(sizes(&groups), vec![vec![50], vec![50]]);
    }

    #[test]
    fn oversized_item_forms_its_own_group() {
        let groups = pack_by_size([10, 500, 10], 100, |n| *n, OverflowRule::Exceed);
        assert_eq!(sizes(&groups), vec![vec![10], vec![500], vec![10]]);
    }

    #[test]
    fn leading_oversized_item_does_not_produce_empty_group() {
        let groups = pack_by_size([500, 10], 100, |n| *n, OverflowRule::Reach);
        assert_eq!(sizes(&groups), vec![vec![500], vec![10]]);
    }

    #[test]
    fn empty_input_produces_no_groups() {
        let groups = pack_by_size(Vec::<usize>::new(), 100, |n| *n, OverflowRule::Exceed);
        assert!(groups.is_empty());
    }

    #[test]
    fn scenario_methods_2000_3000_5500_budget_8192() {
        // One method group of 5000 combined, then the 5500 method alone.
        let groups = pack_by_size([2000, 3000, 5500], 8192, |n| *n, OverflowRule::Exceed);
        assert_eq!(sizes(&groups), vec![vec![2000, 3000], vec![5500]]);
    }
}
