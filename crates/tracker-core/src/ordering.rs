//! Sibling ordering ("order-index maintenance").
//!
//! Siblings are projects within a workstream, tasks within a project, and
//! the collection of workstreams itself. Each carries an optional integer
//! `sort_order` used purely for display.
//!
//! Read order:
//! - ascending `sort_order`, rows without one last,
//! - then ascending `created_at` as the tie-break.
//!
//! Nothing here talks to the store. Operations produce a [`ReorderPlan`]
//! (the rows whose position must change); the store layer submits the
//! whole plan as one batch.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Anything that takes part in sibling ordering.
pub trait Sortable {
    type Id: Clone + PartialEq;

    fn id(&self) -> &Self::Id;
    fn sort_order(&self) -> Option<i64>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl<T: Sortable> Sortable for &T {
    type Id = T::Id;

    fn id(&self) -> &Self::Id {
        (**self).id()
    }

    fn sort_order(&self) -> Option<i64> {
        (**self).sort_order()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        (**self).created_at()
    }
}

/// Which append variant to use when computing the next position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppendBase {
    /// Collection-wide variant: `max(-1, ...) + 1`, the first item gets 0.
    FromZero,
    /// Per-parent variant: `max(..., default 0) + 1`, the first item gets 1.
    AfterZero,
}

/// Direction of a one-step move within the sorted sibling list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// A single "set this row's position" write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortUpdate<I> {
    pub id: I,
    pub sort_order: i64,
}

/// The set of position writes produced by one reorder operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan<I> {
    updates: Vec<SortUpdate<I>>,
}

impl<I> ReorderPlan<I> {
    pub fn empty() -> Self {
        ReorderPlan { updates: Vec::new() }
    }

    pub fn updates(&self) -> &[SortUpdate<I>] {
        &self.updates
    }

    pub fn into_updates(self) -> Vec<SortUpdate<I>> {
        self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Compare two siblings in read order.
pub fn read_order<T: Sortable>(a: &T, b: &T) -> Ordering {
    let by_position = match (a.sort_order(), b.sort_order()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_position.then_with(|| a.created_at().cmp(&b.created_at()))
}

/// Sort a sibling list into read order (stable).
pub fn sort_siblings<T: Sortable>(siblings: &mut [T]) {
    siblings.sort_by(read_order);
}

/// Position for a new sibling appended after `existing`.
///
/// Rows without a position count as 0. Under a single writer the result
/// is strictly greater than every existing position; two concurrent
/// writers computing from the same snapshot can still collide.
pub fn next_sort_order<I>(existing: I, base: AppendBase) -> i64
where
    I: IntoIterator<Item = Option<i64>>,
{
    let floor = match base {
        AppendBase::FromZero => -1,
        AppendBase::AfterZero => 0,
    };
    existing
        .into_iter()
        .map(|pos| pos.unwrap_or(0))
        .fold(floor, i64::max)
        + 1
}

/// Exchange the positions of `a` and `b`: A takes pb, B takes pa.
///
/// Returns `None` when either position is missing or both are equal,
/// since a value swap would then leave the visible order unchanged.
pub fn swap_positions<T: Sortable>(a: &T, b: &T) -> Option<ReorderPlan<T::Id>> {
    let (pa, pb) = (a.sort_order()?, b.sort_order()?);
    if pa == pb {
        return None;
    }

    Some(ReorderPlan {
        updates: vec![
            SortUpdate {
                id: a.id().clone(),
                sort_order: pb,
            },
            SortUpdate {
                id: b.id().clone(),
                sort_order: pa,
            },
        ],
    })
}

/// Relocate the element at `from` to `to` (array-move semantics), then
/// renumber the whole list `0..n`. Only rows whose stored position
/// actually changes end up in the plan.
///
/// Out-of-range indices yield an empty plan.
pub fn reindex_after_move<T: Sortable>(siblings: &[T], from: usize, to: usize) -> ReorderPlan<T::Id> {
    if from >= siblings.len() || to >= siblings.len() || from == to {
        return ReorderPlan::empty();
    }

    let mut moved: Vec<&T> = siblings.iter().collect();
    let item = moved.remove(from);
    moved.insert(to, item);

    let updates = moved
        .into_iter()
        .enumerate()
        .filter_map(|(index, sibling)| {
            let index = index as i64;
            (sibling.sort_order() != Some(index)).then(|| SortUpdate {
                id: sibling.id().clone(),
                sort_order: index,
            })
        })
        .collect();

    ReorderPlan { updates }
}

/// Move the sibling with `id` one step in `direction` within the already
/// sorted `siblings`.
///
/// Returns `None` (a no-op) when `id` is unknown or the neighbour would be
/// out of bounds. Normally the plan is a pairwise swap of the two
/// positions. When those cannot be swapped meaningfully (missing or equal,
/// or either value also held by another sibling) the list is renumbered
/// with the two elements exchanged instead.
pub fn plan_directional_move<T: Sortable>(
    siblings: &[T],
    id: &T::Id,
    direction: Direction,
) -> Option<ReorderPlan<T::Id>> {
    let index = siblings.iter().position(|s| s.id() == id)?;
    let neighbour = index.checked_add_signed(direction.offset())?;
    let other = siblings.get(neighbour)?;

    let (pa, pb) = (siblings[index].sort_order(), other.sort_order());
    let shared = siblings.iter().enumerate().any(|(i, s)| {
        let pos = s.sort_order();
        i != index && i != neighbour && pos.is_some() && (pos == pa || pos == pb)
    });
    match swap_positions(&siblings[index], other) {
        Some(plan) if !shared => Some(plan),
        _ => Some(reindex_after_move(siblings, index, neighbour)),
    }
}

/// Move the sibling with `id` to the first or last slot.
pub fn plan_move_to_edge<T: Sortable>(
    siblings: &[T],
    id: &T::Id,
    direction: Direction,
) -> Option<ReorderPlan<T::Id>> {
    let index = siblings.iter().position(|s| s.id() == id)?;
    let target = match direction {
        Direction::Up => 0,
        Direction::Down => siblings.len() - 1,
    };
    if index == target {
        return None;
    }
    Some(reindex_after_move(siblings, index, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Item {
        id: &'static str,
        pos: Option<i64>,
        created_minute: u32,
    }

    impl Sortable for Item {
        type Id = &'static str;

        fn id(&self) -> &&'static str {
            &self.id
        }

        fn sort_order(&self) -> Option<i64> {
            self.pos
        }

        fn created_at(&self) -> Option<DateTime<Utc>> {
            Utc.with_ymd_and_hms(2026, 1, 1, 0, self.created_minute, 0).single()
        }
    }

    fn item(id: &'static str, pos: Option<i64>, created_minute: u32) -> Item {
        Item {
            id,
            pos,
            created_minute,
        }
    }

    fn ids(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn append_from_zero_starts_at_zero() {
        assert_eq!(next_sort_order(Vec::new(), AppendBase::FromZero), 0);
        assert_eq!(next_sort_order(vec![Some(0), Some(4)], AppendBase::FromZero), 5);
    }

    #[test]
    fn append_after_zero_starts_at_one() {
        assert_eq!(next_sort_order(Vec::new(), AppendBase::AfterZero), 1);
        assert_eq!(next_sort_order(vec![Some(-3)], AppendBase::AfterZero), 1);
        assert_eq!(next_sort_order(vec![Some(2), None], AppendBase::AfterZero), 3);
    }

    #[test]
    fn null_positions_count_as_zero() {
        assert_eq!(next_sort_order(vec![None, None], AppendBase::FromZero), 1);
    }

    #[test]
    fn read_order_puts_missing_positions_last_then_by_creation() {
        let mut items = vec![
            item("late-null", None, 5),
            item("b", Some(1), 3),
            item("early-null", None, 1),
            item("a2", Some(0), 9),
            item("a1", Some(0), 2),
        ];
        sort_siblings(&mut items);
        assert_eq!(ids(&items), vec!["a1", "a2", "b", "early-null", "late-null"]);
    }

    #[test]
    fn swap_exchanges_positions() {
        let a = item("a", Some(0), 0);
        let b = item("b", Some(1), 1);
        let plan = swap_positions(&a, &b).unwrap();
        assert_eq!(
            plan.updates(),
            &[
                SortUpdate { id: "a", sort_order: 1 },
                SortUpdate { id: "b", sort_order: 0 },
            ]
        );
    }

    #[test]
    fn swap_of_missing_or_equal_positions_is_refused() {
        assert!(swap_positions(&item("a", None, 0), &item("b", Some(1), 1)).is_none());
        assert!(swap_positions(&item("a", Some(2), 0), &item("b", Some(2), 1)).is_none());
    }

    #[test]
    fn directional_move_at_boundaries_is_noop() {
        let items = vec![item("a", Some(0), 0), item("b", Some(1), 1), item("c", Some(2), 2)];
        assert!(plan_directional_move(&items, &"a", Direction::Up).is_none());
        assert!(plan_directional_move(&items, &"c", Direction::Down).is_none());
        assert!(plan_directional_move(&items, &"zzz", Direction::Down).is_none());
    }

    #[test]
    fn directional_move_swaps_with_neighbour() {
        let items = vec![item("a", Some(0), 0), item("b", Some(5), 1), item("c", Some(9), 2)];
        let plan = plan_directional_move(&items, &"c", Direction::Up).unwrap();
        assert_eq!(
            plan.updates(),
            &[
                SortUpdate { id: "c", sort_order: 5 },
                SortUpdate { id: "b", sort_order: 9 },
            ]
        );
    }

    #[test]
    fn directional_move_with_null_positions_renumbers() {
        let items = vec![item("a", Some(0), 0), item("b", None, 1), item("c", None, 2)];
        let plan = plan_directional_move(&items, &"b", Direction::Down).unwrap();
        assert_eq!(
            plan.updates(),
            &[
                SortUpdate { id: "c", sort_order: 1 },
                SortUpdate { id: "b", sort_order: 2 },
            ]
        );
    }

    #[test]
    fn directional_move_past_shared_position_moves_one_place() {
        let mut items = vec![item("a", Some(0), 5), item("b", Some(1), 1), item("c", Some(1), 2)];
        sort_siblings(&mut items);
        assert_eq!(ids(&items), vec!["a", "b", "c"]);

        let plan = plan_directional_move(&items, &"a", Direction::Down).unwrap();
        for update in plan.updates() {
            if let Some(row) = items.iter_mut().find(|i| i.id == update.id) {
                row.pos = Some(update.sort_order);
            }
        }
        sort_siblings(&mut items);
        assert_eq!(ids(&items), vec!["b", "a", "c"]);
    }

    #[test]
    fn reindex_only_emits_changed_rows() {
        let items = vec![
            item("a", Some(0), 0),
            item("b", Some(1), 1),
            item("c", Some(2), 2),
            item("d", Some(3), 3),
        ];
        // Move "d" to index 1: a, d, b, c
        let plan = reindex_after_move(&items, 3, 1);
        assert_eq!(
            plan.updates(),
            &[
                SortUpdate { id: "d", sort_order: 1 },
                SortUpdate { id: "b", sort_order: 2 },
                SortUpdate { id: "c", sort_order: 3 },
            ]
        );
    }

    #[test]
    fn reindex_out_of_range_is_empty() {
        let items = vec![item("a", Some(0), 0)];
        assert!(reindex_after_move(&items, 0, 3).is_empty());
        assert!(reindex_after_move(&items, 0, 0).is_empty());
    }

    #[test]
    fn move_to_edge() {
        let items = vec![item("a", Some(0), 0), item("b", Some(1), 1), item("c", Some(2), 2)];
        let plan = plan_move_to_edge(&items, &"c", Direction::Up).unwrap();
        assert_eq!(
            plan.updates(),
            &[
                SortUpdate { id: "c", sort_order: 0 },
                SortUpdate { id: "a", sort_order: 1 },
                SortUpdate { id: "b", sort_order: 2 },
            ]
        );
        assert!(plan_move_to_edge(&items, &"a", Direction::Up).is_none());
    }
}
