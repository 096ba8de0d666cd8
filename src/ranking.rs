//! Spending aggregation over purchase lists.
//!
//! A list's cost is the sum of its items' `total`. Rankings are keyed by list
//! identity, so two lists with the same cost are both kept and ordered by id.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Item, PurchaseList, RecordId};

/// How many lists the spending graph shows.
pub const TOP_LIST_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListCost {
    pub cost: f64,
    pub list: PurchaseList,
}

pub fn list_cost(items: &[Item]) -> f64 {
    items.iter().map(|item| item.total).sum()
}

/// Computes every list's cost in input order. The first lookup failure is returned as is.
pub fn list_costs<F, E>(lists: &[PurchaseList], mut items_for: F) -> Result<Vec<ListCost>, E>
where
    F: FnMut(&RecordId) -> Result<Vec<Item>, E>,
{
    lists
        .iter()
        .map(|list| {
            let items = items_for(&list.id)?;
            Ok(ListCost {
                cost: list_cost(&items),
                list: list.clone(),
            })
        })
        .collect()
}

/// Sorts by cost descending, then by list id, and keeps at most `limit` entries.
pub fn rank(mut costs: Vec<ListCost>, limit: usize) -> Vec<ListCost> {
    costs.sort_by(|a, b| match b.cost.total_cmp(&a.cost) {
        Ordering::Equal => a.list.id.cmp(&b.list.id),
        other => other,
    });
    costs.truncate(limit);
    costs
}

pub fn top_lists<F, E>(lists: &[PurchaseList], items_for: F) -> Result<Vec<ListCost>, E>
where
    F: FnMut(&RecordId) -> Result<Vec<Item>, E>,
{
    Ok(rank(list_costs(lists, items_for)?, TOP_LIST_LIMIT))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::WeightUnit;

    fn list(name: &str) -> PurchaseList {
        PurchaseList {
            id: RecordId::new(),
            name: name.into(),
            size: 1,
            created_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn item(list: &PurchaseList, total: f64) -> Item {
        Item {
            id: RecordId::new(),
            list_id: list.id,
            name: "x".into(),
            weight: 1.0,
            weight_unit: WeightUnit::Piece,
            price: total,
            total,
            bought: false,
        }
    }

    /// One list per total, each list holding its total split over two items.
    fn fixture(totals: &[(&str, f64)]) -> (Vec<PurchaseList>, HashMap<RecordId, Vec<Item>>) {
        let lists: Vec<PurchaseList> = totals.iter().map(|(name, _)| list(name)).collect();
        let items = lists
            .iter()
            .zip(totals)
            .map(|(l, (_, total))| (l.id, vec![item(l, total / 2.0), item(l, total / 2.0)]))
            .collect();
        (lists, items)
    }

    fn lookup(
        items: &HashMap<RecordId, Vec<Item>>,
    ) -> impl FnMut(&RecordId) -> Result<Vec<Item>, String> + '_ {
        move |id| Ok(items.get(id).cloned().unwrap_or_default())
    }

    fn names(ranked: &[ListCost]) -> Vec<&str> {
        ranked.iter().map(|c| c.list.name.as_str()).collect()
    }

    #[test]
    fn keeps_the_four_most_expensive_lists() {
        let (lists, items) = fixture(&[
            ("A", 50.0),
            ("B", 20.0),
            ("C", 75.0),
            ("D", 10.0),
            ("E", 5.0),
        ]);
        let ranked = top_lists(&lists, lookup(&items)).unwrap();

        assert_eq!(names(&ranked), vec!["C", "A", "B", "D"]);
        let costs: Vec<f64> = ranked.iter().map(|c| c.cost).collect();
        assert_eq!(costs, vec![75.0, 50.0, 20.0, 10.0]);
    }

    #[test]
    fn equal_totals_are_both_kept() {
        let (lists, items) = fixture(&[("A", 30.0), ("B", 30.0), ("C", 10.0)]);
        let ranked = top_lists(&lists, lookup(&items)).unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].cost, 30.0);
        assert_eq!(ranked[1].cost, 30.0);
        assert!(ranked[0].list.id < ranked[1].list.id);
        assert_eq!(ranked[2].list.name, "C");
    }

    #[test]
    fn output_is_sorted_and_bounded() {
        let (lists, items) = fixture(&[
            ("A", 1.0),
            ("B", 9.0),
            ("C", 4.0),
            ("D", 4.5),
            ("E", 7.0),
            ("F", 0.0),
        ]);
        let ranked = top_lists(&lists, lookup(&items)).unwrap();

        assert_eq!(ranked.len(), TOP_LIST_LIMIT);
        assert!(ranked.windows(2).all(|w| w[0].cost >= w[1].cost));

        let (few, few_items) = fixture(&[("A", 1.0), ("B", 2.0)]);
        assert_eq!(top_lists(&few, lookup(&few_items)).unwrap().len(), 2);
    }

    #[test]
    fn lists_without_items_cost_nothing() {
        let lists = vec![list("empty")];
        let ranked = top_lists(&lists, |_| Ok::<_, String>(Vec::new())).unwrap();
        assert_eq!(ranked[0].cost, 0.0);
        assert!(
            top_lists(&[], |_| Ok::<_, String>(Vec::new())).unwrap().is_empty()
        );
    }

    #[test]
    fn ranking_twice_gives_the_same_answer() {
        let (lists, items) = fixture(&[
            ("A", 12.0),
            ("B", 12.0),
            ("C", 3.0),
            ("D", 40.0),
            ("E", 8.0),
        ]);
        let first = top_lists(&lists, lookup(&items)).unwrap();
        let second = top_lists(&lists, lookup(&items)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn lookup_failure_is_propagated() {
        let lists = vec![list("A"), list("B")];
        let mut calls = 0;
        let result = top_lists(&lists, |_| {
            calls += 1;
            Err::<Vec<Item>, _>("store closed")
        });
        assert_eq!(result, Err("store closed"));
        assert_eq!(calls, 1);
    }
}
