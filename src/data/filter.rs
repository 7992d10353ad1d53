use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use super::model::{Category, SalesRecord};

/// Keyword that disables a predicate in the user filter input.
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Single-value predicate (year, month).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    /// `None` (a null derived field) only passes when the predicate is off.
    pub fn matches(&self, value: Option<&T>) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => value == Some(wanted),
        }
    }
}

/// Multi-value predicate (region, category, segment).
///
/// `AnyOf` with an empty set matches nothing, like an empty multiselect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    All,
    AnyOf(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord + Clone> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn contains(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::AnyOf(set) => set.contains(value),
        }
    }

    pub fn select_all(&mut self) {
        *self = Selection::All;
    }

    pub fn clear(&mut self) {
        *self = Selection::AnyOf(BTreeSet::new());
    }

    /// Flip one value. Toggling off a value while everything is selected
    /// leaves the rest of `universe` selected; selecting the whole universe
    /// collapses back to `All`.
    pub fn toggle(&mut self, value: &T, universe: &[T]) {
        let mut set = match std::mem::take(self) {
            Selection::All => universe.iter().cloned().collect(),
            Selection::AnyOf(set) => set,
        };
        if !set.remove(value) {
            set.insert(value.clone());
        }
        *self = if !universe.is_empty() && universe.iter().all(|v| set.contains(v)) {
            Selection::All
        } else {
            Selection::AnyOf(set)
        };
    }
}

/// The conjunction of user-selected predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSpec {
    pub year: Choice<i32>,
    pub month: Choice<u32>,
    pub regions: Selection<String>,
    pub categories: Selection<Category>,
    pub segments: Selection<String>,
}

impl FilterSpec {
    /// Whether a record satisfies every active predicate.
    pub fn matches(&self, rec: &SalesRecord) -> bool {
        self.year.matches(rec.year.as_ref())
            && self.month.matches(rec.month.as_ref())
            && self.regions.contains(&rec.record.region)
            && self.categories.contains(&rec.record.category)
            && self.segments.contains(&rec.record.segment)
    }

    /// True when every predicate is `All`.
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterSpec::default()
    }
}

/// Keep the records that pass `spec`, in input order.
///
/// Accepts the table's records or an existing view, so re-filtering a
/// filtered view is a no-op.
pub fn filter<'a, I>(records: I, spec: &FilterSpec) -> Vec<&'a SalesRecord>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    records.into_iter().filter(|rec| spec.matches(rec)).collect()
}

// ---------------------------------------------------------------------------
// User filter input: `year = 2016 | "All"`, `regions = ["West"] | ["All"]`
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceRepr<T> {
    Value(T),
    Keyword(String),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Choice<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ChoiceRepr::<T>::deserialize(deserializer)? {
            ChoiceRepr::Value(v) => Ok(Choice::Only(v)),
            ChoiceRepr::Keyword(k) if k.trim().eq_ignore_ascii_case(ALL) => Ok(Choice::All),
            ChoiceRepr::Keyword(k) => Err(de::Error::custom(format!(
                "expected a value or \"{ALL}\", got \"{k}\""
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    One(String),
    Many(Vec<String>),
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: Ord + FromStr,
    T::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match SelectionRepr::deserialize(deserializer)? {
            SelectionRepr::One(s) => vec![s],
            SelectionRepr::Many(v) => v,
        };
        if items.iter().any(|s| s.trim().eq_ignore_ascii_case(ALL)) {
            return Ok(Selection::All);
        }
        items
            .iter()
            .map(|s| s.trim().parse::<T>().map_err(de::Error::custom))
            .collect::<Result<BTreeSet<T>, D::Error>>()
            .map(Selection::AnyOf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::enrich::{enrich, EnrichOptions};
    use crate::data::model::{DateCell, Record, SalesTable};

    fn record(
        order_id: &str,
        region: &str,
        category: Category,
        segment: &str,
        order: &str,
    ) -> Record {
        Record {
            order_id: order_id.to_string(),
            product_name: format!("Product {order_id}"),
            category,
            segment: segment.to_string(),
            region: region.to_string(),
            order_date: DateCell::Text(order.to_string()),
            ship_date: DateCell::Text(order.to_string()),
            sales: 10.0,
            profit: 1.0,
            quantity: 1,
            discount: 0.0,
        }
    }

    fn table() -> SalesTable {
        enrich(
            vec![
                record("A", "West", Category::Furniture, "Consumer", "01/01/2016"),
                record("B", "East", Category::Technology, "Corporate", "15/02/2016"),
                record("C", "West", Category::OfficeSupplies, "Consumer", "03/02/2017"),
                record("D", "South", Category::Technology, "Home Office", "bad"),
            ],
            &EnrichOptions::default(),
        )
        .unwrap()
    }

    fn ids(view: &[&SalesRecord]) -> Vec<String> {
        view.iter().map(|r| r.record.order_id.clone()).collect()
    }

    #[test]
    fn all_predicates_off_returns_everything_in_order() {
        let t = table();
        let view = filter(&t.records, &FilterSpec::default());
        assert_eq!(ids(&view), ["A", "B", "C", "D"]);
    }

    #[test]
    fn predicates_are_conjoined() {
        let t = table();
        let spec = FilterSpec {
            year: Choice::Only(2016),
            regions: Selection::AnyOf(["West".to_string()].into()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&t.records, &spec)), ["A"]);
    }

    #[test]
    fn null_year_fails_active_year_predicate() {
        let t = table();
        let spec = FilterSpec {
            year: Choice::Only(2016),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&t.records, &spec)), ["A", "B"]);

        let spec = FilterSpec {
            segments: Selection::AnyOf(["Home Office".to_string()].into()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&t.records, &spec)), ["D"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = table();
        let spec = FilterSpec {
            month: Choice::Only(2),
            categories: Selection::AnyOf([Category::Technology, Category::OfficeSupplies].into()),
            ..FilterSpec::default()
        };
        let once = filter(&t.records, &spec);
        let twice = filter(once.iter().copied(), &spec);
        assert_eq!(ids(&once), ["B", "C"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let t = table();
        let mut spec = FilterSpec::default();
        spec.regions.clear();
        assert!(filter(&t.records, &spec).is_empty());
    }

    #[test]
    fn toggle_from_all_deselects_one_value() {
        let universe = vec!["East".to_string(), "South".to_string(), "West".to_string()];
        let mut sel = Selection::All;
        sel.toggle(&"East".to_string(), &universe);
        assert_eq!(
            sel,
            Selection::AnyOf(["South".to_string(), "West".to_string()].into())
        );
        sel.toggle(&"East".to_string(), &universe);
        assert!(sel.is_all());
    }

    #[test]
    fn deserializes_user_filter_input() {
        let spec: FilterSpec = toml::from_str(
            r#"
            year = 2016
            month = "All"
            regions = ["West", "East"]
            categories = ["Technology", "All"]
            segments = "All"
            "#,
        )
        .unwrap();
        assert_eq!(spec.year, Choice::Only(2016));
        assert_eq!(spec.month, Choice::All);
        assert_eq!(
            spec.regions,
            Selection::AnyOf(["East".to_string(), "West".to_string()].into())
        );
        assert_eq!(spec.categories, Selection::All);
        assert_eq!(spec.segments, Selection::All);
    }

    #[test]
    fn rejects_unknown_keyword_and_category() {
        assert!(toml::from_str::<FilterSpec>(r#"year = "every""#).is_err());
        assert!(toml::from_str::<FilterSpec>(r#"categories = ["Toys"]"#).is_err());
    }
}
