// Row aggregation - folds LEFT JOIN fan-out rows back into one entity per id

use std::collections::HashMap;
use std::hash::Hash;

/// A row of a joined query whose scalar columns describe one entity and
/// whose nullable columns carry one element of a repeated association.
pub trait FanOutRow {
    type Key: Eq + Hash + Copy;
    type Entity;

    /// Primary id of the entity the row belongs to.
    fn key(&self) -> Self::Key;

    /// Build the entity from this row's scalar columns, with empty collections.
    fn to_entity(&self) -> Self::Entity;

    /// Add this row's fan-out values, if present, to the entity's collections.
    fn absorb_into(&self, entity: &mut Self::Entity);
}

/// Fold rows into entities. The first row seen for an id supplies the scalar
/// fields; every row contributes its fan-out columns. Output order follows
/// the first appearance of each id in the row stream.
pub fn aggregate<R, I>(rows: I) -> Vec<R::Entity>
where
    R: FanOutRow,
    I: IntoIterator<Item = R>,
{
    let mut positions: HashMap<R::Key, usize> = HashMap::new();
    let mut entities: Vec<R::Entity> = Vec::new();

    for row in rows {
        let index = *positions.entry(row.key()).or_insert_with(|| {
            entities.push(row.to_entity());
            entities.len() - 1
        });
        row.absorb_into(&mut entities[index]);
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    struct Row {
        id: i64,
        name: &'static str,
        tag: Option<i64>,
    }

    #[derive(Debug, PartialEq)]
    struct Tagged {
        id: i64,
        name: &'static str,
        tags: BTreeSet<i64>,
    }

    impl FanOutRow for Row {
        type Key = i64;
        type Entity = Tagged;

        fn key(&self) -> i64 {
            self.id
        }

        fn to_entity(&self) -> Tagged {
            Tagged {
                id: self.id,
                name: self.name,
                tags: BTreeSet::new(),
            }
        }

        fn absorb_into(&self, entity: &mut Tagged) {
            if let Some(tag) = self.tag {
                entity.tags.insert(tag);
            }
        }
    }

    fn row(id: i64, name: &'static str, tag: Option<i64>) -> Row {
        Row { id, name, tag }
    }

    #[test]
    fn groups_by_id_in_first_seen_order() {
        let rows = vec![
            row(2, "b", Some(1)),
            row(1, "a", None),
            row(2, "b-later", Some(3)),
            row(2, "b", Some(1)),
        ];

        let entities = aggregate(rows);

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, 2);
        assert_eq!(entities[0].name, "b", "first row wins for scalar fields");
        assert_eq!(entities[0].tags, BTreeSet::from([1, 3]));
        assert_eq!(entities[1].id, 1);
        assert!(entities[1].tags.is_empty(), "unmatched LEFT JOIN keeps the entity");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(aggregate(Vec::<Row>::new()).is_empty());
    }
}
