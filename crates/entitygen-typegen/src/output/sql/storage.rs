//! Relationship storage policy.
//!
//! Every relationship field is reduced to a handful of facts and a single
//! function maps those facts to a storage decision. Nothing here knows about
//! SQL text.

use crate::ir::Storage;

/// What the planner knows about one relationship field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipFacts {
    /// The property resolves to an array.
    pub is_array: bool,
    /// Declared `storage`.
    pub storage: Storage,
    /// The target entity declares a singular scalar relationship back to
    /// the owner.
    pub has_inverse_fk: bool,
    /// The relationship targets its own entity.
    pub is_self_join: bool,
    /// The target entity declares the mirror-image many-to-many field.
    pub shared_with_reverse: bool,
}

/// Where a relationship lives in the relational model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDecision {
    /// Scalar column with a foreign key to the target's `id`.
    ForeignKey,
    /// The array stays a JSON column.
    Json,
    /// Redundant with the target's foreign key; no column, no join table.
    Derived,
    /// Join table owned by this field.
    JoinTable,
    /// Join table whose target column is named after the field.
    SelfJoinTable,
    /// One join table serves both directions of a symmetric pair.
    SharedJoinTable,
}

impl StorageDecision {
    /// Decisions backed by a join table.
    pub fn uses_join_table(self) -> bool {
        matches!(
            self,
            Self::JoinTable | Self::SelfJoinTable | Self::SharedJoinTable
        )
    }

    /// Decisions that keep the property as a column on the owner's table.
    pub fn keeps_column(self) -> bool {
        matches!(self, Self::ForeignKey | Self::Json)
    }
}

/// `storage: "fk"` on an array-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FkStorageOnArray;

/// Decide storage for a relationship. Rules apply in priority order.
pub fn decide_storage(facts: RelationshipFacts) -> Result<StorageDecision, FkStorageOnArray> {
    if !facts.is_array {
        return Ok(StorageDecision::ForeignKey);
    }
    match facts.storage {
        Storage::ForeignKey => return Err(FkStorageOnArray),
        Storage::Json => return Ok(StorageDecision::Json),
        Storage::Auto => {}
    }
    if facts.has_inverse_fk {
        return Ok(StorageDecision::Derived);
    }
    if facts.is_self_join {
        return Ok(StorageDecision::SelfJoinTable);
    }
    if facts.shared_with_reverse {
        return Ok(StorageDecision::SharedJoinTable);
    }
    Ok(StorageDecision::JoinTable)
}

/// An `Auto` array that is not derived: the only kind of
/// declaration that can pair up with its reverse.
pub fn is_pairable(facts: RelationshipFacts) -> bool {
    facts.is_array
        && facts.storage == Storage::Auto
        && !facts.has_inverse_fk
        && !facts.is_self_join
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array() -> RelationshipFacts {
        RelationshipFacts {
            is_array: true,
            storage: Storage::Auto,
            has_inverse_fk: false,
            is_self_join: false,
            shared_with_reverse: false,
        }
    }

    #[test]
    fn scalars_are_foreign_keys_whatever_the_storage() {
        for storage in [Storage::Auto, Storage::ForeignKey, Storage::Json] {
            let facts = RelationshipFacts {
                is_array: false,
                storage,
                ..array()
            };
            assert_eq!(decide_storage(facts), Ok(StorageDecision::ForeignKey));
        }
    }

    #[test]
    fn fk_storage_on_array_is_rejected() {
        let facts = RelationshipFacts {
            storage: Storage::ForeignKey,
            has_inverse_fk: true,
            ..array()
        };
        assert_eq!(decide_storage(facts), Err(FkStorageOnArray));
    }

    #[test]
    fn json_storage_wins_over_inverse_and_join() {
        let facts = RelationshipFacts {
            storage: Storage::Json,
            has_inverse_fk: true,
            shared_with_reverse: true,
            ..array()
        };
        assert_eq!(decide_storage(facts), Ok(StorageDecision::Json));
    }

    #[test]
    fn only_declared_json_storage_keeps_an_array_column() {
        let decision = decide_storage(array()).unwrap();
        assert!(decision.uses_join_table());
        assert!(!decision.keeps_column());
    }

    #[test]
    fn inverse_fk_derives_the_array() {
        let facts = RelationshipFacts {
            has_inverse_fk: true,
            shared_with_reverse: true,
            ..array()
        };
        assert_eq!(decide_storage(facts), Ok(StorageDecision::Derived));
        assert!(!StorageDecision::Derived.keeps_column());
        assert!(!StorageDecision::Derived.uses_join_table());
    }

    #[test]
    fn join_table_variants() {
        assert_eq!(decide_storage(array()), Ok(StorageDecision::JoinTable));
        assert_eq!(
            decide_storage(RelationshipFacts {
                is_self_join: true,
                ..array()
            }),
            Ok(StorageDecision::SelfJoinTable)
        );
        assert_eq!(
            decide_storage(RelationshipFacts {
                shared_with_reverse: true,
                ..array()
            }),
            Ok(StorageDecision::SharedJoinTable)
        );
        assert!(StorageDecision::SharedJoinTable.uses_join_table());
    }

    #[test]
    fn pairable_declarations() {
        assert!(is_pairable(array()));
        assert!(!is_pairable(RelationshipFacts {
            is_self_join: true,
            ..array()
        }));
        assert!(!is_pairable(RelationshipFacts {
            storage: Storage::Json,
            ..array()
        }));
        assert!(!is_pairable(RelationshipFacts {
            has_inverse_fk: true,
            ..array()
        }));
    }
}
