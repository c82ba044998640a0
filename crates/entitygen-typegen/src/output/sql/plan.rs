//! Dialect-independent relational model.
//!
//! The planner walks the schema once, decides storage for every relationship
//! and produces a [`Plan`]: entity tables in creation order, join tables,
//! natural-key indexes and required-join constraints. Rendering a plan never
//! fails.

use super::dialect::ColumnType;
use super::storage::{RelationshipFacts, StorageDecision, decide_storage, is_pairable};
use crate::error::GenerateError;
use crate::ir::{Entity, Relationship, Schema};
use crate::naming::{entity_id_column, table_name};
use crate::resolve::{
    Primitive, PrimitiveKind, ResolveError, SemanticType, TypeResolver, WellKnown,
};
use std::collections::{BTreeMap, BTreeSet};

/// The relational model for one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Entity tables, referenced tables first.
    pub tables: Vec<Table>,
    /// Join tables sorted by name.
    pub join_tables: Vec<JoinTable>,
    pub indexes: Vec<UniqueIndex>,
    /// Sorted by join table, then column.
    pub required_joins: Vec<RequiredJoin>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub entity: String,
    /// `id` first, then the remaining columns by name.
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub not_null: bool,
    pub primary_key: bool,
    /// Enum values the column is restricted to.
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub references: String,
    /// The referenced table is created after this one.
    pub forward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    pub name: String,
    /// Column pointing at the owning row.
    pub owner: JoinColumn,
    /// Column pointing at the referenced row.
    pub target: JoinColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumn {
    pub name: String,
    pub ty: ColumnType,
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
}

/// A required array relationship stored in a join table: every parent row
/// needs at least one link row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequiredJoin {
    pub join_table: String,
    /// Join-table column referencing the parent.
    pub column: String,
    pub parent_table: String,
}

impl RequiredJoin {
    /// `<parent>_<join>_<column>_required`
    pub fn parent_trigger(&self) -> String {
        format!(
            "{}_{}_{}_required",
            self.parent_table, self.join_table, self.column
        )
    }

    /// `<join>_<column>_guard`
    pub fn guard_trigger(&self) -> String {
        format!("{}_{}_guard", self.join_table, self.column)
    }
}

/// Build the relational model for `schema`.
pub fn build_plan(schema: &Schema) -> Result<Plan, GenerateError> {
    Planner::new(schema)?.build()
}

/// One relationship field with its resolved facts.
struct Link<'a> {
    owner: &'a str,
    field: &'a str,
    relationship: &'a Relationship,
    facts: RelationshipFacts,
    decision: StorageDecision,
}

impl Link<'_> {
    fn target(&self) -> &str {
        &self.relationship.target
    }
}

struct Planner<'a> {
    schema: &'a Schema,
    resolver: TypeResolver<'a>,
    tables: BTreeMap<&'a str, String>,
    id_types: BTreeMap<&'a str, ColumnType>,
}

impl<'a> Planner<'a> {
    fn new(schema: &'a Schema) -> Result<Self, GenerateError> {
        let mut planner = Self {
            schema,
            resolver: TypeResolver::for_schema(schema),
            tables: BTreeMap::new(),
            id_types: BTreeMap::new(),
        };

        let mut owners: BTreeMap<String, &str> = BTreeMap::new();
        for (name, entity) in &schema.entities {
            let table = table_name(name);
            if let Some(first) = owners.insert(table.clone(), name.as_str()) {
                return Err(GenerateError::DuplicateTable {
                    first: first.to_string(),
                    second: name.clone(),
                    table,
                });
            }
            planner.tables.insert(name.as_str(), table);
            let id_type = planner.id_type(name, entity)?;
            planner.id_types.insert(name.as_str(), id_type);
        }
        Ok(planner)
    }

    fn build(self) -> Result<Plan, GenerateError> {
        let links = self.links()?;

        let mut tables = Vec::with_capacity(self.schema.entities.len());
        for (name, entity) in &self.schema.entities {
            let entity_links: Vec<&Link> = links.iter().filter(|l| l.owner == name).collect();
            tables.push(self.table(name, entity, &entity_links)?);
        }
        order_tables(&mut tables);

        let (join_tables, required_joins) = self.join_tables(&links);
        let indexes = self.indexes(&tables)?;

        Ok(Plan {
            tables,
            join_tables,
            indexes,
            required_joins,
        })
    }

    fn table_of<'s>(&'s self, entity: &'s str) -> &'s str {
        self.tables.get(entity).map_or(entity, String::as_str)
    }

    fn id_type(&self, name: &str, entity: &Entity) -> Result<ColumnType, GenerateError> {
        let Some(prop) = entity.properties.get("id") else {
            return Err(GenerateError::MissingId {
                entity: name.to_string(),
            });
        };
        let (ty, _) = self
            .resolver
            .resolve(prop)
            .and_then(|resolved| self.column_type(&resolved))
            .map_err(|source| GenerateError::Property {
                entity: name.to_string(),
                property: "id".to_string(),
                source,
            })?;
        if !ty.is_identifier() {
            return Err(GenerateError::InvalidId {
                entity: name.to_string(),
            });
        }
        Ok(ty)
    }

    /// Resolve every relationship and decide its storage.
    fn links(&self) -> Result<Vec<Link<'a>>, GenerateError> {
        let mut links = Vec::new();
        for (owner, entity) in &self.schema.entities {
            for (field, relationship) in &entity.relationships {
                let Some(prop) = entity.properties.get(field) else {
                    return Err(GenerateError::RelationshipWithoutProperty {
                        entity: owner.clone(),
                        field: field.clone(),
                    });
                };
                if !self.schema.entities.contains_key(&relationship.target) {
                    return Err(GenerateError::UnknownTarget {
                        entity: owner.clone(),
                        field: field.clone(),
                        target: relationship.target.clone(),
                    });
                }

                let wrap = |source| GenerateError::Property {
                    entity: owner.clone(),
                    property: field.clone(),
                    source,
                };
                let is_array = self.resolver.is_array(prop).map_err(wrap)?;
                links.push(Link {
                    owner,
                    field,
                    relationship,
                    facts: RelationshipFacts {
                        is_array,
                        storage: relationship.storage,
                        has_inverse_fk: false,
                        is_self_join: relationship.target == *owner,
                        shared_with_reverse: false,
                    },
                    decision: StorageDecision::ForeignKey,
                });
            }
        }

        let inverse: Vec<bool> = links
            .iter()
            .map(|link| {
                !link.facts.is_self_join
                    && links.iter().any(|other| {
                        other.owner == link.target()
                            && other.target() == link.owner
                            && !other.facts.is_array
                            && other.relationship.cardinality.is_singular()
                    })
            })
            .collect();
        for (link, has_inverse_fk) in links.iter_mut().zip(inverse) {
            link.facts.has_inverse_fk = has_inverse_fk;
        }

        let pairable_count = |owner: &str, target: &str| {
            links
                .iter()
                .filter(|l| l.owner == owner && l.target() == target && is_pairable(l.facts))
                .count()
        };
        let shared: Vec<bool> = links
            .iter()
            .map(|link| {
                is_pairable(link.facts)
                    && pairable_count(link.owner, link.target()) == 1
                    && pairable_count(link.target(), link.owner) == 1
            })
            .collect();
        for (link, shared_with_reverse) in links.iter_mut().zip(shared) {
            link.facts.shared_with_reverse = shared_with_reverse;
        }

        for link in &mut links {
            link.decision = decide_storage(link.facts).map_err(|_| {
                GenerateError::FkStorageOnArray {
                    entity: link.owner.to_string(),
                    field: link.field.to_string(),
                }
            })?;
            tracing::debug!(
                entity = link.owner,
                field = link.field,
                target = link.target(),
                decision = ?link.decision,
                "relationship storage"
            );
        }
        Ok(links)
    }

    fn table(
        &self,
        name: &str,
        entity: &Entity,
        links: &[&Link],
    ) -> Result<Table, GenerateError> {
        let table = self.table_of(name).to_string();
        tracing::trace!(entity = name, table = %table, "planning table");

        let omitted: BTreeSet<&str> = links
            .iter()
            .filter(|l| !l.decision.keeps_column())
            .map(|l| l.field)
            .collect();

        let mut columns = Vec::with_capacity(entity.properties.len());
        for (prop_name, prop) in &entity.properties {
            if omitted.contains(prop_name.as_str()) {
                continue;
            }
            let (ty, allowed) = self
                .resolver
                .resolve(prop)
                .and_then(|resolved| self.column_type(&resolved))
                .map_err(|source| GenerateError::Property {
                    entity: name.to_string(),
                    property: prop_name.clone(),
                    source,
                })?;
            let primary_key = prop_name == "id";
            columns.push(Column {
                name: prop_name.clone(),
                ty,
                not_null: primary_key || entity.is_required(prop_name),
                primary_key,
                allowed,
            });
        }
        columns.sort_by(|a, b| {
            b.primary_key
                .cmp(&a.primary_key)
                .then_with(|| a.name.cmp(&b.name))
        });

        let foreign_keys = links
            .iter()
            .filter(|l| l.decision == StorageDecision::ForeignKey)
            .map(|l| ForeignKey {
                column: l.field.to_string(),
                references: self.table_of(l.target()).to_string(),
                forward: false,
            })
            .collect();

        Ok(Table {
            name: table,
            entity: name.to_string(),
            columns,
            foreign_keys,
        })
    }

    fn join_column(&self, name: String, entity: &str) -> JoinColumn {
        JoinColumn {
            name,
            ty: self
                .id_types
                .get(entity)
                .copied()
                .unwrap_or(ColumnType::Uuid),
            references: self.table_of(entity).to_string(),
        }
    }

    fn join_tables(&self, links: &[Link]) -> (Vec<JoinTable>, Vec<RequiredJoin>) {
        let mut joins: BTreeMap<String, JoinTable> = BTreeMap::new();
        let mut required = BTreeSet::new();

        for link in links.iter().filter(|l| l.decision.uses_join_table()) {
            let owner_table = self.table_of(link.owner);
            let own_name = format!("{owner_table}__{}", link.field);

            let join = match link.decision {
                StorageDecision::SelfJoinTable => JoinTable {
                    name: own_name,
                    owner: self.join_column(entity_id_column(link.owner), link.owner),
                    target: self.join_column(format!("{}_id", link.field), link.owner),
                },
                StorageDecision::SharedJoinTable => {
                    let reverse = links.iter().find(|other| {
                        other.decision == StorageDecision::SharedJoinTable
                            && other.owner == link.target()
                            && other.target() == link.owner
                    });
                    let reverse_name = reverse.map(|other| {
                        format!("{}__{}", self.table_of(other.owner), other.field)
                    });
                    match reverse_name {
                        Some(reverse_name) if reverse_name < own_name => {
                            tracing::debug!(
                                kept = %reverse_name,
                                dropped = %own_name,
                                "symmetric join table deduplicated"
                            );
                            JoinTable {
                                name: reverse_name,
                                owner: self.join_column(
                                    entity_id_column(link.target()),
                                    link.target(),
                                ),
                                target: self.join_column(entity_id_column(link.owner), link.owner),
                            }
                        }
                        _ => self.plain_join(own_name, link),
                    }
                }
                _ => self.plain_join(own_name, link),
            };

            if self
                .schema
                .entity(link.owner)
                .is_some_and(|entity| entity.is_required(link.field))
            {
                let column = if link.decision == StorageDecision::SharedJoinTable {
                    entity_id_column(link.owner)
                } else {
                    join.owner.name.clone()
                };
                required.insert(RequiredJoin {
                    join_table: join.name.clone(),
                    column,
                    parent_table: owner_table.to_string(),
                });
            }
            joins.entry(join.name.clone()).or_insert(join);
        }

        (joins.into_values().collect(), required.into_iter().collect())
    }

    fn plain_join(&self, name: String, link: &Link) -> JoinTable {
        JoinTable {
            name,
            owner: self.join_column(entity_id_column(link.owner), link.owner),
            target: self.join_column(entity_id_column(link.target()), link.target()),
        }
    }

    fn indexes(&self, tables: &[Table]) -> Result<Vec<UniqueIndex>, GenerateError> {
        let mut indexes = Vec::new();
        for (name, entity) in &self.schema.entities {
            let table_name = self.table_of(name);
            let Some(table) = tables.iter().find(|t| t.name == table_name) else {
                continue;
            };
            for (position, key) in entity.natural_keys.iter().enumerate() {
                if key.fields.is_empty() {
                    continue;
                }
                if let Some(field) = key
                    .fields
                    .iter()
                    .find(|f| !table.columns.iter().any(|c| &c.name == *f))
                {
                    return Err(GenerateError::UnknownNaturalKeyField {
                        entity: name.clone(),
                        field: field.clone(),
                    });
                }
                indexes.push(UniqueIndex {
                    name: format!("idx_{table_name}_nk_{}", position + 1),
                    table: table_name.to_string(),
                    columns: key.fields.clone(),
                });
            }
        }
        Ok(indexes)
    }

    fn column_type(
        &self,
        ty: &SemanticType,
    ) -> Result<(ColumnType, Option<Vec<String>>), ResolveError> {
        let mapped = match ty {
            SemanticType::Primitive(p) => (primitive_type(p), None),
            SemanticType::EnumRef(name) => {
                let allowed = self
                    .resolver
                    .enumeration(name)
                    .filter(|e| !e.values.is_empty())
                    .map(|e| e.values.clone());
                (ColumnType::Text, allowed)
            }
            SemanticType::DefinitionRef(name) => match WellKnown::from_definition(name) {
                Some(known) if known.is_identifier() => (ColumnType::Uuid, None),
                Some(_) => (ColumnType::Timestamp, None),
                None => {
                    let underlying = self.resolver.underlying(ty)?;
                    self.column_type(&underlying)?
                }
            },
            SemanticType::Array(_) | SemanticType::Object(_) | SemanticType::Any => {
                (ColumnType::Json, None)
            }
        };
        Ok(mapped)
    }
}

fn primitive_type(p: &Primitive) -> ColumnType {
    if p.is_uuid() {
        return ColumnType::Uuid;
    }
    if p.is_chronological() {
        return ColumnType::Timestamp;
    }
    match p.kind {
        PrimitiveKind::String => ColumnType::Text,
        PrimitiveKind::Integer => ColumnType::Integer,
        PrimitiveKind::Number => ColumnType::Number,
        PrimitiveKind::Boolean => ColumnType::Boolean,
    }
}

/// Order tables so referenced tables come first, breaking ties by name.
/// Inside a reference cycle the lexicographically first table goes first and
/// its foreign keys into the cycle are marked `forward`.
fn order_tables(tables: &mut Vec<Table>) {
    let mut remaining: BTreeMap<String, Table> =
        tables.drain(..).map(|t| (t.name.clone(), t)).collect();
    let mut created: BTreeSet<String> = BTreeSet::new();

    while !remaining.is_empty() {
        let ready = remaining
            .iter()
            .find(|(name, table)| {
                table.foreign_keys.iter().all(|fk| {
                    fk.references == **name
                        || created.contains(&fk.references)
                        || !remaining.contains_key(&fk.references)
                })
            })
            .map(|(name, _)| name.clone());

        let name = match ready {
            Some(name) => name,
            None => {
                let Some(first) = remaining
                    .keys()
                    .find(|name| in_cycle(&remaining, name))
                    .or_else(|| remaining.keys().next())
                    .cloned()
                else {
                    break;
                };
                tracing::debug!(table = %first, "breaking foreign key cycle");
                first
            }
        };
        let Some(mut table) = remaining.remove(&name) else {
            break;
        };
        for fk in &mut table.foreign_keys {
            fk.forward = fk.references != table.name && remaining.contains_key(&fk.references);
        }
        created.insert(name);
        tables.push(table);
    }
}

/// Whether `start` can reach itself through foreign keys between
/// not-yet-created tables.
fn in_cycle(remaining: &BTreeMap<String, Table>, start: &str) -> bool {
    let mut stack = vec![start];
    let mut seen = BTreeSet::new();
    while let Some(name) = stack.pop() {
        let Some(table) = remaining.get(name) else {
            continue;
        };
        for fk in &table.foreign_keys {
            if fk.references == table.name || !remaining.contains_key(&fk.references) {
                continue;
            }
            if fk.references == start {
                return true;
            }
            if seen.insert(fk.references.as_str()) {
                stack.push(fk.references.as_str());
            }
        }
    }
    false
}
