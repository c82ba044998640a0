//! Render a [`Plan`] as DDL for one dialect.

use super::dialect::Dialect;
use super::plan::{Column, ForeignKey, JoinTable, Plan, Table, UniqueIndex};
use super::triggers;

/// Banner and statement text for a plan.
pub struct SqlWriter {
    output: String,
    dialect: Dialect,
}

impl SqlWriter {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            output: String::new(),
            dialect,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn banner(&mut self, generator: &str, source: Option<&str>) {
        self.line(&format!("-- Code generated by {generator}. DO NOT EDIT."));
        if let Some(source) = source {
            self.line(&format!("-- Source of truth: {source}"));
        }
        self.line(&format!("-- Dialect: {}", self.dialect));
    }

    pub fn plan(&mut self, plan: &Plan) {
        let deferred = self.dialect.requires_declared_references();

        for table in &plan.tables {
            self.table(table, deferred);
        }
        if deferred {
            for table in &plan.tables {
                for fk in table.foreign_keys.iter().filter(|fk| fk.forward) {
                    self.deferred_foreign_key(&table.name, fk);
                }
            }
        }
        for join in &plan.join_tables {
            self.join_table(join);
        }
        for index in &plan.indexes {
            self.index(index);
        }
        if self.dialect.supports_required_join_triggers() && !plan.required_joins.is_empty() {
            self.output.push('\n');
            self.output.push_str(&triggers::functions());
            for join in &plan.required_joins {
                self.output.push('\n');
                self.output.push_str(&triggers::triggers(join));
            }
        }
    }

    fn line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn create_table(&mut self, name: &str, body: Vec<String>) {
        self.output.push('\n');
        self.line(&format!("CREATE TABLE IF NOT EXISTS {name} ("));
        let last = body.len().saturating_sub(1);
        for (i, item) in body.iter().enumerate() {
            let comma = if i == last { "" } else { "," };
            self.line(&format!("    {item}{comma}"));
        }
        self.line(");");
    }

    fn table(&mut self, table: &Table, skip_forward: bool) {
        let mut body: Vec<String> = table.columns.iter().map(|c| self.column(c)).collect();
        body.extend(
            table
                .foreign_keys
                .iter()
                .filter(|fk| !(skip_forward && fk.forward))
                .map(|fk| format!("FOREIGN KEY ({}) REFERENCES {}(id)", fk.column, fk.references)),
        );
        self.create_table(&table.name, body);
    }

    fn column(&self, column: &Column) -> String {
        let mut out = format!("{} {}", column.name, column.ty.sql(self.dialect));
        if column.not_null {
            out.push_str(" NOT NULL");
        }
        if column.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if let Some(values) = &column.allowed {
            let list = values
                .iter()
                .map(|v| literal(v))
                .collect::<Vec<_>>()
                .join(", ");
            if column.not_null {
                out.push_str(&format!(" CHECK ({} IN ({list}))", column.name));
            } else {
                out.push_str(&format!(
                    " CHECK (({name} IN ({list}) OR {name} IS NULL))",
                    name = column.name
                ));
            }
        }
        out
    }

    fn deferred_foreign_key(&mut self, table: &str, fk: &ForeignKey) {
        self.output.push('\n');
        self.output.push_str(&format!(
            "DO $$
BEGIN
    ALTER TABLE {table} ADD CONSTRAINT fk_{table}_{column} FOREIGN KEY ({column}) REFERENCES {references}(id);
EXCEPTION
    WHEN duplicate_object THEN NULL;
END
$$;
",
            column = fk.column,
            references = fk.references,
        ));
    }

    fn join_table(&mut self, join: &JoinTable) {
        let (owner, target) = (&join.owner, &join.target);
        let body = vec![
            format!("{} {} NOT NULL", owner.name, owner.ty.sql(self.dialect)),
            format!("{} {} NOT NULL", target.name, target.ty.sql(self.dialect)),
            format!("PRIMARY KEY ({}, {})", owner.name, target.name),
            format!(
                "FOREIGN KEY ({}) REFERENCES {}(id) ON DELETE CASCADE",
                owner.name, owner.references
            ),
            format!(
                "FOREIGN KEY ({}) REFERENCES {}(id) ON DELETE CASCADE",
                target.name, target.references
            ),
        ];
        self.create_table(&join.name, body);
    }

    fn index(&mut self, index: &UniqueIndex) {
        self.output.push('\n');
        self.line(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({});",
            index.name,
            index.table,
            index.columns.join(", ")
        ));
    }
}

/// Single-quoted SQL string literal.
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sql::dialect::ColumnType;

    fn column(name: &str, not_null: bool, allowed: Option<&[&str]>) -> Column {
        Column {
            name: name.into(),
            ty: ColumnType::Text,
            not_null,
            primary_key: false,
            allowed: allowed.map(|v| v.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn enum_checks_depend_on_nullability() {
        let writer = SqlWriter::new(Dialect::Postgres);
        assert_eq!(
            writer.column(&column("status", true, Some(&["active", "archived"]))),
            "status TEXT NOT NULL CHECK (status IN ('active', 'archived'))"
        );
        assert_eq!(
            writer.column(&column("state", false, Some(&["active", "archived"]))),
            "state TEXT CHECK ((state IN ('active', 'archived') OR state IS NULL))"
        );
    }

    #[test]
    fn enum_literals_are_escaped() {
        let writer = SqlWriter::new(Dialect::Sqlite);
        assert_eq!(
            writer.column(&column("mood", true, Some(&["it's fine"]))),
            "mood TEXT NOT NULL CHECK (mood IN ('it''s fine'))"
        );
    }

    #[test]
    fn table_layout() {
        let table = Table {
            name: "things".into(),
            entity: "Thing".into(),
            columns: vec![
                Column {
                    name: "id".into(),
                    ty: ColumnType::Uuid,
                    not_null: true,
                    primary_key: true,
                    allowed: None,
                },
                column("code", true, None),
                Column {
                    name: "owner_id".into(),
                    ty: ColumnType::Uuid,
                    not_null: false,
                    primary_key: false,
                    allowed: None,
                },
            ],
            foreign_keys: vec![ForeignKey {
                column: "owner_id".into(),
                references: "owners".into(),
                forward: false,
            }],
        };
        let mut writer = SqlWriter::new(Dialect::Postgres);
        writer.table(&table, true);
        insta::assert_snapshot!(writer.finish().trim_start(), @r"
        CREATE TABLE IF NOT EXISTS things (
            id UUID NOT NULL PRIMARY KEY,
            code TEXT NOT NULL,
            owner_id UUID,
            FOREIGN KEY (owner_id) REFERENCES owners(id)
        );
        ");
    }
}
