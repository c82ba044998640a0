//! SQL dialects and column types.

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Postgres, Dialect::Sqlite];

    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Commit-time required-join checks need deferrable constraint triggers.
    pub fn supports_required_join_triggers(self) -> bool {
        matches!(self, Self::Postgres)
    }

    /// Postgres resolves `REFERENCES` at `CREATE TABLE` time, so a foreign key
    /// to a table created later has to be added afterwards. SQLite resolves
    /// references lazily.
    pub fn requires_declared_references(self) -> bool {
        matches!(self, Self::Postgres)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Dialect-independent column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Uuid,
    Timestamp,
    Integer,
    Number,
    Boolean,
    Json,
}

impl ColumnType {
    pub fn sql(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (Self::Text, _) => "TEXT",
            (Self::Uuid, Dialect::Postgres) => "UUID",
            (Self::Uuid, Dialect::Sqlite) => "TEXT",
            (Self::Timestamp, Dialect::Postgres) => "TIMESTAMPTZ",
            (Self::Timestamp, Dialect::Sqlite) => "TEXT",
            (Self::Integer, _) => "INTEGER",
            (Self::Number, Dialect::Postgres) => "DOUBLE PRECISION",
            (Self::Number, Dialect::Sqlite) => "REAL",
            (Self::Boolean, _) => "BOOLEAN",
            (Self::Json, Dialect::Postgres) => "JSONB",
            (Self::Json, Dialect::Sqlite) => "TEXT",
        }
    }

    /// Types an `id` column may have.
    pub fn is_identifier(self) -> bool {
        matches!(self, Self::Uuid | Self::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_table() {
        use ColumnType::*;
        let expected = [
            (Text, "TEXT", "TEXT"),
            (Uuid, "UUID", "TEXT"),
            (Timestamp, "TIMESTAMPTZ", "TEXT"),
            (Integer, "INTEGER", "INTEGER"),
            (Number, "DOUBLE PRECISION", "REAL"),
            (Boolean, "BOOLEAN", "BOOLEAN"),
            (Json, "JSONB", "TEXT"),
        ];
        for (ty, pg, lite) in expected {
            assert_eq!(ty.sql(Dialect::Postgres), pg, "{ty:?}");
            assert_eq!(ty.sql(Dialect::Sqlite), lite, "{ty:?}");
        }
    }

    #[test]
    fn dialect_names() {
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::Sqlite.to_string(), "sqlite");
    }
}
