//! Postgres constraint triggers for required join relationships.
//!
//! A required array relationship stored in a join table cannot be expressed
//! as a column constraint. Two deferred constraint triggers enforce it at
//! commit time instead: one on the parent table (a new or updated parent must
//! have a link row) and one on the join table (removing or re-pointing the
//! last link row of a surviving parent fails).

use super::plan::RequiredJoin;

pub const PARENT_FUNCTION: &str = "enforce_required_join_parent";
pub const LINK_FUNCTION: &str = "enforce_required_join_link";

/// Shared trigger functions. Emitted once, before any trigger.
pub fn functions() -> String {
    format!(
        r#"CREATE OR REPLACE FUNCTION {PARENT_FUNCTION}() RETURNS trigger
LANGUAGE plpgsql AS $$
DECLARE
    join_table text := TG_ARGV[0];
    parent_column text := TG_ARGV[1];
    found boolean;
BEGIN
    EXECUTE format('SELECT EXISTS (SELECT 1 FROM %I WHERE id::text = $1)', TG_TABLE_NAME)
        INTO found
        USING NEW.id::text;
    IF NOT found THEN
        RETURN NULL;
    END IF;
    EXECUTE format('SELECT EXISTS (SELECT 1 FROM %I WHERE %I::text = $1)', join_table, parent_column)
        INTO found
        USING NEW.id::text;
    IF NOT found THEN
        RAISE EXCEPTION '% % requires at least one row in %', TG_TABLE_NAME, NEW.id, join_table
            USING ERRCODE = 'check_violation';
    END IF;
    RETURN NULL;
END;
$$;

CREATE OR REPLACE FUNCTION {LINK_FUNCTION}() RETURNS trigger
LANGUAGE plpgsql AS $$
DECLARE
    parent_table text := TG_ARGV[0];
    parent_column text := TG_ARGV[1];
    parent_id text := to_jsonb(OLD) ->> parent_column;
    found boolean;
BEGIN
    IF parent_id IS NULL THEN
        RETURN NULL;
    END IF;
    EXECUTE format('SELECT EXISTS (SELECT 1 FROM %I WHERE id::text = $1)', parent_table)
        INTO found
        USING parent_id;
    IF NOT found THEN
        RETURN NULL;
    END IF;
    EXECUTE format('SELECT EXISTS (SELECT 1 FROM %I WHERE %I::text = $1)', TG_TABLE_NAME, parent_column)
        INTO found
        USING parent_id;
    IF NOT found THEN
        RAISE EXCEPTION '% % requires at least one row in %', parent_table, parent_id, TG_TABLE_NAME
            USING ERRCODE = 'check_violation';
    END IF;
    RETURN NULL;
END;
$$;
"#
    )
}

/// Drop-and-create statements for both triggers of one required join.
pub fn triggers(join: &RequiredJoin) -> String {
    let parent = join.parent_trigger();
    let guard = join.guard_trigger();
    format!(
        "DROP TRIGGER IF EXISTS {parent} ON {parent_table};
CREATE CONSTRAINT TRIGGER {parent}
    AFTER INSERT OR UPDATE ON {parent_table}
    DEFERRABLE INITIALLY DEFERRED
    FOR EACH ROW EXECUTE FUNCTION {PARENT_FUNCTION}('{join_table}', '{column}');

DROP TRIGGER IF EXISTS {guard} ON {join_table};
CREATE CONSTRAINT TRIGGER {guard}
    AFTER UPDATE OR DELETE ON {join_table}
    DEFERRABLE INITIALLY DEFERRED
    FOR EACH ROW EXECUTE FUNCTION {LINK_FUNCTION}('{parent_table}', '{column}');
",
        parent_table = join.parent_table,
        join_table = join.join_table,
        column = join.column,
    )
}
