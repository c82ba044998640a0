//! Identifier mangling and table naming.

/// Token-level initialisms, matched case-insensitively.
const INITIALISMS: &[(&str, &str)] = &[
    ("id", "ID"),
    ("ids", "IDs"),
    ("api", "API"),
    ("url", "URL"),
    ("uuid", "UUID"),
    ("sku", "SKU"),
];

/// `housing_unit` -> `HousingUnit`, `project_ids` -> `ProjectIDs`.
///
/// Splits on `_`, `-`, space and `.`, title-cases every token and applies the
/// initialism table per token.
pub fn to_camel(input: &str) -> String {
    input
        .split(['_', '-', ' ', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| apply_initialism(&capitalize(part)))
        .collect()
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn apply_initialism(part: &str) -> String {
    INITIALISMS
        .iter()
        .find(|(token, _)| part.eq_ignore_ascii_case(token))
        .map_or_else(|| part.to_string(), |(_, replacement)| (*replacement).to_string())
}

/// `BreedingUnit` -> `breeding_unit`, `APIKey` -> `api_key`, `cage-card` -> `cage_card`.
///
/// A run of capitals is treated as one word; its last capital starts a new
/// word when followed by a lowercase letter.
pub fn to_snake(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// `facility` -> `facilities`, `project` -> `projects`; words ending in `s` are
/// left alone.
pub fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let consonant_before = stem
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiou".contains(c.to_ascii_lowercase()));
        if consonant_before {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Table name for an entity: snake_case, pluralized.
pub fn table_name(entity: &str) -> String {
    pluralize(&to_snake(entity))
}

/// Column in a join table that points at `entity`'s `id`.
pub fn entity_id_column(entity: &str) -> String {
    format!("{}_id", to_snake(entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_applies_initialisms_per_token() {
        assert_eq!(to_camel("housing_unit"), "HousingUnit");
        assert_eq!(to_camel("project_ids"), "ProjectIDs");
        assert_eq!(to_camel("api-key"), "APIKey");
        assert_eq!(to_camel("image url"), "ImageURL");
        assert_eq!(to_camel("external.uuid"), "ExternalUUID");
        assert_eq!(to_camel("SKU_code"), "SKUCode");
        assert_eq!(to_camel("in_progress"), "InProgress");
        assert_eq!(to_camel("ID"), "ID");
        assert_eq!(to_camel(""), "");
    }

    #[test]
    fn camel_lowercases_token_tails() {
        assert_eq!(to_camel("ACTIVE"), "Active");
        assert_eq!(to_camel("identity"), "Identity");
    }

    #[test]
    fn snake_respects_initialism_runs() {
        assert_eq!(to_snake("APIKey"), "api_key");
        assert_eq!(to_snake("BreedingUnit"), "breeding_unit");
        assert_eq!(to_snake("SupplyItem"), "supply_item");
        assert_eq!(to_snake("cage-card"), "cage_card");
        assert_eq!(to_snake("Organism"), "organism");
        assert_eq!(to_snake("HTTPServer2Config"), "http_server2_config");
        assert_eq!(to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn pluralize_rules() {
        assert_eq!(pluralize("facility"), "facilities");
        assert_eq!(pluralize("project"), "projects");
        assert_eq!(pluralize("status"), "status");
        assert_eq!(pluralize("api_key"), "api_keys");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("y"), "ys");
    }

    #[test]
    fn table_names() {
        assert_eq!(table_name("Facility"), "facilities");
        assert_eq!(table_name("BreedingUnit"), "breeding_units");
        assert_eq!(table_name("Thing"), "things");
        assert_eq!(entity_id_column("SupplyItem"), "supply_item_id");
    }
}
