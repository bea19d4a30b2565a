//! Naming conventions shared by the locator, the part table and the registrar.

use heck::ToUpperCamelCase;

/// Separator between namespace segments in a symbolic name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Converts a snake_case identifier to UpperCamelCase (`dev_system` -> `DevSystem`).
pub fn camelize(s: &str) -> String {
    s.to_upper_camel_case()
}

/// Name of the loadable unit backing a system key (`dev` -> `dev_system`).
pub fn system_unit_name(key: &str) -> String {
    format!("{key}_system")
}

/// Type name of a system implementation (`dev` -> `DevSystem`).
pub fn system_type_name(key: &str) -> String {
    camelize(&system_unit_name(key))
}

/// Type name of a part definition (`greeting` -> `GreetingPart`).
pub fn part_type_name(key: &str) -> String {
    camelize(&format!("{key}_part"))
}

/// Joins a namespace and a name. An empty namespace is the top level.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}{NAMESPACE_SEPARATOR}{name}")
    }
}

/// Splits at the first `_`, like a left partition.
///
/// A string without an underscore yields itself and an empty remainder.
pub fn lpartition(s: &str) -> (&str, &str) {
    s.split_once('_').unwrap_or((s, ""))
}

/// Last segment of a qualified name (`DevSystem::DevBox` -> `DevBox`).
pub fn demodulize(name: &str) -> &str {
    name.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(name)
}
