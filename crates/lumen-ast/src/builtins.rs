//! Dispatch tables shared by the analyzer and the evaluator.
//!
//! Method calls are only ever routed to names listed here, and every path
//! traversal checks its segments against [`FORBIDDEN_KEYS`]. The tables are
//! plain constants so both halves of the engine agree on them without any
//! runtime registration.

/// Property names that must never be traversed.
pub const FORBIDDEN_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Methods callable on array targets.
pub const ARRAY_METHODS: &[&str] = &[
    "at", "concat", "every", "filter", "find", "findIndex", "flat", "includes", "indexOf",
    "join", "lastIndexOf", "map", "reverse", "slice", "some",
];

/// Methods callable on string targets.
pub const STRING_METHODS: &[&str] = &[
    "at", "charAt", "concat", "endsWith", "includes", "indexOf", "lastIndexOf", "padEnd",
    "padStart", "repeat", "replace", "replaceAll", "slice", "split", "startsWith", "substring",
    "toLowerCase", "toUpperCase", "trim", "trimEnd", "trimStart",
];

/// Static methods callable on `Math`.
pub const MATH_METHODS: &[&str] = &[
    "abs", "ceil", "floor", "max", "min", "pow", "round", "sign", "sqrt", "trunc",
];

/// Static methods callable on the `Date` constructor.
pub const DATE_STATIC_METHODS: &[&str] = &["now", "parse", "UTC"];

/// Methods callable on `Date` instances.
pub const DATE_INSTANCE_METHODS: &[&str] = &[
    "getDate", "getDay", "getFullYear", "getHours", "getMilliseconds", "getMinutes", "getMonth",
    "getSeconds", "getTime", "toISOString", "valueOf",
];

/// Globals that always resolve, independent of the host.
pub const BUILTIN_GLOBALS: &[&str] = &["Math", "Date"];

pub fn is_forbidden_key(key: &str) -> bool {
    FORBIDDEN_KEYS.contains(&key)
}

/// True if any `.`-separated segment of `path` is forbidden.
pub fn path_has_forbidden_key(path: &str) -> bool {
    path.split('.').any(is_forbidden_key)
}

pub fn is_array_method(method: &str) -> bool {
    ARRAY_METHODS.contains(&method)
}

pub fn is_string_method(method: &str) -> bool {
    STRING_METHODS.contains(&method)
}

pub fn is_math_method(method: &str) -> bool {
    MATH_METHODS.contains(&method)
}

pub fn is_date_static_method(method: &str) -> bool {
    DATE_STATIC_METHODS.contains(&method)
}

pub fn is_date_instance_method(method: &str) -> bool {
    DATE_INSTANCE_METHODS.contains(&method)
}

pub fn is_builtin_global(name: &str) -> bool {
    BUILTIN_GLOBALS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_keys() {
        assert!(is_forbidden_key("__proto__"));
        assert!(is_forbidden_key("constructor"));
        assert!(is_forbidden_key("prototype"));
        assert!(!is_forbidden_key("proto"));
        assert!(!is_forbidden_key("length"));
    }

    #[test]
    fn test_forbidden_path_segment() {
        assert!(path_has_forbidden_key("user.__proto__.polluted"));
        assert!(path_has_forbidden_key("constructor"));
        assert!(!path_has_forbidden_key("user.profile.name"));
    }

    #[test]
    fn test_allowlists() {
        assert!(is_array_method("filter"));
        assert!(!is_array_method("push"));
        assert!(is_string_method("toUpperCase"));
        assert!(!is_string_method("constructor"));
        assert!(is_math_method("max"));
        assert!(!is_math_method("random"));
        assert!(is_date_static_method("now"));
        assert!(is_date_instance_method("getFullYear"));
        assert!(!is_date_instance_method("setFullYear"));
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        for table in [
            ARRAY_METHODS,
            STRING_METHODS,
            MATH_METHODS,
            DATE_STATIC_METHODS,
            DATE_INSTANCE_METHODS,
        ] {
            let mut names = table.to_vec();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), table.len());
        }
    }
}
