//! Name spelling helpers.

/// Whether `name` can be written as a bare identifier (`obj.name`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '$' || first == '_' || unicode_ident::is_xid_start(first))
        && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
        && !is_reserved_word(name)
}

/// `foo-bar` -> `fooBar`.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    if upper {
        out.push('-');
    }
    out
}

/// `fooBar` -> `foo-bar`.
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.char_indices() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `click` -> `Click`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Click` -> `click`.
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `my-button` / `myButton` -> `MyButton`.
pub fn pascalize(name: &str) -> String {
    capitalize(&camelize(name))
}

/// Names the lexer reports as identifiers that are never context lookups.
pub(crate) fn is_reserved_word(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "export"
            | "extends"
            | "false"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "new"
            | "null"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "yield"
            | "let"
            | "await"
    )
}

/// Globals a template expression may use without going through the
/// component context.
pub(crate) fn is_template_global(name: &str) -> bool {
    matches!(
        name,
        "undefined"
            | "NaN"
            | "Infinity"
            | "Math"
            | "JSON"
            | "Number"
            | "String"
            | "Boolean"
            | "Array"
            | "Object"
            | "Date"
            | "RegExp"
            | "Map"
            | "Set"
            | "Symbol"
            | "BigInt"
            | "Intl"
            | "console"
            | "parseInt"
            | "parseFloat"
            | "isNaN"
            | "isFinite"
            | "encodeURI"
            | "encodeURIComponent"
            | "decodeURI"
            | "decodeURIComponent"
            | "require"
            | "arguments"
            | "as"
            | "of"
    )
}
