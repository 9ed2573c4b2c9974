//! Name handling shared by route derivation and the dependency registry.

const PATH_SEP: char = '/';

/// Split an identifier into words.
///
/// Underscores and dashes separate words, and so do case boundaries:
/// `GetById` and `get_by_id` both give `[get|Get, by|By, id|Id]`, an acronym
/// stays together (`HTTPServer` gives `HTTP`, `Server`), and digits form their
/// own word (`GetV2` gives `Get`, `V`, `2`).
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_ascii_digit() != c.is_ascii_digit())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join words into one lower-camel identifier: `[Hello, World]` gives `helloWorld`.
pub fn lower_camel<S: AsRef<str>>(words: &[S]) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        let word = word.as_ref();
        if i == 0 {
            if word.chars().all(|c| !c.is_lowercase()) {
                out.push_str(&word.to_lowercase());
            } else {
                out.push_str(&lower_first(word));
            }
        } else {
            out.push_str(&upper_first(word));
        }
    }
    out
}

/// Bare type identifier of a `std::any::type_name` string.
///
/// `alloc::sync::Arc<app::UserService>` gives `Arc`, `dyn app::repo::UserRepository` gives
/// `UserRepository`.
pub fn short_type_name(type_name: &str) -> &str {
    let path = strip_type_decorations(type_name);
    let path = path.split('<').next().unwrap_or(path);
    path.rsplit("::").next().unwrap_or(path)
}

/// Qualified lower-camel name used as registry key: the enclosing module and the
/// lower-camel type identifier, e.g. `app::services::UserService` gives
/// `services.userService`.
pub fn lower_camel_full_name(type_name: &str) -> String {
    let path = strip_type_decorations(type_name);
    let path = path.split('<').next().unwrap_or(path);
    let mut segments = path.rsplit("::");
    let ident = segments.next().unwrap_or(path);
    match segments.next() {
        Some(module) => format!("{}.{}", module, lower_first(ident)),
        None => lower_first(ident),
    }
}

fn strip_type_decorations(type_name: &str) -> &str {
    let mut name = type_name.trim();
    loop {
        let stripped = name
            .strip_prefix("&mut ")
            .or_else(|| name.strip_prefix('&'))
            .or_else(|| name.strip_prefix("dyn "))
            .map(str::trim_start);
        match stripped {
            Some(rest) => name = rest,
            None => return name,
        }
    }
}

/// Collapse repeated separators and drop a trailing one, except for the root.
pub fn clean_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for c in path.chars() {
        if c == PATH_SEP && out.ends_with(PATH_SEP) {
            continue;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with(PATH_SEP) {
        out.pop();
    }
    if out.is_empty() {
        out.push(PATH_SEP);
    }
    out
}
