//! Submission name composition.
//!
//! A field's `name` attribute is never stored. It is derived on every read
//! from the field's own name (its slug unless overridden), the stack of base
//! names above it, and whether the field submits multiple values:
//!
//! | own name | base names | multiple | result |
//! |----------|------------|----------|--------|
//! | `email` | `[]` | no | `email` |
//! | `email` | `[user]` | no | `user[email]` |
//! | `city` | `[user, addr]` | yes | `user[addr][city][]` |
//! | `address.city` | `[user]` | no | `user[address][city]` |
//! | `token` | `[user, <anchor>]` | no | `token` |
//!
//! An [`NameSegment::Anchor`] discards everything accumulated before it and
//! lets the next segment start a fresh root name.

use std::fmt;

/// One entry in a base-name stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameSegment {
    /// A prefix segment, wrapped in brackets unless it is the root.
    Name(String),
    /// Discards the accumulated name; the next segment becomes the root.
    Anchor,
}

impl NameSegment {
    /// Creates a named segment.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl From<&str> for NameSegment {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for NameSegment {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

/// A field's base names: either a stack of segments or suppressed.
///
/// When suppressed the field has no `name` attribute at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseNames {
    /// Segments, outermost first.
    List(Vec<NameSegment>),
    /// No name is generated.
    Suppressed,
}

impl Default for BaseNames {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl BaseNames {
    /// Returns the segments, or `None` when suppressed.
    pub fn segments(&self) -> Option<&[NameSegment]> {
        match self {
            Self::List(segments) => Some(segments),
            Self::Suppressed => None,
        }
    }

    /// Pushes a segment. Suppressed base names stay suppressed.
    pub fn push(&mut self, segment: NameSegment, on_top: bool) {
        if let Self::List(segments) = self {
            if on_top {
                segments.insert(0, segment);
            } else {
                segments.push(segment);
            }
        }
    }
}

/// The name a field composes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OwnName {
    /// Use the field's slug.
    #[default]
    Slug,
    /// Use an explicit name.
    Custom(String),
    /// Render without a `name` attribute.
    Suppressed,
}

impl fmt::Display for OwnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slug => f.write_str("<slug>"),
            Self::Custom(name) => f.write_str(name),
            Self::Suppressed => f.write_str("<none>"),
        }
    }
}

#[derive(Clone, Copy)]
enum Segment<'a> {
    Name(&'a str),
    Anchor,
}

impl<'a> From<&'a NameSegment> for Segment<'a> {
    fn from(value: &'a NameSegment) -> Self {
        match value {
            NameSegment::Name(name) => Segment::Name(name),
            NameSegment::Anchor => Segment::Anchor,
        }
    }
}

/// Composes a bracketed submission name.
///
/// Returns `None` when `own` is [`OwnName::Suppressed`]. The own name is
/// split on `.` so dotted slugs nest like base names do.
///
/// ```rust
/// use formwork::naming::{compose, NameSegment, OwnName};
///
/// let base = [NameSegment::name("user"), NameSegment::name("addr")];
/// assert_eq!(
///     compose(&OwnName::Slug, "city", &base, true).as_deref(),
///     Some("user[addr][city][]")
/// );
/// assert_eq!(compose(&OwnName::Suppressed, "city", &base, false), None);
/// ```
pub fn compose(own: &OwnName, slug: &str, base: &[NameSegment], multiple: bool) -> Option<String> {
    let own_name = match own {
        OwnName::Suppressed => return None,
        OwnName::Slug => slug,
        OwnName::Custom(name) => name.as_str(),
    };

    let segments = base
        .iter()
        .map(Segment::from)
        .chain(own_name.split('.').map(Segment::Name));

    let mut acc: Option<String> = None;
    for segment in segments {
        let Segment::Name(name) = segment else {
            acc = None;
            continue;
        };
        match acc {
            Some(ref mut current) => {
                current.push('[');
                current.push_str(name);
                current.push(']');
            }
            None => acc = Some(name.to_string()),
        }
    }

    // The own name always contributes at least one segment.
    let mut name = acc.unwrap_or_default();
    if multiple {
        name.push_str("[]");
    }
    Some(name)
}

/// Converts a composed name into an identifier without brackets, usable as
/// a DOM id or CSS selector fragment.
///
/// `.` becomes `_`, `[]` is dropped, `[` becomes `.`, `]` is dropped, in that
/// order.
pub fn safe_name(name: &str) -> String {
    name.replace('.', "_")
        .replace("[]", "")
        .replace('[', ".")
        .replace(']', "")
}

/// Converts bracket syntax to dotted key-path syntax (`user[tags][]` →
/// `user.tags`).
pub fn dot_name(name: &str) -> String {
    name.replace('[', ".")
        .replace(']', "")
        .trim_matches('.')
        .to_string()
}

/// `select_range` → `SelectRange`.
pub(crate) fn studly(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

/// `first_name` → `First Name`.
pub(crate) fn title_from_slug(slug: &str) -> String {
    slug.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `firstName` → `first_name` (with `slug_char = '_'`).
pub(crate) fn slug_from_camel(value: &str, slug_char: char) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push(slug_char);
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<NameSegment> {
        values.iter().map(|v| NameSegment::from(*v)).collect()
    }

    #[test]
    fn test_compose_documented_cases() {
        assert_eq!(compose(&OwnName::Slug, "email", &[], false).as_deref(), Some("email"));
        assert_eq!(
            compose(&OwnName::Slug, "email", &names(&["user"]), false).as_deref(),
            Some("user[email]")
        );
        assert_eq!(
            compose(&OwnName::Slug, "city", &names(&["user", "addr"]), true).as_deref(),
            Some("user[addr][city][]")
        );
        assert_eq!(compose(&OwnName::Suppressed, "city", &names(&["user"]), true), None);
    }

    #[test]
    fn test_compose_custom_and_dotted() {
        let own = OwnName::Custom("contact".into());
        assert_eq!(
            compose(&own, "email", &names(&["user"]), false).as_deref(),
            Some("user[contact]")
        );
        assert_eq!(
            compose(&OwnName::Slug, "address.city", &names(&["user"]), false).as_deref(),
            Some("user[address][city]")
        );
    }

    #[test]
    fn test_compose_leading_anchor() {
        let base = vec![NameSegment::Anchor, NameSegment::name("meta")];
        assert_eq!(
            compose(&OwnName::Slug, "token", &base, false).as_deref(),
            Some("meta[token]")
        );
    }

    #[test]
    fn test_compose_anchor_drops_outer_prefixes() {
        let base = vec![NameSegment::name("user"), NameSegment::Anchor];
        assert_eq!(compose(&OwnName::Slug, "token", &base, false).as_deref(), Some("token"));
    }

    #[test]
    fn test_compose_consecutive_anchors_collapse() {
        let leading = vec![NameSegment::Anchor, NameSegment::Anchor, NameSegment::name("meta")];
        assert_eq!(
            compose(&OwnName::Slug, "token", &leading, false).as_deref(),
            Some("meta[token]")
        );

        let trailing = vec![NameSegment::name("user"), NameSegment::Anchor, NameSegment::Anchor];
        assert_eq!(compose(&OwnName::Slug, "token", &trailing, true).as_deref(), Some("token[]"));
    }

    #[test]
    fn test_compose_anchor_between_names() {
        let base = vec![NameSegment::name("a"), NameSegment::Anchor, NameSegment::name("b")];
        assert_eq!(compose(&OwnName::Slug, "slug", &base, false).as_deref(), Some("b[slug]"));

        let base = vec![
            NameSegment::name("a"),
            NameSegment::name("x"),
            NameSegment::Anchor,
            NameSegment::name("b"),
            NameSegment::name("c"),
        ];
        assert_eq!(compose(&OwnName::Slug, "slug", &base, false).as_deref(), Some("b[c][slug]"));
    }

    #[test]
    fn test_safe_name_second_pass_rewrites_dots() {
        assert_eq!(safe_name("a[b]"), "a.b");
        assert_eq!(safe_name(&safe_name("a[b]")), "a_b");
        assert_eq!(safe_name(&safe_name("email[]")), "email");
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("user[addr][city][]"), "user.addr.city");
        assert_eq!(safe_name("a.b[c]"), "a_b.c");
        assert_eq!(safe_name("email"), "email");
    }

    #[test]
    fn test_dot_name() {
        assert_eq!(dot_name("user[email]"), "user.email");
        assert_eq!(dot_name("user[tags][]"), "user.tags");
        assert_eq!(dot_name("email"), "email");
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(studly("select_range"), "SelectRange");
        assert_eq!(studly("text"), "Text");
        assert_eq!(title_from_slug("first_name"), "First Name");
        assert_eq!(title_from_slug("EMAIL"), "Email");
        assert_eq!(slug_from_camel("firstName", '_'), "first_name");
        assert_eq!(slug_from_camel("email", '_'), "email");
    }

    #[test]
    fn test_base_names_push() {
        let mut base = BaseNames::default();
        base.push(NameSegment::name("b"), false);
        base.push(NameSegment::name("a"), true);
        assert_eq!(base.segments(), Some(names(&["a", "b"]).as_slice()));

        let mut suppressed = BaseNames::Suppressed;
        suppressed.push(NameSegment::name("a"), false);
        assert_eq!(suppressed, BaseNames::Suppressed);
    }
}
