use crate::token::{Location, Token, Tokens};

/// A parsed `target.property` (or bare `property`, implicitly on the
/// `root` target) reference, as it appears on the left side of an
/// assignment in a Matmakefile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDescriptor {
    pub target_name: String,
    pub property_name: String,
}

impl NameDescriptor {
    /// Merge every token with no trailing whitespace into a single run (so
    /// `main . out` and `main.out` parse the same), then classify the
    /// merged text: a bare word is a property on the implicit `root`
    /// target; exactly one `.` splits it into `target.property`; anything
    /// else (no dot, more than one dot) is an empty descriptor.
    pub fn parse(tokens: &Tokens) -> Self {
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();

        match joined.split_once('.') {
            Some((target, property)) if !target.is_empty() && !property.contains('.') => Self {
                target_name: target.to_string(),
                property_name: property.to_string(),
            },
            Some(_) => Self {
                target_name: "root".to_string(),
                property_name: String::new(),
            },
            None => Self {
                target_name: "root".to_string(),
                property_name: joined,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.property_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize_line;

    #[test]
    fn bare_property_targets_root() {
        let toks = tokenize_line("flags", 1);
        let name = NameDescriptor::parse(&toks);
        assert_eq!(name.target_name, "root");
        assert_eq!(name.property_name, "flags");
    }

    #[test]
    fn dotted_property_splits_target_and_property() {
        let toks = tokenize_line("main.out", 1);
        let name = NameDescriptor::parse(&toks);
        assert_eq!(name.target_name, "main");
        assert_eq!(name.property_name, "out");
    }

    #[test]
    fn spaced_dotted_property_parses_the_same_as_unspaced() {
        let toks = tokenize_line("main . out", 1);
        let name = NameDescriptor::parse(&toks);
        assert_eq!(name.target_name, "main");
        assert_eq!(name.property_name, "out");
    }

    #[test]
    fn empty_input_yields_empty_descriptor() {
        let toks = Tokens::new();
        let name = NameDescriptor::parse(&toks);
        assert!(name.is_empty());
    }

    #[test]
    fn location_is_irrelevant_to_merge() {
        let toks = tokenize_line("a.b.c", 1);
        let name = NameDescriptor::parse(&toks);
        // four merged segments (a, ., b, ., c collapse to one run) don't
        // match the 1- or 3-token shape, so this falls back to empty.
        assert!(name.is_empty());
        let _ = Location::default();
    }
}
