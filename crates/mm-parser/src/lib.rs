//! Matmakefile parser (component C7): turns source text into a
//! [`TargetPropertyCollection`] plus the `external`/`dependency` directives,
//! grounded line-by-line on the original `parseMatmakeFile`.

pub mod error;

pub use error::{ParseError, ParseReason, ParseResult};
use mm_props::TargetPropertyCollection;
use mm_token::{tokenize_line, Location, NameDescriptor, Tokens};

fn is_operator(s: &str) -> bool {
    matches!(s, "=" | "+=" | "-=")
}

/// An `external`/`dependency` directive (spec's supplemented external
/// build step): `dependency` runs before the local build, `external` after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDependency {
    pub compile_before: bool,
    pub name: String,
    pub arguments: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedMatmakefile {
    pub properties: TargetPropertyCollection,
    pub externals: Vec<ExternalDependency>,
}

/// Parse a full Matmakefile's contents.
pub fn parse(contents: &str) -> ParseResult<ParsedMatmakefile> {
    let mut properties = TargetPropertyCollection::new();
    let mut externals = Vec::new();
    let lines: Vec<&str> = contents.lines().collect();
    let mut i = 0usize;

    while i < lines.len() {
        let line_number = i + 1;
        let line = lines[i];
        i += 1;

        let words = tokenize_line(line, line_number);
        if words.is_empty() {
            continue;
        }
        let word_slice = words.as_slice();

        let op_index = word_slice
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, t)| is_operator(&t.text))
            .map(|(idx, _)| idx);

        if let Some(idx) = op_index {
            let name_tokens: Tokens = word_slice[..idx].iter().cloned().collect();
            let op = word_slice[idx].text.clone();
            let mut value: Tokens = word_slice[idx + 1..].iter().cloned().collect();

            if value.is_empty() {
                value = read_multiline_argument(&lines, &mut i);
            }

            let name = NameDescriptor::parse(&name_tokens);
            let location = name_tokens.iter().next().map(|t| t.location).unwrap_or_default();

            match op.as_str() {
                "=" => {
                    properties.set(&name.target_name, &name.property_name, value, location)?;
                }
                "+=" => {
                    properties.append(&name.target_name, &name.property_name, &value);
                }
                // "-=" is recognized as an operator but the original engine
                // never implements it; kept a silent no-op for parity.
                _ => {}
            }
        } else if word_slice.len() >= 2 && word_slice[0].text == "external" {
            externals.push(ExternalDependency {
                compile_before: false,
                name: word_slice[1].text.clone(),
                arguments: word_slice[2..].iter().map(|t| t.text.clone()).collect(),
                location: word_slice[0].location,
            });
        } else if word_slice.len() >= 2 && word_slice[0].text == "dependency" {
            externals.push(ExternalDependency {
                compile_before: true,
                name: word_slice[1].text.clone(),
                arguments: word_slice[2..].iter().map(|t| t.text.clone()).collect(),
                location: word_slice[0].location,
            });
        } else {
            return Err(ParseReason::MissingOperator {
                line: line.to_string(),
                location: word_slice[0].location,
            }
            .into());
        }
    }

    Ok(ParsedMatmakefile { properties, externals })
}

/// Consume every following line that starts with whitespace as a
/// continuation of a value left empty on its own line.
fn read_multiline_argument(lines: &[&str], i: &mut usize) -> Tokens {
    let mut value = Tokens::new();
    while *i < lines.len() && lines[*i].starts_with(char::is_whitespace) {
        let line_number = *i + 1;
        let cont = tokenize_line(lines[*i], line_number);
        *i += 1;
        value.append(&cont);
        if let Some(last) = value.0.last_mut() {
            if last.trailing_space.is_empty() {
                last.trailing_space.push(' ');
            }
        }
    }
    value
}
