//! Selector query engine
//!
//! Parses and matches the compound-selector subset the scroll tracker
//! generates and accepts from callers:
//!
//! - type and universal selectors: `div`, `*`
//! - ids and classes: `#sidebar`, `.panel.wide`
//! - position: `:nth-child(2)`
//! - the root pseudo-class: `:root`
//! - child (`>`) and descendant (whitespace) combinators, comma lists
//!
//! Matching runs right-to-left against the element tree, in document order.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult,
};
use thiserror::Error;

use crate::element::ElementId;
use crate::tree::ElementTree;

/// Failure to parse a selector string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The selector was empty or all whitespace.
    #[error("empty selector")]
    Empty,
    /// The selector did not match the supported grammar.
    #[error("invalid selector `{0}`")]
    Parse(String),
}

/// One compound selector: every listed constraint must hold on the element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    nth_child: Option<usize>,
    root: bool,
}

/// How a compound relates to the compound on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a > b`: b's parent must match a.
    Child,
    /// `a b`: some ancestor of b must match a.
    Descendant,
}

/// A full selector: compounds joined by combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The combinator links a part to the part on its left; the first part
    /// carries `None`.
    parts: Vec<(Option<Combinator>, CompoundSelector)>,
}

enum SimplePart {
    Id(String),
    Class(String),
    NthChild(usize),
    Root,
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')(input)
}

fn nth_child(input: &str) -> IResult<&str, SimplePart> {
    map_res(
        delimited(tag(":nth-child("), digit1, char(')')),
        |digits: &str| digits.parse::<usize>().map(SimplePart::NthChild),
    )(input)
}

fn simple_part(input: &str) -> IResult<&str, SimplePart> {
    alt((
        map(preceded(char('#'), ident), |s| SimplePart::Id(s.to_string())),
        map(preceded(char('.'), ident), |s| {
            SimplePart::Class(s.to_string())
        }),
        nth_child,
        map(tag(":root"), |_| SimplePart::Root),
    ))(input)
}

fn compound(input: &str) -> IResult<&str, CompoundSelector> {
    let (input, tag_name) = opt(alt((
        map(char('*'), |_| None),
        map(ident, |s: &str| Some(s.to_ascii_lowercase())),
    )))(input)?;
    let (input, parts) = many0(simple_part)(input)?;

    if tag_name.is_none() && parts.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let mut selector = CompoundSelector {
        tag: tag_name.flatten(),
        ..CompoundSelector::default()
    };
    for part in parts {
        match part {
            SimplePart::Id(id) => selector.id = Some(id),
            SimplePart::Class(class) => selector.classes.push(class),
            SimplePart::NthChild(n) => selector.nth_child = Some(n),
            SimplePart::Root => selector.root = true,
        }
    }
    Ok((input, selector))
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        map(delimited(multispace0, char('>'), multispace0), |_| {
            Combinator::Child
        }),
        map(multispace1, |_| Combinator::Descendant),
    ))(input)
}

fn complex(input: &str) -> IResult<&str, ComplexSelector> {
    let (input, first) = compound(input)?;
    let (input, rest) = many0(pair(combinator, compound))(input)?;

    let mut parts = vec![(None, first)];
    for (comb, selector) in rest {
        parts.push((Some(comb), selector));
    }
    Ok((input, ComplexSelector { parts }))
}

/// Parse a comma-separated selector list.
pub fn parse_selector_list(input: &str) -> Result<Vec<ComplexSelector>, QueryError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Empty);
    }
    all_consuming(separated_list1(
        delimited(multispace0, char(','), multispace0),
        complex,
    ))(trimmed)
    .map(|(_, selectors)| selectors)
    .map_err(|_| QueryError::Parse(input.to_string()))
}

fn matches_compound(tree: &ElementTree, el: ElementId, selector: &CompoundSelector) -> bool {
    let Some(data) = tree.get(el) else {
        return false;
    };
    if selector.root && el != tree.root() {
        return false;
    }
    if let Some(tag) = &selector.tag {
        if data.tag() != tag {
            return false;
        }
    }
    if let Some(id) = &selector.id {
        if data.id() != Some(id.as_str()) {
            return false;
        }
    }
    if !selector
        .classes
        .iter()
        .all(|class| data.classes().iter().any(|c| c == class))
    {
        return false;
    }
    if let Some(n) = selector.nth_child {
        if tree.child_position(el) != n {
            return false;
        }
    }
    true
}

fn matches_from(
    tree: &ElementTree,
    el: ElementId,
    parts: &[(Option<Combinator>, CompoundSelector)],
    index: usize,
) -> bool {
    if !matches_compound(tree, el, &parts[index].1) {
        return false;
    }
    let Some(combinator) = parts[index].0 else {
        return true;
    };
    match combinator {
        Combinator::Child => tree
            .parent(el)
            .is_some_and(|parent| matches_from(tree, parent, parts, index - 1)),
        Combinator::Descendant => {
            let mut current = tree.parent(el);
            while let Some(ancestor) = current {
                if matches_from(tree, ancestor, parts, index - 1) {
                    return true;
                }
                current = tree.parent(ancestor);
            }
            false
        }
    }
}

/// Check a single element against a parsed selector.
pub fn matches_selector(tree: &ElementTree, el: ElementId, selector: &ComplexSelector) -> bool {
    matches_from(tree, el, &selector.parts, selector.parts.len() - 1)
}

/// All elements matching any selector in the list, in document order.
pub fn query_all(tree: &ElementTree, selectors: &[ComplexSelector]) -> Vec<ElementId> {
    tree.document_order()
        .into_iter()
        .filter(|el| selectors.iter().any(|s| matches_selector(tree, *el, s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (ElementTree, ElementId, ElementId, ElementId, ElementId) {
        // html > body > [div#main.panel, div.panel.wide > span]
        let mut tree = ElementTree::new();
        let root = tree.root();
        let body = tree.create_element("body");
        let main = tree.create_element("div");
        let aside = tree.create_element("div");
        let span = tree.create_element("span");
        tree.append_child(root, body);
        tree.append_child(body, main);
        tree.append_child(body, aside);
        tree.append_child(aside, span);
        tree.get_mut(main).unwrap().id = Some("main".into());
        tree.get_mut(main).unwrap().classes = vec!["panel".into()];
        tree.get_mut(aside).unwrap().classes = vec!["panel".into(), "wide".into()];
        (tree, body, main, aside, span)
    }

    fn query(tree: &ElementTree, selector: &str) -> Vec<ElementId> {
        query_all(tree, &parse_selector_list(selector).unwrap())
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_selector_list("  "), Err(QueryError::Empty));
        assert!(matches!(
            parse_selector_list("div >"),
            Err(QueryError::Parse(_))
        ));
        assert!(matches!(
            parse_selector_list("div,"),
            Err(QueryError::Parse(_))
        ));
        assert!(matches!(
            parse_selector_list("#"),
            Err(QueryError::Parse(_))
        ));
    }

    #[test]
    fn test_id_and_class() {
        let (tree, _, main, aside, _) = fixture();
        assert_eq!(query(&tree, "#main"), vec![main]);
        assert_eq!(query(&tree, ".panel"), vec![main, aside]);
        assert_eq!(query(&tree, ".panel.wide"), vec![aside]);
        assert_eq!(query(&tree, "div.panel#main"), vec![main]);
        assert!(query(&tree, "#missing").is_empty());
    }

    #[test]
    fn test_root_and_universal() {
        let (tree, body, main, aside, span) = fixture();
        assert_eq!(query(&tree, ":root"), vec![tree.root()]);
        assert_eq!(
            query(&tree, "*"),
            vec![tree.root(), body, main, aside, span]
        );
    }

    #[test]
    fn test_nth_child() {
        let (tree, _, main, aside, _) = fixture();
        assert_eq!(query(&tree, "div:nth-child(1)"), vec![main]);
        assert_eq!(query(&tree, "div:nth-child(2)"), vec![aside]);
    }

    #[test]
    fn test_combinators() {
        let (tree, body, main, aside, span) = fixture();
        assert_eq!(query(&tree, "body"), vec![body]);
        assert_eq!(query(&tree, "body > div"), vec![main, aside]);
        assert_eq!(query(&tree, "html span"), vec![span]);
        assert_eq!(query(&tree, "html > body > div.wide > span"), vec![span]);
        assert!(query(&tree, "html > span").is_empty());
        assert_eq!(query(&tree, "body   span"), vec![span]);
    }

    #[test]
    fn test_selector_list() {
        let (tree, _, main, aside, span) = fixture();
        assert_eq!(query(&tree, "#main, span"), vec![main, span]);
        // Duplicates collapse: an element matching both selectors appears once
        assert_eq!(query(&tree, ".panel, #main"), vec![main, aside]);
    }

    #[test]
    fn test_generated_path_shape() {
        // The exact shape the selector resolver emits
        let (tree, _, _, aside, span) = fixture();
        assert_eq!(
            query(&tree, "html > body > div.panel.wide:nth-child(2) > span"),
            vec![span]
        );
        assert_eq!(
            query(&tree, "html > body > div.panel.wide:nth-child(2)"),
            vec![aside]
        );
    }
}
