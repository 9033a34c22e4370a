//! CSS selector parsing and matching
//!
//! Supported grammar (comma separated groups):
//!
//! ```text
//! complex  := compound (combinator compound)*
//! combinator := ' ' | '>' | '+' | '~'
//! compound := (type | '*')? ( '#id' | '.class' | '[attr op value i?]' | ':pseudo' )*
//! ```
//!
//! Pseudo classes: `first-child`, `last-child`, `only-child`,
//! `first-of-type`, `last-of-type`, `nth-child(an+b)`, `empty`, `root`,
//! `checked`, `disabled`, `enabled`, `not(compound)`.
//!
//! Matching runs right to left and backtracks through ancestors/siblings.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, DISABLEABLE_ELEMENTS};
use crate::utils::{class_tokens, is_html_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: Option<(AttrOp, String)>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    NthChild { a: i32, b: i32 },
    Empty,
    Root,
    Checked,
    Disabled,
    Enabled,
    Not(Box<Compound>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    /// `None` is the universal selector
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    /// Relation to the previous part; `None` for the leftmost one
    combinator: Option<Combinator>,
    compound: Compound,
}

/// A parsed, comma separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Vec<SelectorPart>>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        Parser::new(selector).parse_list()
    }

    /// Whether the element matches any group
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.groups
            .iter()
            .any(|parts| matches_from(arena, node_id, parts, parts.len() - 1))
    }

    /// Element descendants of `scope` matching the list, in tree order
    pub fn query_all<'a>(
        &'a self,
        arena: &'a DomArena,
        scope: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'a {
        arena
            .descendant_elements(scope)
            .filter(move |&id| self.matches(arena, id))
    }
}

fn matches_from(arena: &DomArena, node_id: NodeId, parts: &[SelectorPart], idx: usize) -> bool {
    let Ok(node) = arena.element(node_id) else {
        return false;
    };
    if !matches_compound(arena, node, &parts[idx].compound) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    match parts[idx].combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => arena
            .parent_element(node_id)
            .is_some_and(|parent| matches_from(arena, parent, parts, idx - 1)),
        Combinator::Descendant => {
            let mut cursor = arena.parent_element(node_id);
            while let Some(parent) = cursor {
                if matches_from(arena, parent, parts, idx - 1) {
                    return true;
                }
                cursor = arena.parent_element(parent);
            }
            false
        }
        Combinator::AdjacentSibling => previous_element_siblings(arena, node_id)
            .first()
            .is_some_and(|&sibling| matches_from(arena, sibling, parts, idx - 1)),
        Combinator::GeneralSibling => previous_element_siblings(arena, node_id)
            .into_iter()
            .any(|sibling| matches_from(arena, sibling, parts, idx - 1)),
    }
}

/// Element siblings of a node, split around it (`before` nearest first)
fn element_siblings(arena: &DomArena, node_id: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
    let Some(parent) = arena.get(node_id).ok().and_then(|n| n.parent_id) else {
        return (Vec::new(), Vec::new());
    };
    let Ok(children) = arena.element_children(parent) else {
        return (Vec::new(), Vec::new());
    };
    let children: Vec<NodeId> = children.collect();
    let pos = children.iter().position(|&id| id == node_id).unwrap_or(0);
    let mut before = children[..pos].to_vec();
    before.reverse();
    let after = children.get(pos + 1..).map(<[_]>::to_vec).unwrap_or_default();
    (before, after)
}

fn previous_element_siblings(arena: &DomArena, node_id: NodeId) -> Vec<NodeId> {
    element_siblings(arena, node_id).0
}

fn same_tag(arena: &DomArena, ids: &[NodeId], tag: &str) -> usize {
    ids.iter()
        .filter(|&&id| arena.get(id).is_ok_and(|n| n.node_name == tag))
        .count()
}

fn matches_compound(arena: &DomArena, node: &DomNode, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag {
        if !node.node_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if node.attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let tokens = class_tokens(node.attr("class"));
        if !compound.classes.iter().all(|c| tokens.contains(c)) {
            return false;
        }
    }
    if !compound.attrs.iter().all(|a| matches_attr(node, a)) {
        return false;
    }
    compound
        .pseudos
        .iter()
        .all(|p| matches_pseudo(arena, node, p))
}

fn matches_attr(node: &DomNode, selector: &AttrSelector) -> bool {
    let Some(actual) = node.attr(&selector.name) else {
        return false;
    };
    let Some((op, expected)) = &selector.op else {
        return true;
    };

    let (actual, expected) = if selector.case_insensitive {
        (actual.to_lowercase(), expected.to_lowercase())
    } else {
        (actual.to_string(), expected.clone())
    };

    match op {
        AttrOp::Equals => actual == expected,
        AttrOp::Includes => {
            !expected.is_empty()
                && !expected.chars().any(is_html_whitespace)
                && actual.split(is_html_whitespace).any(|t| t == expected)
        }
        AttrOp::DashMatch => actual == expected || actual.starts_with(&format!("{}-", expected)),
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

fn matches_pseudo(arena: &DomArena, node: &DomNode, pseudo: &Pseudo) -> bool {
    match pseudo {
        Pseudo::FirstChild => element_siblings(arena, node.node_id).0.is_empty(),
        Pseudo::LastChild => element_siblings(arena, node.node_id).1.is_empty(),
        Pseudo::OnlyChild => {
            let (before, after) = element_siblings(arena, node.node_id);
            before.is_empty() && after.is_empty()
        }
        Pseudo::FirstOfType => {
            let (before, _) = element_siblings(arena, node.node_id);
            same_tag(arena, &before, &node.node_name) == 0
        }
        Pseudo::LastOfType => {
            let (_, after) = element_siblings(arena, node.node_id);
            same_tag(arena, &after, &node.node_name) == 0
        }
        Pseudo::NthChild { a, b } => {
            let position = element_siblings(arena, node.node_id).0.len() as i64 + 1;
            nth_matches(*a, *b, position)
        }
        Pseudo::Empty => node.children_ids.iter().all(|&id| {
            arena
                .get(id)
                .map(|child| !child.is_element() && !(child.is_text() && !child.node_value.is_empty()))
                .unwrap_or(true)
        }),
        Pseudo::Root => node.parent_id == Some(crate::types::DOCUMENT_NODE_ID),
        Pseudo::Checked => {
            if node.is_tag("input") {
                let kind = node.attr("type").unwrap_or("").to_ascii_lowercase();
                (kind == "checkbox" || kind == "radio")
                    && node.dirty_checked.unwrap_or_else(|| node.has_attr("checked"))
            } else {
                node.is_tag("option") && node.has_attr("selected")
            }
        }
        Pseudo::Disabled => is_disableable(node) && node.has_attr("disabled"),
        Pseudo::Enabled => is_disableable(node) && !node.has_attr("disabled"),
        Pseudo::Not(inner) => !matches_compound(arena, node, inner),
    }
}

fn is_disableable(node: &DomNode) -> bool {
    DISABLEABLE_ELEMENTS.iter().any(|tag| node.is_tag(tag))
}

/// `an+b` matches 1-based `position` for some n >= 0
/// Widened to `i64` so any pair of parsed `i32` coefficients is overflow free
fn nth_matches(a: i32, b: i32, position: i64) -> bool {
    let (a, b) = (i64::from(a), i64::from(b));
    if a == 0 {
        return position == b;
    }
    let diff = position - b;
    diff % a == 0 && diff / a >= 0
}

/// Parse the argument of `:nth-child(...)`
fn parse_nth(raw: &str) -> Option<(i32, i32)> {
    let arg: String = raw
        .chars()
        .filter(|c| !is_html_whitespace(*c))
        .collect::<String>()
        .to_ascii_lowercase();

    match arg.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        "" => return None,
        _ => {}
    }

    match arg.split_once('n') {
        Some((a, b)) => {
            let a = match a {
                "" | "+" => 1,
                "-" => -1,
                other => other.parse().ok()?,
            };
            let b = if b.is_empty() {
                0
            } else if b.starts_with('+') || b.starts_with('-') {
                b.parse().ok()?
            } else {
                return None;
            };
            Some((a, b))
        }
        None => Some((0, arg.parse().ok()?)),
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::selector(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// Returns whether any whitespace was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(is_html_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn parse_list(mut self) -> Result<SelectorList> {
        let mut groups = Vec::new();
        loop {
            self.skip_whitespace();
            groups.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            }
        }
        Ok(SelectorList { groups })
    }

    fn parse_complex(&mut self) -> Result<Vec<SelectorPart>> {
        let mut parts = vec![SelectorPart {
            combinator: None,
            compound: self.parse_compound()?,
        }];

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::AdjacentSibling,
                Some('~') => Combinator::GeneralSibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            parts.push(SelectorPart {
                combinator: Some(combinator),
                compound: self.parse_compound()?,
            });
        }

        Ok(parts)
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let start = self.pos;
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
            }
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudos.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(format!("unexpected '{}'", c)),
                None => self.error("expected a selector"),
            });
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut out = String::new();
        match self.peek() {
            Some(c) if is_ident_start(c) => {}
            Some('\\') => {}
            Some(c) => return Err(self.error(format!("expected identifier, found '{}'", c))),
            None => return Err(self.error("expected identifier, found end of input")),
        }
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                let escaped = self
                    .bump()
                    .ok_or_else(|| self.error("dangling escape"))?;
                out.push(escaped);
            } else if is_ident_char(c) {
                self.pos += 1;
                out.push(c);
            } else {
                break;
            }
        }
        Ok(out)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttrSelector {
                    name,
                    op: None,
                    case_insensitive: false,
                })
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            Some(c) => return Err(self.error(format!("unexpected '{}' in attribute selector", c))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_quoted(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.pos += 1;
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.skip_whitespace();
        }
        self.expect(']')?;

        Ok(AttrSelector {
            name,
            op: Some((op, value)),
            case_insensitive,
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| self.error("unterminated string"))?;
                    out.push(escaped);
                }
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<Pseudo> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "first-child" => Pseudo::FirstChild,
            "last-child" => Pseudo::LastChild,
            "only-child" => Pseudo::OnlyChild,
            "first-of-type" => Pseudo::FirstOfType,
            "last-of-type" => Pseudo::LastOfType,
            "empty" => Pseudo::Empty,
            "root" => Pseudo::Root,
            "checked" => Pseudo::Checked,
            "disabled" => Pseudo::Disabled,
            "enabled" => Pseudo::Enabled,
            "nth-child" => {
                self.expect('(')?;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ')') {
                    self.pos += 1;
                }
                let raw: String = self.chars[start..self.pos].iter().collect();
                self.expect(')')?;
                let (a, b) = parse_nth(&raw)
                    .ok_or_else(|| self.error(format!("invalid nth-child argument '{}'", raw)))?;
                Pseudo::NthChild { a, b }
            }
            "not" => {
                self.expect('(')?;
                self.skip_whitespace();
                let inner = self.parse_compound()?;
                self.skip_whitespace();
                self.expect(')')?;
                Pseudo::Not(Box::new(inner))
            }
            other => return Err(self.error(format!("unsupported pseudo-class ':{}'", other))),
        };
        Ok(pseudo)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DOCUMENT_NODE_ID;

    /// <div id="main" class="box">
    ///   <p class="a">  <span lang="en-US"></span> </p>
    ///   <p class="a b"></p>
    ///   <input type="checkbox" checked disabled>
    /// </div>
    fn sample() -> (DomArena, Vec<NodeId>) {
        let mut arena = DomArena::new();
        let div = arena.create_element("div");
        let p1 = arena.create_element("p");
        let span = arena.create_element("span");
        let p2 = arena.create_element("p");
        let input = arena.create_element("input");

        arena.get_mut(div).unwrap().set_attr("id", "main");
        arena.get_mut(div).unwrap().set_attr("class", "box");
        arena.get_mut(p1).unwrap().set_attr("class", "a");
        arena.get_mut(span).unwrap().set_attr("lang", "en-US");
        arena.get_mut(p2).unwrap().set_attr("class", "a b");
        arena.get_mut(input).unwrap().set_attr("type", "checkbox");
        arena.get_mut(input).unwrap().set_attr("checked", "");
        arena.get_mut(input).unwrap().set_attr("disabled", "");

        arena.append_child(DOCUMENT_NODE_ID, div).unwrap();
        arena.append_child(div, p1).unwrap();
        arena.append_child(p1, span).unwrap();
        arena.append_child(div, p2).unwrap();
        arena.append_child(div, input).unwrap();
        (arena, vec![div, p1, span, p2, input])
    }

    fn query(arena: &DomArena, selector: &str) -> Vec<NodeId> {
        SelectorList::parse(selector)
            .unwrap()
            .query_all(arena, DOCUMENT_NODE_ID)
            .collect()
    }

    #[test]
    fn test_simple_selectors() {
        let (arena, ids) = sample();
        assert_eq!(query(&arena, "#main"), vec![ids[0]]);
        assert_eq!(query(&arena, ".a"), vec![ids[1], ids[3]]);
        assert_eq!(query(&arena, "p.a.b"), vec![ids[3]]);
        assert_eq!(query(&arena, "SPAN"), vec![ids[2]]);
        assert_eq!(query(&arena, "*").len(), 5);
    }

    #[test]
    fn test_combinators() {
        let (arena, ids) = sample();
        assert_eq!(query(&arena, "div span"), vec![ids[2]]);
        assert_eq!(query(&arena, "div > span"), Vec::<NodeId>::new());
        assert_eq!(query(&arena, "p + p"), vec![ids[3]]);
        assert_eq!(query(&arena, "p ~ input"), vec![ids[4]]);
        assert_eq!(query(&arena, "#main>p>span"), vec![ids[2]]);
    }

    #[test]
    fn test_groups_in_tree_order() {
        let (arena, ids) = sample();
        assert_eq!(query(&arena, "input, #main, span"), vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn test_attribute_selectors() {
        let (arena, ids) = sample();
        assert_eq!(query(&arena, "[lang]"), vec![ids[2]]);
        assert_eq!(query(&arena, "[lang|=en]"), vec![ids[2]]);
        assert_eq!(query(&arena, "[class~=b]"), vec![ids[3]]);
        assert_eq!(query(&arena, "[type='CHECKBOX' i]"), vec![ids[4]]);
        assert_eq!(query(&arena, "[type=\"CHECKBOX\"]"), Vec::<NodeId>::new());
        assert_eq!(query(&arena, "[id^=ma][id$=in][id*=a]"), vec![ids[0]]);
    }

    #[test]
    fn test_pseudo_classes() {
        let (arena, ids) = sample();
        assert_eq!(query(&arena, "p:first-child"), vec![ids[1]]);
        assert_eq!(query(&arena, ":last-child"), vec![ids[0], ids[2], ids[4]]);
        assert_eq!(query(&arena, "p:last-of-type"), vec![ids[3]]);
        assert_eq!(query(&arena, ":nth-child(2n+1)"), vec![ids[0], ids[1], ids[2], ids[4]]);
        assert_eq!(query(&arena, "div :nth-child(even)"), vec![ids[3]]);
        assert_eq!(query(&arena, ":root"), vec![ids[0]]);
        assert_eq!(query(&arena, "p:empty"), vec![ids[3]]);
        assert_eq!(query(&arena, "input:checked:disabled"), vec![ids[4]]);
        assert_eq!(query(&arena, "p:not(.b)"), vec![ids[1]]);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "div >", "..a", "#", "[a", "p:hover", "a::before", "p,", ":nth-child(x)", "a!"] {
            assert!(
                matches!(SelectorList::parse(bad), Err(DomError::InvalidSelector { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_nth_parsing() {
        assert_eq!(parse_nth("odd"), Some((2, 1)));
        assert_eq!(parse_nth(" -n + 3 "), Some((-1, 3)));
        assert_eq!(parse_nth("4"), Some((0, 4)));
        assert_eq!(parse_nth("2n"), Some((2, 0)));
        assert_eq!(parse_nth("n5"), None);
        assert!(nth_matches(-1, 3, 3));
        assert!(!nth_matches(-1, 3, 4));
        assert_eq!(parse_nth("n+99999999999"), None);
        assert_eq!(parse_nth("-3000000000n"), None);
    }

    #[test]
    fn test_nth_extreme_coefficients() {
        let (arena, ids) = sample();
        assert!(query(&arena, ":nth-child(-n-2147483647)").is_empty());
        assert!(query(&arena, ":nth-child(-2147483648n-2147483648)").is_empty());
        assert_eq!(query(&arena, "div :nth-child(n-2147483648)"), ids[1..].to_vec());
        assert!(matches!(
            SelectorList::parse(":nth-child(n+2147483648)"),
            Err(DomError::InvalidSelector { .. })
        ));
    }
}
