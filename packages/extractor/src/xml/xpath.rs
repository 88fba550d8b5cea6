//! A small XPath 1.0 subset evaluated over `roxmltree` documents.
//!
//! Concordance xpaths are plain location paths such as
//! `/Return/ReturnData/IRS990/TotalEmployeeCnt`. This module compiles those
//! into steps once and evaluates them against any node. Steps match on
//! local name, so documents in the IRS default namespace resolve without a
//! namespace map.
//!
//! Supported syntax:
//!
//! ```text
//! /a/b        absolute path, starts at the document root
//! a/b  ./a    relative path, starts at the evaluation node
//! //a  a//b   descendant step
//! *  .  ..    any element, self, parent
//! text()      text node children
//! @attr       attribute value
//! p:a         prefixed name, matched on local part `a`
//! a[2]  a[@x]  a[@x='v']   predicates
//! ```

use roxmltree::Node;
use thiserror::Error;

/// Error produced when an expression falls outside the supported subset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    #[error("empty xpath expression")]
    Empty,

    #[error("empty step in '{0}'")]
    EmptyStep(String),

    #[error("unsupported xpath syntax '{0}'")]
    Unsupported(String),

    #[error("unterminated predicate or literal in '{0}'")]
    Unterminated(String),

    #[error("'{0}' must be the last step")]
    StepAfterTerminal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    /// `descendant-or-self::node()` followed by the step on the child axis.
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    AnyElement,
    SelfNode,
    Parent,
    Text,
    Attribute(String),
}

impl NodeTest {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Text | Self::Attribute(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    HasAttribute(String),
    AttributeEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// A compiled location path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

/// A single selected item: an element (or the document root) or a string value.
#[derive(Debug, Clone, Copy)]
pub enum XPathItem<'a, 'input> {
    Node(Node<'a, 'input>),
    Value(&'a str),
}

impl<'a> XPathItem<'a, '_> {
    /// Text of the item: the leading text of an element, or the value itself.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Self::Node(node) => node.text(),
            Self::Value(value) => Some(*value),
        }
    }
}

impl XPath {
    /// Compile an expression.
    ///
    /// # Examples
    /// ```
    /// use irs990_extractor::xml::XPath;
    ///
    /// assert!(XPath::parse("/Return/ReturnHeader/Filer/EIN").is_ok());
    /// assert!(XPath::parse("//IRS990/TotalEmployeeCnt").is_ok());
    /// assert!(XPath::parse("count(//EIN)").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, XPathError> {
        let source = expression.trim();
        if source.is_empty() {
            return Err(XPathError::Empty);
        }

        let absolute = source.starts_with('/');
        let segments = split_segments(source)?;
        let mut segments = segments.into_iter();
        if absolute {
            // Leading '/' yields an empty first segment.
            segments.next();
        }

        let mut steps: Vec<Step> = Vec::new();
        let mut pending_descendant = false;

        for segment in segments {
            if segment.is_empty() {
                if pending_descendant {
                    return Err(XPathError::EmptyStep(source.to_string()));
                }
                pending_descendant = true;
                continue;
            }

            if let Some(last) = steps.last() {
                if last.test.is_terminal() {
                    return Err(XPathError::StepAfterTerminal(source.to_string()));
                }
            }

            let axis = if pending_descendant {
                Axis::Descendant
            } else {
                Axis::Child
            };
            pending_descendant = false;
            steps.push(parse_step(segment, axis)?);
        }

        if pending_descendant || steps.is_empty() {
            return Err(XPathError::EmptyStep(source.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            absolute,
            steps,
        })
    }

    /// The expression this path was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Local name tested by the final step, if it is an element name.
    pub fn leaf_name(&self) -> Option<&str> {
        match &self.steps.last()?.test {
            NodeTest::Name(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Evaluate against `node`, returning matches in document order.
    ///
    /// # Examples
    /// ```
    /// use roxmltree::Document;
    /// use irs990_extractor::xml::XPath;
    ///
    /// let xml = r#"<Return xmlns="http://www.irs.gov/efile"><ReturnHeader><TaxYr>2022</TaxYr></ReturnHeader></Return>"#;
    /// let doc = Document::parse(xml).unwrap();
    /// let path = XPath::parse("/Return/ReturnHeader/TaxYr").unwrap();
    ///
    /// let items = path.select(doc.root_element());
    /// assert_eq!(items.len(), 1);
    /// assert_eq!(items[0].text(), Some("2022"));
    /// ```
    pub fn select<'a, 'input>(&self, node: Node<'a, 'input>) -> Vec<XPathItem<'a, 'input>> {
        let start = if self.absolute {
            node.document().root()
        } else {
            node
        };

        let mut context: Vec<Node<'a, 'input>> = vec![start];
        let mut values: Vec<&'a str> = Vec::new();

        for step in &self.steps {
            let origins: Vec<Node<'a, 'input>> = match step.axis {
                Axis::Child => context,
                Axis::Descendant => {
                    let mut expanded: Vec<Node<'a, 'input>> = context
                        .iter()
                        .flat_map(|n| n.descendants())
                        .filter(|n| n.is_element() || n.is_root())
                        .collect();
                    sort_document_order(&mut expanded);
                    expanded
                }
            };

            if step.test.is_terminal() {
                values = origins
                    .iter()
                    .flat_map(|origin| select_values(*origin, &step.test))
                    .collect();
                context = Vec::new();
                break;
            }

            let mut next: Vec<Node<'a, 'input>> = Vec::new();
            for origin in origins {
                let candidates = select_nodes(origin, &step.test);
                next.extend(apply_predicates(candidates, &step.predicates));
            }
            sort_document_order(&mut next);
            context = next;

            if context.is_empty() {
                break;
            }
        }

        if values.is_empty() {
            context.into_iter().map(XPathItem::Node).collect()
        } else {
            values.into_iter().map(XPathItem::Value).collect()
        }
    }
}

fn sort_document_order(nodes: &mut Vec<Node<'_, '_>>) {
    nodes.sort_by_key(|n| n.id().get_usize());
    nodes.dedup_by_key(|n| n.id());
}

fn select_nodes<'a, 'input>(node: Node<'a, 'input>, test: &NodeTest) -> Vec<Node<'a, 'input>> {
    match test {
        NodeTest::Name(name) => node
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == name.as_str())
            .collect(),
        NodeTest::AnyElement => node.children().filter(|c| c.is_element()).collect(),
        NodeTest::SelfNode => vec![node],
        NodeTest::Parent => node.parent().into_iter().collect(),
        NodeTest::Text | NodeTest::Attribute(_) => Vec::new(),
    }
}

fn select_values<'a>(node: Node<'a, '_>, test: &NodeTest) -> Vec<&'a str> {
    match test {
        NodeTest::Text => node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect(),
        NodeTest::Attribute(name) => node
            .attributes()
            .filter(|a| a.name() == name.as_str())
            .map(|a| a.value())
            .collect(),
        _ => Vec::new(),
    }
}

fn apply_predicates<'a, 'input>(
    mut nodes: Vec<Node<'a, 'input>>,
    predicates: &[Predicate],
) -> Vec<Node<'a, 'input>> {
    for predicate in predicates {
        nodes = match predicate {
            Predicate::Position(position) => {
                nodes.into_iter().nth(position - 1).into_iter().collect()
            }
            Predicate::HasAttribute(name) => nodes
                .into_iter()
                .filter(|n| n.attributes().any(|a| a.name() == name.as_str()))
                .collect(),
            Predicate::AttributeEquals(name, value) => nodes
                .into_iter()
                .filter(|n| {
                    n.attributes()
                        .any(|a| a.name() == name.as_str() && a.value() == value.as_str())
                })
                .collect(),
        };
    }
    nodes
}

/// Split on '/' outside of predicates and quoted literals.
fn split_segments(source: &str) -> Result<Vec<&str>, XPathError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| XPathError::Unsupported(source.to_string()))?;
            }
            (None, '/') if depth == 0 => {
                segments.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(XPathError::Unterminated(source.to_string()));
    }

    segments.push(&source[start..]);
    Ok(segments)
}

fn parse_step(segment: &str, axis: Axis) -> Result<Step, XPathError> {
    let segment = segment.trim();
    let (head, tail) = match segment.find('[') {
        Some(idx) => segment.split_at(idx),
        None => (segment, ""),
    };

    let test = parse_node_test(head.trim())?;
    let predicates = parse_predicates(tail, segment)?;

    if !predicates.is_empty() && !matches!(test, NodeTest::Name(_) | NodeTest::AnyElement) {
        return Err(XPathError::Unsupported(segment.to_string()));
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

fn parse_node_test(head: &str) -> Result<NodeTest, XPathError> {
    match head {
        "" => Err(XPathError::EmptyStep(head.to_string())),
        "." => Ok(NodeTest::SelfNode),
        ".." => Ok(NodeTest::Parent),
        "*" => Ok(NodeTest::AnyElement),
        "text()" => Ok(NodeTest::Text),
        _ => {
            if let Some(attr) = head.strip_prefix('@') {
                return Ok(NodeTest::Attribute(parse_name(attr, head)?));
            }
            Ok(NodeTest::Name(parse_name(head, head)?))
        }
    }
}

/// Parse a possibly prefixed QName into its local part.
fn parse_name(name: &str, context: &str) -> Result<String, XPathError> {
    let local = match name.split_once(':') {
        Some((prefix, local)) if is_ncname(prefix) => local,
        Some(_) => return Err(XPathError::Unsupported(context.to_string())),
        None => name,
    };

    if is_ncname(local) {
        Ok(local.to_string())
    } else {
        Err(XPathError::Unsupported(context.to_string()))
    }
}

/// Check whether `name` is a valid XML name without a colon.
pub(crate) fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn parse_predicates(mut tail: &str, segment: &str) -> Result<Vec<Predicate>, XPathError> {
    let mut predicates = Vec::new();

    while !tail.is_empty() {
        let inner_start = tail
            .strip_prefix('[')
            .ok_or_else(|| XPathError::Unsupported(segment.to_string()))?;
        let end = find_predicate_end(inner_start)
            .ok_or_else(|| XPathError::Unterminated(segment.to_string()))?;
        predicates.push(parse_predicate(inner_start[..end].trim(), segment)?);
        tail = inner_start[end + 1..].trim_start();
    }

    Ok(predicates)
}

fn find_predicate_end(inner: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(inner: &str, segment: &str) -> Result<Predicate, XPathError> {
    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
        return match inner.parse::<usize>() {
            Ok(position) if position >= 1 => Ok(Predicate::Position(position)),
            _ => Err(XPathError::Unsupported(segment.to_string())),
        };
    }

    let Some(attr) = inner.strip_prefix('@') else {
        return Err(XPathError::Unsupported(segment.to_string()));
    };

    match attr.split_once('=') {
        None => Ok(Predicate::HasAttribute(parse_name(attr.trim(), segment)?)),
        Some((name, literal)) => {
            let name = parse_name(name.trim(), segment)?;
            let literal = literal.trim();
            let value = literal
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| literal.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .ok_or_else(|| XPathError::Unsupported(segment.to_string()))?;
            Ok(Predicate::AttributeEquals(name, value.to_string()))
        }
    }
}
