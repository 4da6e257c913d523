// CSS-lite selectors for reader mode.
//
// Supports a comma-separated list of selectors, each a whitespace-separated
// chain of simple selectors combined as descendants: `main`, `main#id`,
// `main.class`, `div@2`, `#id`, `.class`, `ul li a`. An `@N` constraint
// matches only the N-th child (0-based, counted among all children) of its
// parent. Matching is a scan over the open-element path: each path element
// may advance the match cursor by at most one simple selector, and the
// selector matches when the cursor reaches the end before the path does.

/// Longest accepted chain of simple selectors.
const MAX_PARTS: usize = 32;
/// Longest accepted tag/id/class component, in bytes.
const MAX_COMPONENT: usize = 255;

/// One simple selector: any subset of tag name, `#id`, `.class`, `@index`.
/// Empty strings leave that aspect unconstrained.
#[derive(Debug, Clone, Default)]
struct SimplePart {
    tag: String,
    id: String,
    class: String,
    index: Option<usize>,
}

/// A descendant chain of simple selectors.
#[derive(Debug, Clone)]
struct Selector {
    parts: Vec<SimplePart>,
}

/// A disjunction of selectors, as given on the command line.
#[derive(Debug, Clone)]
pub(crate) struct SelectorList {
    selectors: Vec<Selector>,
}

/// The view of an open element that matching needs. Implemented by the
/// renderer's element frames.
pub(crate) trait PathElement {
    fn tag_name(&self) -> &str;
    fn element_id(&self) -> &str;
    fn class_names(&self) -> &str;
    /// Number of children opened under this element so far.
    fn child_count(&self) -> usize;
}

impl SelectorList {
    /// Compile a comma-separated selector list. Returns `None` when any
    /// selector in the list is empty, too deep, or has an oversized
    /// component.
    pub(crate) fn compile(text: &str) -> Option<SelectorList> {
        let mut selectors = Vec::new();
        for one in text.split(',') {
            selectors.push(compile_one(one)?);
        }
        Some(SelectorList { selectors })
    }

    /// Whether any selector in the list matches the open-element path.
    pub(crate) fn matches<E: PathElement>(&self, path: &[E]) -> bool {
        self.selectors.iter().any(|sel| sel.matches(path))
    }
}

fn compile_one(text: &str) -> Option<Selector> {
    let mut parts = Vec::new();
    for word in text.split_ascii_whitespace() {
        if parts.len() >= MAX_PARTS {
            return None;
        }
        parts.push(compile_part(word)?);
    }
    if parts.is_empty() {
        return None;
    }
    Some(Selector { parts })
}

/// Parse one simple selector: `tag`, then any sequence of `#id`, `.class`,
/// `@index` suffixes. A later suffix of the same kind overrides the earlier.
fn compile_part(word: &str) -> Option<SimplePart> {
    let mut part = SimplePart::default();
    let bytes = word.as_bytes();

    let tag_end = bytes
        .iter()
        .position(|&c| c == b'#' || c == b'.' || c == b'@')
        .unwrap_or(bytes.len());
    part.tag = component(&word[..tag_end])?;

    let mut rest = &word[tag_end..];
    while let Some(kind) = rest.bytes().next() {
        let body = &rest[1..];
        let end = body
            .bytes()
            .position(|c| c == b'#' || c == b'.' || c == b'@')
            .unwrap_or(body.len());
        let value = &body[..end];
        match kind {
            b'#' => part.id = component(value)?,
            b'.' => part.class = component(value)?,
            // A malformed index leaves the constraint off.
            b'@' => part.index = value.parse().ok(),
            _ => unreachable!("scanner stops at #, ., @"),
        }
        rest = &body[end..];
    }

    Some(part)
}

fn component(s: &str) -> Option<String> {
    if s.len() > MAX_COMPONENT {
        return None;
    }
    Some(s.to_string())
}

impl Selector {
    fn matches<E: PathElement>(&self, path: &[E]) -> bool {
        let mut cursor = 0;
        for (depth, element) in path.iter().enumerate() {
            let part = &self.parts[cursor];

            if !part.tag.is_empty() && !part.tag.eq_ignore_ascii_case(element.tag_name()) {
                continue;
            }
            if !part.id.is_empty() && part.id != element.element_id() {
                continue;
            }
            if !part.class.is_empty() && !has_class(element.class_names(), &part.class) {
                continue;
            }
            if let Some(index) = part.index {
                // The element's position is its parent's child count minus
                // one, counted at the time the element opened.
                let position = match depth.checked_sub(1).map(|d| path[d].child_count()) {
                    Some(n) if n > 0 => n - 1,
                    _ => continue,
                };
                if index != position {
                    continue;
                }
            }

            cursor += 1;
            if cursor == self.parts.len() {
                return true;
            }
        }
        false
    }
}

/// Whether `class` appears as a whole whitespace-separated token in the
/// element's class attribute. Class comparison is case-sensitive.
fn has_class(attribute: &str, class: &str) -> bool {
    attribute.split_ascii_whitespace().any(|token| token == class)
}
