use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// Models wrap JSON in code fences or prose often enough that a plain `from_str`
// is not reliable for providers without native structured output.

/// Type of a JSON node found by the structure scanner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType, children: Vec<ObjCoords>) -> Self {
        Self { start, end, kind, children }
    }

    /// The slice of `text` covered by this node.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Find all JSON object/array structures in the given text. Coordinates are byte indices.
#[instrument(target = "quiz_forge::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let bytes = text.as_bytes();
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                in_string = true;
                None
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                None
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                None
            }
            b'}' => Some(NodeType::Object),
            b']' => Some(NodeType::Array),
            _ => None,
        };

        let Some(kind) = closing else { continue };
        // Unbalanced closers (a stray `]` in prose) drop the open frame.
        if let Some(frame) = stack.pop() {
            if frame.kind == kind {
                let node = ObjCoords::new(frame.start, i, kind, frame.children);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => results.push(node),
                }
            }
        }
    }

    debug!(target: "quiz_forge::json", count = results.len(), "found root structures");
    results
}

/// Locate the JSON payload in a model response.
///
/// The whole (trimmed) text is tried first. Failing that, the root structures found
/// by [`find_json_structures`] are parsed in order and the first array of objects wins,
/// so a stray `[5]` in the prose does not shadow the quiz that follows it. When no such
/// array exists the first parseable root is returned. When nothing parses, the error
/// from the whole-text attempt is returned.
pub fn first_json_value(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    let trimmed = text.trim();
    let whole_err = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let candidates: Vec<serde_json::Value> = find_json_structures(trimmed)
        .iter()
        .filter_map(|node| serde_json::from_str(node.slice(trimmed)).ok())
        .collect();

    let object_array = candidates.iter().position(|value| {
        value
            .as_array()
            .is_some_and(|items| !items.is_empty() && items.iter().all(|item| item.is_object()))
    });
    if let Some(index) = object_array {
        debug!(target: "quiz_forge::json", index, "picked array of objects");
    }

    candidates
        .into_iter()
        .nth(object_array.unwrap_or(0))
        .ok_or(whole_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_structures_are_children() {
        let s = r#"x [{"a":[1,2]}, {"b":3}] y"#;
        let roots = find_json_structures(s);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].kind, NodeType::Array);
        assert_eq!(roots[0].children.len(), 2);
        assert_eq!(roots[0].children[0].children[0].kind, NodeType::Array);
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        let s = r#"{"text":"a ] tricky [ string \" with } braces"}"#;
        let roots = find_json_structures(s);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].slice(s), s);
    }
}
