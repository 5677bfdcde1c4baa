//! Indented outline of a JSON value.
//!
//! Containers show their size (`{n}` for objects, `[n]` for arrays).
//! Containers at or below the collapse depth are listed but not expanded.

use serde_json::Value;

/// Depth below which containers are collapsed by default.
pub const DEFAULT_COLLAPSE_DEPTH: usize = 2;

const INDENT: &str = "  ";

/// Render `value` as an outline. The root sits at depth 0; a container at
/// depth `d` is expanded only when `d < collapse_depth`.
pub fn render_tree(value: &Value, collapse_depth: usize) -> String {
    let mut out = String::new();
    render_node(&mut out, "root", value, 0, collapse_depth);
    out
}

fn render_node(out: &mut String, label: &str, value: &Value, depth: usize, collapse: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(label);

    match value {
        Value::Object(map) => {
            out.push_str(&format!(" {{{}}}", map.len()));
            if !expand(map.is_empty(), depth, collapse, out) {
                return;
            }
            for (key, child) in map {
                render_node(out, key, child, depth + 1, collapse);
            }
        }
        Value::Array(items) => {
            out.push_str(&format!(" [{}]", items.len()));
            if !expand(items.is_empty(), depth, collapse, out) {
                return;
            }
            for (index, child) in items.iter().enumerate() {
                render_node(out, &index.to_string(), child, depth + 1, collapse);
            }
        }
        scalar => {
            out.push_str(": ");
            out.push_str(&scalar.to_string());
            out.push('\n');
        }
    }
}

/// Finish the container's header line and say whether to descend.
fn expand(empty: bool, depth: usize, collapse: usize, out: &mut String) -> bool {
    if !empty && depth >= collapse {
        out.push_str(" …\n");
        return false;
    }
    out.push('\n');
    !empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_and_containers() {
        let value = json!({"name": "meld", "tags": ["a", 1], "empty": {}});
        assert_eq!(
            render_tree(&value, DEFAULT_COLLAPSE_DEPTH),
            "root {3}\n  name: \"meld\"\n  tags [2]\n    0: \"a\"\n    1: 1\n  empty {0}\n"
        );
    }

    #[test]
    fn collapses_deep_containers() {
        let value = json!({"a": {"b": {"c": 1}}});
        assert_eq!(
            render_tree(&value, 2),
            "root {1}\n  a {1}\n    b {1} …\n"
        );
        assert_eq!(render_tree(&value, 0), "root {1} …\n");
        assert_eq!(
            render_tree(&value, 10),
            "root {1}\n  a {1}\n    b {1}\n      c: 1\n"
        );
    }

    #[test]
    fn scalar_root() {
        assert_eq!(render_tree(&json!(null), 2), "root: null\n");
    }
}
