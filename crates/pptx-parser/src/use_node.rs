// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `<use>`/`<symbol>` expansion (spec.md §4.5, §9).
//!
//! `<use>` has no IR variant of its own: it resolves its `href` target
//! and the converter re-enters the normal element dispatch on that
//! target node with an extra `translate(x,y)` pushed onto the CTM. A
//! `<symbol>` target additionally clips to its `viewBox` like a nested
//! `<svg>`. Cycles are fatal (`Error::CyclicReference`), matching the
//! teacher's `usvg-parser` `use` handling.

use std::collections::HashSet;

use pptx_ir::Matrix;

use crate::document::{NodeExt, XmlNode};
use crate::error::Error;

/// Resolves a `<use>` element's target, returning the target node and the
/// local `translate(x,y)` to push before converting it.
///
/// `visiting` tracks the chain of element IDs currently being expanded;
/// `node_id` is the id of `use_node`'s target, pushed onto the set for
/// the duration of the caller's recursive conversion of that target and
/// popped afterward (bookkeeping lives in the converter, this function
/// only performs the lookup and cycle check).
pub fn resolve_use<'a, 'input>(
    use_node: XmlNode<'a, 'input>,
    id_map: &std::collections::HashMap<String, XmlNode<'a, 'input>>,
    visiting: &HashSet<String>,
) -> Result<(XmlNode<'a, 'input>, Matrix), Error> {
    let href = use_node.href().ok_or_else(|| Error::CyclicReference("<use> has no href".to_string()))?;
    let id = href.trim_start_matches('#');

    let target = id_map.get(id).copied().ok_or_else(|| Error::CyclicReference(format!("<use> references unknown id #{id}")))?;

    if visiting.contains(id) {
        return Err(Error::CyclicReference(format!("cyclic <use> reference through #{id}")));
    }

    let x: f64 = use_node.attr("x").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let y: f64 = use_node.attr("y").and_then(|v| v.parse().ok()).unwrap_or(0.0);

    Ok((target, Matrix::translate(x, y)))
}

/// True when `node` is a `<symbol>` element, which the converter must
/// additionally clip to its own `viewBox` (like a nested `<svg>`) rather
/// than converting as a plain group.
pub fn is_symbol(node: XmlNode) -> bool {
    node.is_svg_element("symbol")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn detects_direct_cycle() {
        let xml = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <g id="a"><use id="b" href="#a"/></g>
        </svg>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut id_map = HashMap::new();
        for n in doc.descendants().filter(|n| n.is_element()) {
            if let Some(id) = n.attribute("id") {
                id_map.insert(id.to_string(), n);
            }
        }
        let use_node = doc.descendants().find(|n| n.is_svg_element("use")).unwrap();
        let mut visiting = std::collections::HashSet::new();
        visiting.insert("a".to_string());
        assert!(matches!(resolve_use(use_node, &id_map, &visiting), Err(Error::CyclicReference(_))));
    }

    #[test]
    fn resolves_simple_target() {
        let xml = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <rect id="r" x="0" y="0" width="1" height="1"/>
            <use href="#r" x="5" y="10"/>
        </svg>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut id_map = HashMap::new();
        for n in doc.descendants().filter(|n| n.is_element()) {
            if let Some(id) = n.attribute("id") {
                id_map.insert(id.to_string(), n);
            }
        }
        let use_node = doc.descendants().find(|n| n.is_svg_element("use")).unwrap();
        let visiting = std::collections::HashSet::new();
        let (target, m) = resolve_use(use_node, &id_map, &visiting).unwrap();
        assert_eq!(target.tag_name().name(), "rect");
        assert_eq!(m, Matrix::translate(5.0, 10.0));
    }
}
