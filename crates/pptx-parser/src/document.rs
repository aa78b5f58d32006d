// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Thin convenience layer over `roxmltree::Node`.
//!
//! The teacher's `usvg-parser` builds a whole separate `svgtree` crate
//! with codegen-interned attribute/element IDs for speed. That
//! optimization is disproportionate at this scope (see `DESIGN.md`); we
//! keep the thing it buys readability for — ergonomic typed attribute
//! lookups — as an extension trait directly over `roxmltree::Node`.

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

pub type XmlNode<'a, 'input> = roxmltree::Node<'a, 'input>;

pub trait NodeExt<'a, 'input> {
    fn attr(&self, name: &str) -> Option<&'a str>;
    /// Resolves `href` honoring both the unprefixed SVG2 form and the
    /// `xlink:href` SVG1.1 form (spec.md §6.2).
    fn href(&self) -> Option<&'a str>;
    fn is_svg_element(&self, local_name: &str) -> bool;
    fn parse_attr<T: std::str::FromStr>(&self, name: &str) -> Option<T>;
    /// A simplified XPath-like locator for diagnostics.
    fn path(&self) -> String;
}

impl<'a, 'input> NodeExt<'a, 'input> for XmlNode<'a, 'input> {
    fn attr(&self, name: &str) -> Option<&'a str> {
        self.attribute(name)
    }

    fn href(&self) -> Option<&'a str> {
        self.attribute((XLINK_NS, "href")).or_else(|| self.attribute("href"))
    }

    fn is_svg_element(&self, local_name: &str) -> bool {
        self.is_element() && self.tag_name().name() == local_name
    }

    fn parse_attr<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.attribute(name).and_then(|v| v.parse().ok())
    }

    fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut cur = Some(*self);
        while let Some(n) = cur {
            if n.is_element() {
                let idx = n
                    .parent_element()
                    .map(|p| p.children().filter(|c| c.is_element() && c.tag_name() == n.tag_name()).position(|c| c == n).unwrap_or(0))
                    .unwrap_or(0);
                segments.push(format!("{}[{}]", n.tag_name().name(), idx));
            }
            cur = n.parent_element();
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }
}
