// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Limited CSS support: selectors of id/class/tag only (spec.md §4.5),
//! resolved with `simplecss` exactly as the teacher does.
//!
//! Precedence, low to high: presentation attribute < stylesheet rule <
//! inline `style=""` declaration.

use std::collections::HashMap;

use crate::document::XmlNode;

/// Collects every `<style>` element's text into one stylesheet.
pub fn collect_stylesheet<'a>(doc: &'a roxmltree::Document<'a>) -> simplecss::StyleSheet<'a> {
    let mut sheet = simplecss::StyleSheet::new();
    for node in doc.descendants().filter(|n| n.is_svg_style()) {
        if matches!(node.attribute("type"), Some(t) if t != "text/css") {
            continue;
        }
        if let Some(text) = node.text() {
            sheet.parse_more(text);
        }
    }
    sheet
}

trait IsStyleElement {
    fn is_svg_style(&self) -> bool;
}

impl IsStyleElement for XmlNode<'_, '_> {
    fn is_svg_style(&self) -> bool {
        self.is_element() && self.tag_name().name() == "style"
    }
}

struct Wrapped<'a, 'input>(XmlNode<'a, 'input>);

impl simplecss::Element for Wrapped<'_, '_> {
    fn parent_element(&self) -> Option<Self> {
        self.0.parent_element().map(Wrapped)
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.0.prev_sibling_element().map(Wrapped)
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.0.tag_name().name() == local_name
    }

    fn attribute_matches(&self, local_name: &str, operator: simplecss::AttributeOperator) -> bool {
        match self.0.attribute(local_name) {
            Some(value) => operator.matches(value),
            None => false,
        }
    }

    fn pseudo_class_matches(&self, class: simplecss::PseudoClass) -> bool {
        matches!(class, simplecss::PseudoClass::FirstChild) && self.prev_sibling_element().is_none()
    }
}

/// Resolves the effective presentation attributes for `node`: stylesheet
/// rules that match it, overridden by its inline `style=""` attribute.
/// Presentation attributes already present on the element are left to
/// the caller to read directly (lowest precedence, so CSS only adds or
/// overrides, never needs to read them here).
pub fn resolve_declarations<'input>(node: XmlNode<'_, 'input>, sheet: &simplecss::StyleSheet) -> HashMap<String, String> {
    let mut out = HashMap::new();

    for rule in &sheet.rules {
        if rule.selector.matches(&Wrapped(node)) {
            for decl in &rule.declarations {
                out.insert(decl.name.to_string(), decl.value.to_string());
            }
        }
    }

    if let Some(value) = node.attribute("style") {
        for decl in simplecss::DeclarationTokenizer::from(value) {
            out.insert(decl.name.to_string(), decl.value.to_string());
        }
    }

    out
}
