// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `.rels` part generation (spec.md §4.11): one relationships document
//! per related part (root, presentation, each slide).

use xmlwriter::{Options as XmlOptions, XmlWriter};

#[derive(Clone, Debug)]
pub struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
}

pub fn relationship(id: impl Into<String>, rel_type: &'static str, target: impl Into<String>) -> Relationship {
    Relationship { id: id.into(), rel_type, target: target.into() }
}

pub fn write_rels(rels: &[Relationship]) -> String {
    let mut xml = XmlWriter::new(XmlOptions::default());
    xml.start_element("Relationships");
    xml.write_attribute("xmlns", "http://schemas.openxmlformats.org/package/2006/relationships");
    for rel in rels {
        xml.start_element("Relationship");
        xml.write_attribute("Id", &rel.id);
        xml.write_attribute("Type", rel.rel_type);
        xml.write_attribute("Target", &rel.target);
        xml.end_element();
    }
    xml.end_document()
}

pub const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_PRESENTATION: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_FONT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/font";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_relationship_per_entry() {
        let rels = vec![relationship("rId1", REL_SLIDE, "slides/slide1.xml")];
        let xml = write_rels(&rels);
        assert_eq!(xml.matches("<Relationship").count(), 1);
        assert!(xml.contains("rId1"));
    }
}
