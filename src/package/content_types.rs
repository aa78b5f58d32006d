// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `[Content_Types].xml` generation (spec.md §4.11, §6.1): every part in
//! the ZIP must be listed, and no extraneous entries may appear.

use std::collections::BTreeSet;

use xmlwriter::{Options as XmlOptions, XmlWriter};

const DEFAULT_EXTENSIONS: &[(&str, &str)] = &[
    ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
    ("xml", "application/xml"),
];

const OVERRIDE_PARTS: &[(&str, &str)] = &[
    ("/ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
];

pub struct ContentTypes {
    slide_count: usize,
    media_extensions: BTreeSet<(String, String)>,
    has_embeddings: bool,
    has_fonts: bool,
}

impl ContentTypes {
    pub fn new(slide_count: usize) -> Self {
        ContentTypes { slide_count, media_extensions: BTreeSet::new(), has_embeddings: false, has_fonts: false }
    }

    pub fn register_media_extension(&mut self, extension: String, content_type: String) {
        self.media_extensions.insert((extension, content_type));
    }

    pub fn note_embedding(&mut self) {
        self.has_embeddings = true;
    }

    pub fn note_font(&mut self) {
        self.has_fonts = true;
    }

    pub fn to_xml(&self) -> String {
        let mut xml = XmlWriter::new(XmlOptions::default());
        xml.start_element("Types");
        xml.write_attribute("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types");

        for (ext, content_type) in DEFAULT_EXTENSIONS {
            xml.start_element("Default");
            xml.write_attribute("Extension", ext);
            xml.write_attribute("ContentType", content_type);
            xml.end_element();
        }
        for (ext, content_type) in &self.media_extensions {
            xml.start_element("Default");
            xml.write_attribute("Extension", ext);
            xml.write_attribute("ContentType", content_type);
            xml.end_element();
        }
        if self.has_embeddings {
            xml.start_element("Default");
            xml.write_attribute("Extension", "emf");
            xml.write_attribute("ContentType", "image/x-emf");
            xml.end_element();
        }
        if self.has_fonts {
            xml.start_element("Default");
            xml.write_attribute("Extension", "fntdata");
            xml.write_attribute("ContentType", "application/x-font-opentype");
            xml.end_element();
        }

        for (part, content_type) in OVERRIDE_PARTS {
            xml.start_element("Override");
            xml.write_attribute("PartName", part);
            xml.write_attribute("ContentType", content_type);
            xml.end_element();
        }
        for i in 1..=self.slide_count {
            xml.start_element("Override");
            xml.write_attribute("PartName", &format!("/ppt/slides/slide{i}.xml"));
            xml.write_attribute(
                "ContentType",
                "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
            );
            xml.end_element();
        }

        xml.end_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_slide() {
        let ct = ContentTypes::new(2);
        let xml = ct.to_xml();
        assert!(xml.contains("slide1.xml"));
        assert!(xml.contains("slide2.xml"));
    }

    #[test]
    fn registers_media_defaults_once() {
        let mut ct = ContentTypes::new(0);
        ct.register_media_extension("png".to_string(), "image/png".to_string());
        ct.register_media_extension("png".to_string(), "image/png".to_string());
        assert_eq!(ct.media_extensions.len(), 1);
    }
}
