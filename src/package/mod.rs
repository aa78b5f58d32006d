// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Package Writer (spec.md §4.11): assembles the OOXML PresentationML
//! ZIP from generated slide XML and the Media Registry's parts.
//!
//! The writer is single-consumer (spec.md §5): slides are mapped
//! independently (possibly concurrently, by the caller) and handed here
//! already-rendered; this module only serializes them into one ZIP.

pub mod content_types;
pub mod media;
pub mod relationships;

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Error;
use content_types::ContentTypes;
use media::{MediaKind, MediaPart};
use relationships::{relationship, write_rels, REL_FONT, REL_IMAGE, REL_PRESENTATION, REL_SLIDE};

/// A single already-mapped slide: its body XML (the children of
/// `<p:cSld><p:spTree>`) and the relationship ids of the media/EMF/font
/// parts it references.
pub struct SlideContent {
    pub shape_tree_xml: String,
    /// `(relationship id, part path relative to "ppt/")`, e.g.
    /// `("rId1000", "media/image1.png")`.
    pub media_relationship_ids: Vec<(String, String)>,
}

pub struct Package {
    pub slides: Vec<SlideContent>,
    pub media: media::MediaRegistry,
    pub slide_width_emu: i64,
    pub slide_height_emu: i64,
    pub deterministic: bool,
    /// Fonts embedded at the presentation level (spec.md §4.10): typeface
    /// name plus the Media Registry part holding its program bytes.
    pub embedded_fonts: Vec<(String, MediaPart)>,
}

fn fixed_epoch() -> zip::DateTime {
    zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0).expect("1980-01-01 is a valid DOS timestamp")
}

impl Package {
    /// Serializes the package into PPTX bytes (spec.md §4.11).
    ///
    /// File order is fixed (content types, rels, presentation, slides in
    /// order, then media/embeddings/fonts in registration order) so that
    /// identical input produces a byte-identical ZIP when
    /// `deterministic` is set.
    pub fn write(&self) -> Result<Vec<u8>, Error> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let mut content_types = ContentTypes::new(self.slides.len());
        for part in self.media.parts() {
            let ext = part
                .part_path
                .rsplit('.')
                .next()
                .unwrap_or("bin")
                .to_string();
            match self.kind_of(part) {
                MediaKind::Image => content_types.register_media_extension(ext, part.content_type.clone()),
                MediaKind::Emf => content_types.note_embedding(),
                MediaKind::Font => content_types.note_font(),
            }
        }

        self.write_text(&mut zip, "[Content_Types].xml", &content_types.to_xml())?;

        let root_rels = vec![relationship("rId1", REL_PRESENTATION, "ppt/presentation.xml")];
        self.write_text(&mut zip, "_rels/.rels", &write_rels(&root_rels))?;

        let mut presentation_rels: Vec<_> = (1..=self.slides.len())
            .map(|i| relationship(format!("rId{i}"), REL_SLIDE, format!("slides/slide{i}.xml")))
            .collect();
        for (_, part) in &self.embedded_fonts {
            let target = part.part_path.trim_start_matches("ppt/").to_string();
            presentation_rels.push(relationship(part.relationship_id.clone(), REL_FONT, target));
        }
        self.write_text(&mut zip, "ppt/_rels/presentation.xml.rels", &write_rels(&presentation_rels))?;
        self.write_text(&mut zip, "ppt/presentation.xml", &self.presentation_xml())?;

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            self.write_text(&mut zip, &format!("ppt/slides/slide{n}.xml"), &self.slide_xml(slide))?;

            let rels: Vec<_> = slide
                .media_relationship_ids
                .iter()
                .map(|(id, target)| relationship(id.clone(), self.rel_type_for(target), format!("../{target}")))
                .collect();
            if !rels.is_empty() {
                self.write_text(&mut zip, &format!("ppt/slides/_rels/slide{n}.xml.rels"), &write_rels(&rels))?;
            }
        }

        for part in self.media.parts() {
            self.write_binary(&mut zip, part.part_path.trim_start_matches('/'), &part.bytes)?;
        }

        let cursor = zip.finish().map_err(|e| Error::PackageWrite(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn kind_of(&self, part: &MediaPart) -> MediaKind {
        if part.part_path.contains("/embeddings/") {
            MediaKind::Emf
        } else if part.part_path.contains("/fonts/") {
            MediaKind::Font
        } else {
            MediaKind::Image
        }
    }

    fn rel_type_for(&self, target: &str) -> &'static str {
        if target.starts_with("fonts/") {
            REL_FONT
        } else {
            REL_IMAGE
        }
    }

    fn file_options(&self, compress: bool) -> SimpleFileOptions {
        let mut options = SimpleFileOptions::default()
            .compression_method(if compress { CompressionMethod::Deflated } else { CompressionMethod::Stored });
        if self.deterministic {
            options = options.last_modified_time(fixed_epoch());
        }
        options
    }

    fn write_text(&self, zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, content: &str) -> Result<(), Error> {
        zip.start_file(name, self.file_options(true)).map_err(|e| Error::PackageWrite(e.to_string()))?;
        zip.write_all(content.as_bytes()).map_err(|e| Error::PackageWrite(e.to_string()))
    }

    fn write_binary(&self, zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]) -> Result<(), Error> {
        // Already-compressed media (PNG/JPEG) doesn't benefit from re-deflating.
        let already_compressed = name.ends_with(".png") || name.ends_with(".jpeg") || name.ends_with(".jpg");
        zip.start_file(name, self.file_options(!already_compressed)).map_err(|e| Error::PackageWrite(e.to_string()))?;
        zip.write_all(bytes).map_err(|e| Error::PackageWrite(e.to_string()))
    }

    fn presentation_xml(&self) -> String {
        let mut sld_ids = String::new();
        for (i, _) in self.slides.iter().enumerate() {
            sld_ids.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + i as u32,
                i + 1
            ));
        }
        let embed_attr = if self.embedded_fonts.is_empty() { "" } else { r#" embedTrueTypeFonts="1""# };
        let font_lst = if self.embedded_fonts.is_empty() {
            String::new()
        } else {
            let mut inner = String::new();
            for (typeface, part) in &self.embedded_fonts {
                inner.push_str(&format!(
                    r#"<p:embeddedFont><p:font typeface="{typeface}"/><p:regular r:id="{}"/></p:embeddedFont>"#,
                    part.relationship_id
                ));
            }
            format!("<p:embeddedFontLst>{inner}</p:embeddedFontLst>")
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"{embed_attr}><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/>{font_lst}</p:presentation>"#,
            self.slide_width_emu, self.slide_height_emu
        )
    }

    /// The mapper-produced `shape_tree_xml` is already a sequence of
    /// well-formed DrawingML fragments (`<p:sp>`, `<p:pic>`, `<p:grpSp>`);
    /// it's spliced in verbatim between the fixed slide shell elements.
    fn slide_xml(&self, slide: &SlideContent) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            slide.shape_tree_xml
        )
    }
}
