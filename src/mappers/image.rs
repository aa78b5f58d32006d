// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The image mapper (spec.md §4.7): registers the image's bytes in the
//! Media Registry (content-addressed dedup) and emits `<p:pic>`
//! referencing the assigned relationship id.

use pptx_ir::{ImageSource, Rect};

use crate::dml::emu;
use crate::package::media::{MediaKind, MediaRegistry};

/// `(xml fragment, relationship id + part path to record in the slide's
/// rels)`. `None` in the second slot when the image couldn't be
/// registered (e.g. an external `href` this crate doesn't fetch).
pub fn map_image(id: u32, bounds: &Rect, source: &ImageSource, media: &mut MediaRegistry) -> (String, Option<(String, String)>) {
    let (mime, bytes) = match source {
        ImageSource::EmbeddedBytes { mime, data } => (mime.clone(), data.clone()),
        ImageSource::DataUri(href) => {
            // Fetching an external image reference is outside this
            // crate's collaborator boundary (spec.md §4.10's fetcher
            // note applies the same way to images); the shape is
            // dropped with a warning left to the caller.
            log::warn!("image references external href '{href}', which this crate does not fetch; skipping");
            return (String::new(), None);
        }
    };

    let part = media.register(MediaKind::Image, &mime, bytes);
    let target = part.part_path.trim_start_matches("ppt/").to_string();

    let xml = format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name=""/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        part.relationship_id,
        emu(bounds.x),
        emu(bounds.y),
        emu(bounds.width.max(1.0)),
        emu(bounds.height.max(1.0))
    );

    (xml, Some((part.relationship_id, target)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_embedded_bytes_and_emits_pic() {
        let mut media = MediaRegistry::new();
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let source = ImageSource::EmbeddedBytes { mime: "image/png".to_string(), data: vec![1, 2, 3].into() };
        let (xml, rel) = map_image(2, &bounds, &source, &mut media);
        assert!(xml.contains("<p:pic>"));
        assert!(rel.is_some());
        assert_eq!(media.parts().len(), 1);
    }

    #[test]
    fn external_href_is_skipped() {
        let mut media = MediaRegistry::new();
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let source = ImageSource::DataUri("file:///tmp/x.png".to_string());
        let (xml, rel) = map_image(2, &bounds, &source, &mut media);
        assert!(xml.is_empty());
        assert!(rel.is_none());
    }
}
