//! Minimal PresentationML package reader/writer
//!
//! Writes the parts a presentation needs to be recognised as a .pptx
//! (content types, relationships, core properties, presentation part and one
//! part per slide) and reads the same parts back. Layouts, masters, themes and
//! media are not modelled.

use super::presentation::{CoreProperties, Presentation, Slide, SlideSize};
use super::DocumentError;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const ROOT_RELS_PART: &str = "_rels/.rels";
const CORE_PART: &str = "docProps/core.xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// Serialize a presentation into .pptx bytes
pub fn write_package(presentation: &Presentation) -> Result<Vec<u8>, DocumentError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let slides = presentation.slides();

    let mut parts: Vec<(String, String)> = vec![
        (CONTENT_TYPES_PART.to_string(), content_types_xml(slides.len())),
        (ROOT_RELS_PART.to_string(), root_rels_xml()),
        (CORE_PART.to_string(), core_xml(presentation.core_properties())),
        (
            PRESENTATION_PART.to_string(),
            presentation_xml(presentation.slide_size(), slides.len()),
        ),
        (PRESENTATION_RELS_PART.to_string(), presentation_rels_xml(slides.len())),
    ];
    for (index, slide) in slides.iter().enumerate() {
        parts.push((format!("ppt/slides/slide{}.xml", index + 1), slide_xml(slide)));
    }

    for (name, content) in parts {
        writer.start_file(name, options)?;
        writer.write_all(content.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Deserialize .pptx bytes into a presentation
pub fn read_package(bytes: &[u8]) -> Result<Presentation, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let presentation_xml = read_part(&mut archive, PRESENTATION_PART)?;
    let (slide_size, slide_rel_ids) = parse_presentation(&presentation_xml)?;

    let rels_xml = read_part(&mut archive, PRESENTATION_RELS_PART)?;
    let targets = parse_slide_relationships(&rels_xml)?;

    let mut slides = Vec::with_capacity(slide_rel_ids.len());
    for rel_id in slide_rel_ids {
        let target = targets.get(&rel_id).ok_or_else(|| {
            DocumentError::MissingPart(format!("slide relationship '{}'", rel_id))
        })?;
        let part_name = resolve_target(target);
        let slide_xml = read_part(&mut archive, &part_name)?;
        slides.push(parse_slide(&part_name, &slide_xml)?);
    }

    // docProps/core.xml is optional in the package format
    let core = match read_part(&mut archive, CORE_PART) {
        Ok(xml) => parse_core(&xml)?,
        Err(DocumentError::MissingPart(_)) => CoreProperties::default(),
        Err(e) => return Err(e),
    };

    Ok(Presentation::from_parts(slide_size, slides, core))
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, DocumentError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(DocumentError::MissingPart(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Slide targets in presentation.xml.rels are relative to ppt/
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

fn content_types_xml(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        ));
    }
    xml.push_str(
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    );
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECLARATION
    )
}

fn presentation_xml(size: SlideSize, slide_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_DRAWING, NS_REL, NS_MAIN
    ));
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for n in 1..=slide_count {
            xml.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n));
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(&format!(
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        size.width, size.height
    ));
    xml.push_str("</p:presentation>");
    xml
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            n, REL_SLIDE, n
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn text_body(paragraphs: &[String]) -> String {
    let mut xml = String::from("<p:txBody><a:bodyPr/><a:lstStyle/>");
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            xml.push_str("<a:p/>");
        } else {
            xml.push_str(&format!(
                "<a:p><a:r><a:t>{}</a:t></a:r></a:p>",
                escape(paragraph.as_str())
            ));
        }
    }
    xml.push_str("</p:txBody>");
    xml
}

fn slide_xml(slide: &Slide) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!(
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>"#,
        NS_DRAWING, NS_REL, NS_MAIN
    ));
    xml.push_str(
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
    );

    if let Some(title) = &slide.title {
        let lines: Vec<String> = title.split('\n').map(str::to_string).collect();
        xml.push_str(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
        );
        xml.push_str(&text_body(&lines));
        xml.push_str("</p:sp>");
    }

    if !slide.body.is_empty() {
        xml.push_str(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
        );
        xml.push_str(&text_body(&slide.body));
        xml.push_str("</p:sp>");
    }

    xml.push_str("</p:spTree></p:cSld></p:sld>");
    xml
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn core_xml(core: &CoreProperties) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties""#,
        r#" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/""#,
        r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));

    let text_fields = [
        ("dc:title", &core.title),
        ("dc:subject", &core.subject),
        ("dc:creator", &core.author),
        ("cp:keywords", &core.keywords),
        ("dc:description", &core.comments),
        ("cp:lastModifiedBy", &core.last_modified_by),
    ];
    for (tag, value) in text_fields {
        if let Some(value) = value {
            xml.push_str(&format!("<{tag}>{}</{tag}>", escape(value.as_str())));
        }
    }
    if let Some(created) = &core.created {
        xml.push_str(&format!(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            timestamp(created)
        ));
    }
    if let Some(modified) = &core.modified {
        xml.push_str(&format!(
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            timestamp(modified)
        ));
    }

    xml.push_str("</cp:coreProperties>");
    xml
}

fn xml_error(part: &str, message: impl std::fmt::Display) -> DocumentError {
    DocumentError::Xml {
        part: part.to_string(),
        message: message.to_string(),
    }
}

fn attribute(start: &BytesStart, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Expand a general entity reference (`amp`, `#x41`, ...) to its text
fn resolve_entity(name: &[u8]) -> Option<String> {
    let name = std::str::from_utf8(name).ok()?;
    let text = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            return char::from_u32(code).map(String::from);
        }
    };
    Some(text.to_string())
}

fn parse_presentation(xml: &[u8]) -> Result<(SlideSize, Vec<String>), DocumentError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut size = SlideSize::default();
    let mut rel_ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sldId" => {
                    if let Some(rel_id) = attribute(&e, b"r:id") {
                        rel_ids.push(rel_id);
                    }
                }
                b"sldSz" => {
                    if let Some(cx) = attribute(&e, b"cx").and_then(|v| v.parse().ok()) {
                        size.width = cx;
                    }
                    if let Some(cy) = attribute(&e, b"cy").and_then(|v| v.parse().ok()) {
                        size.height = cy;
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(PRESENTATION_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok((size, rel_ids))
}

fn parse_slide_relationships(xml: &[u8]) -> Result<HashMap<String, String>, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let is_slide = attribute(&e, b"Type").is_some_and(|t| t == REL_SLIDE);
                if let (true, Some(id), Some(target)) =
                    (is_slide, attribute(&e, b"Id"), attribute(&e, b"Target"))
                {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(PRESENTATION_RELS_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// Text of one shape, split into paragraphs
#[derive(Default)]
struct ShapeText {
    is_title: bool,
    paragraphs: Vec<String>,
}

fn parse_slide(part: &str, xml: &[u8]) -> Result<Slide, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut slide = Slide::default();
    let mut shape: Option<ShapeText> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sp" => shape = Some(ShapeText::default()),
                b"p" => {
                    if let Some(shape) = shape.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"t" => in_text = true,
                b"ph" => mark_title(&mut shape, &e),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(shape) = shape.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"ph" => mark_title(&mut shape, &e),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = std::str::from_utf8(e.as_ref()).map_err(|err| xml_error(part, err))?;
                push_text(&mut shape, text);
            }
            Ok(Event::GeneralRef(e)) if in_text => {
                if let Some(text) = resolve_entity(e.as_ref()) {
                    push_text(&mut shape, &text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"sp" => {
                    if let Some(done) = shape.take() {
                        if done.is_title {
                            if slide.title.is_none() {
                                slide.title = Some(done.paragraphs.join("\n"));
                            }
                        } else {
                            slide.body.extend(done.paragraphs);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(slide)
}

fn mark_title(shape: &mut Option<ShapeText>, ph: &BytesStart) {
    if let Some(shape) = shape.as_mut() {
        let kind = attribute(ph, b"type");
        shape.is_title = matches!(kind.as_deref(), Some("title") | Some("ctrTitle"));
    }
}

fn push_text(shape: &mut Option<ShapeText>, text: &str) {
    if let Some(shape) = shape.as_mut() {
        match shape.paragraphs.last_mut() {
            Some(paragraph) => paragraph.push_str(text),
            None => shape.paragraphs.push(text.to_string()),
        }
    }
}

fn parse_core(xml: &[u8]) -> Result<CoreProperties, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut core = CoreProperties::default();
    let mut current: Option<Vec<u8>> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current = Some(e.local_name().as_ref().to_vec());
                text.clear();
            }
            Ok(Event::Text(e)) if current.is_some() => {
                let chunk =
                    std::str::from_utf8(e.as_ref()).map_err(|err| xml_error(CORE_PART, err))?;
                text.push_str(chunk);
            }
            Ok(Event::GeneralRef(e)) if current.is_some() => {
                if let Some(chunk) = resolve_entity(e.as_ref()) {
                    text.push_str(&chunk);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(name) = current.take() {
                    let value = std::mem::take(&mut text);
                    match name.as_slice() {
                        b"title" => core.title = Some(value),
                        b"subject" => core.subject = Some(value),
                        b"creator" => core.author = Some(value),
                        b"keywords" => core.keywords = Some(value),
                        b"description" => core.comments = Some(value),
                        b"lastModifiedBy" => core.last_modified_by = Some(value),
                        b"created" => core.created = parse_timestamp(&value),
                        b"modified" => core.modified = parse_timestamp(&value),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(CORE_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(core)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::{CorePropertiesUpdate, Document};

    fn sample() -> Presentation {
        let mut pres = Presentation::new("4:3");
        pres.add_slide(
            Some("Revenue & <Costs>".to_string()),
            vec!["Up 12%".to_string(), String::new(), "Flat \"opex\"".to_string()],
        );
        pres.add_slide(None, vec!["Appendix".to_string()]);
        pres.add_slide(Some("Two\nLines".to_string()), vec![]);
        pres.set_core_properties(CorePropertiesUpdate {
            title: Some("Board deck".to_string()),
            author: Some("O'Neil".to_string()),
            ..Default::default()
        });
        pres
    }

    #[test]
    fn test_package_contains_expected_parts() {
        let bytes = write_package(&sample()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();

        for part in [
            CONTENT_TYPES_PART,
            ROOT_RELS_PART,
            CORE_PART,
            PRESENTATION_PART,
            PRESENTATION_RELS_PART,
            "ppt/slides/slide1.xml",
            "ppt/slides/slide3.xml",
        ] {
            assert!(names.iter().any(|n| n == part), "missing {}", part);
        }
        assert!(archive.by_name("ppt/slides/slide4.xml").is_err());
    }

    #[test]
    fn test_text_with_markup_characters_survives() {
        let original = sample();
        let restored = read_package(&write_package(&original).unwrap()).unwrap();

        assert_eq!(restored.slides(), original.slides());
        assert_eq!(restored.title(), Some("Revenue & <Costs>"));
        assert_eq!(restored.slide_size(), original.slide_size());
        assert_eq!(restored.core_properties().author.as_deref(), Some("O'Neil"));
        assert_eq!(restored.core_properties().title.as_deref(), Some("Board deck"));
    }

    #[test]
    fn test_empty_presentation_has_no_slides() {
        let restored = read_package(&Presentation::new("16:9").to_bytes().unwrap()).unwrap();
        assert_eq!(restored.slide_count(), 0);
        assert_eq!(restored.title(), None);
    }

    #[test]
    fn test_non_zip_bytes_rejected() {
        let result = read_package(b"definitely not a zip archive");
        assert!(matches!(result, Err(DocumentError::Zip(_))));
    }

    #[test]
    fn test_missing_presentation_part_reported() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("readme.txt", FileOptions::default()).unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = read_package(&bytes);
        assert!(
            matches!(result, Err(DocumentError::MissingPart(part)) if part == PRESENTATION_PART)
        );
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity(b"amp").as_deref(), Some("&"));
        assert_eq!(resolve_entity(b"#x41").as_deref(), Some("A"));
        assert_eq!(resolve_entity(b"#66").as_deref(), Some("B"));
        assert_eq!(resolve_entity(b"nbsp"), None);
    }
}
