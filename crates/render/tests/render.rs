use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use defensebot_core::AnnouncementData;
use defensebot_render::{RenderError, Renderer};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/></Types>"#;

const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#;

/// Slide with every token; the student name is split across three runs the
/// way editors tend to save it.
const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>
<a:p><a:r><a:rPr lang="zh-TW" b="1"/><a:t>碩士學位論文口試公告</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW"/><a:t>研究生：{{stu</a:t></a:r><a:r><a:rPr lang="zh-TW"/><a:t>dent_</a:t></a:r><a:r><a:rPr lang="zh-TW"/><a:t>name}} ({{student_id}})</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW"/><a:t>論文題目：{{thesis_title_zh}}</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="en-US"/><a:t>{{thesis_title_en}}</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW"/><a:t>指導教授：{{advisor_full_text}}</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW"/><a:t>口試日期：{{defense_date_text}} {{defense_time_text}}</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW"/><a:t>口試地點：{{location_full_text}}</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW"/><a:t>口試委員：</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="zh-TW" sz="2000"/><a:t>{{committee_members_list}}</a:t></a:r><a:endParaRPr lang="zh-TW"/></a:p>
</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

const MASTER: &str = "<p:sldMaster/>";
const MEDIA: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3];

fn write_template(path: &Path, slide: &str) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("ppt/presentation.xml", PRESENTATION.as_bytes()),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS.as_bytes()),
        ("ppt/slides/slide1.xml", slide.as_bytes()),
        ("ppt/slideMasters/slideMaster1.xml", MASTER.as_bytes()),
        ("ppt/media/image1.png", MEDIA),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(body).unwrap();
    }
    zip.finish().unwrap();
}

fn announcement() -> AnnouncementData {
    AnnouncementData {
        student_id: "M11402165".into(),
        student_name: "趙祈佑".into(),
        thesis_title_zh: "基於大型語言模型之智慧口試佈告生成系統".into(),
        thesis_title_en: "Defense-Bot: Drafting Announcements with LLM Agents".into(),
        advisor_full_text: "呂政修 教授 臺灣科技大學電子工程系".into(),
        defense_date_text: "民國115年6月20日(星期六)".into(),
        defense_time_text: "14:00".into(),
        location_full_text: "第二教學大樓 T2-202會議室".into(),
        committee_members: vec![
            "鄭瑞光 教授 臺灣科技大學電子工程系".into(),
            "吳晉賢 教授 臺灣科技大學電子工程系".into(),
            "呂政修 教授 臺灣科技大學電子工程系".into(),
        ],
    }
}

fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).unwrap();
    buf
}

/// Text of every `<a:p>`, with `<a:br/>` read back as `\n`.
fn paragraph_texts(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"a:p" => current.clear(),
            Event::End(e) if e.name().as_ref() == b"a:p" => paragraphs.push(current.clone()),
            Event::Start(e) if e.name().as_ref() == b"a:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"a:t" => in_text = false,
            Event::Empty(e) if e.name().as_ref() == b"a:br" => current.push('\n'),
            Event::Text(t) if in_text => current.push_str(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }
    paragraphs
}

fn rendered_slide(path: &Path) -> String {
    String::from_utf8(read_entry(path, "ppt/slides/slide1.xml")).unwrap()
}

#[test]
fn every_placeholder_is_substituted() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("defense_template.pptx");
    write_template(&template, SLIDE);

    let renderer = Renderer::new(&template, dir.path().join("downloads"));
    let handle = renderer.render(&announcement(), 1).unwrap();

    assert_eq!(handle.filename, "defense_M11402165_1.pptx");
    assert!(handle.path.is_file());

    let slide = rendered_slide(&handle.path);
    assert!(!slide.contains("{{"), "token left behind: {slide}");

    let texts = paragraph_texts(&slide);
    assert_eq!(texts[0], "碩士學位論文口試公告");
    assert_eq!(texts[1], "研究生：趙祈佑 (M11402165)");
    assert_eq!(texts[2], "論文題目：基於大型語言模型之智慧口試佈告生成系統");
    assert_eq!(texts[5], "口試日期：民國115年6月20日(星期六) 14:00");
    assert_eq!(texts[6], "口試地點：第二教學大樓 T2-202會議室");
    assert_eq!(
        texts[8],
        "    鄭瑞光 教授 臺灣科技大學電子工程系\n    吳晉賢 教授 臺灣科技大學電子工程系\n    呂政修 教授 臺灣科技大學電子工程系"
    );
}

#[test]
fn first_run_formatting_is_kept_and_followers_blanked() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.pptx");
    write_template(&template, SLIDE);

    let handle = Renderer::new(&template, dir.path()).render(&announcement(), 2).unwrap();
    let slide = rendered_slide(&handle.path);

    assert!(slide.contains(r#"<a:r><a:rPr lang="zh-TW"/><a:t>研究生：趙祈佑 (M11402165)</a:t></a:r><a:r><a:rPr lang="zh-TW"/><a:t></a:t></a:r>"#));
    // each committee line keeps the run size
    assert_eq!(slide.matches(r#"<a:rPr lang="zh-TW" sz="2000"/>"#).count(), 3);
    assert_eq!(slide.matches("<a:br/>").count(), 2);
}

#[test]
fn other_parts_are_copied_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.pptx");
    write_template(&template, SLIDE);

    let handle = Renderer::new(&template, dir.path()).render(&announcement(), 3).unwrap();

    assert_eq!(read_entry(&handle.path, "ppt/media/image1.png"), MEDIA);
    assert_eq!(read_entry(&handle.path, "ppt/slideMasters/slideMaster1.xml"), MASTER.as_bytes());
    assert_eq!(read_entry(&handle.path, "ppt/presentation.xml"), PRESENTATION.as_bytes());
}

#[test]
fn custom_indent_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.pptx");
    write_template(&template, SLIDE);

    let handle = Renderer::new(&template, dir.path())
        .with_committee_indent("\u{3000}")
        .render(&announcement(), 4)
        .unwrap();
    let texts = paragraph_texts(&rendered_slide(&handle.path));
    assert!(texts[8].starts_with("\u{3000}鄭瑞光"));
}

#[test]
fn missing_template_is_reported_and_nothing_written() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("downloads");
    let renderer = Renderer::new(dir.path().join("nope.pptx"), &out);

    let err = renderer.render(&announcement(), 1).unwrap_err();
    assert!(matches!(err, RenderError::TemplateNotFound { .. }));
    assert!(err.is_template_missing());
    assert!(!out.exists());
}

#[test]
fn non_presentation_template_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.pptx");
    std::fs::write(&template, b"not a zip").unwrap();

    let err = Renderer::new(&template, dir.path()).render(&announcement(), 1).unwrap_err();
    assert!(matches!(err, RenderError::InvalidTemplate(_)));
}

#[test]
fn failed_render_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.pptx");
    // unterminated paragraph
    write_template(&template, r#"<p:sld><a:p><a:r><a:t>{{student_name}}</a:t></a:r>"#);
    let out = dir.path().join("downloads");

    let err = Renderer::new(&template, &out).render(&announcement(), 9).unwrap_err();
    assert!(matches!(err, RenderError::Xml(_)));
    let leftovers: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn rendering_again_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.pptx");
    write_template(&template, SLIDE);
    let renderer = Renderer::new(&template, dir.path().join("out"));

    renderer.render(&announcement(), 5).unwrap();
    let mut changed = announcement();
    changed.defense_time_text = "09:30".into();
    let handle = renderer.render(&changed, 5).unwrap();

    let texts = paragraph_texts(&rendered_slide(&handle.path));
    assert_eq!(texts[5], "口試日期：民國115年6月20日(星期六) 09:30");
}
