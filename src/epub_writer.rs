//! EPUB 3 container assembly.
//!
//! Layout inside the archive:
//! - `mimetype` (first, stored uncompressed)
//! - `META-INF/container.xml`
//! - `EPUB/content.opf`, `EPUB/nav.xhtml`, `EPUB/toc.ncx`, `EPUB/style.css`
//! - `EPUB/chapter_<n>.xhtml`, one per chapter in reading order
//!
//! The navigation document is declared in the manifest but kept out of the
//! spine, so reading the output back never yields it as content.

use crate::engine::{Chapter, OutputBook};
use anyhow::{Context, Result};
use quick_xml::escape::escape;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_DIR: &str = "EPUB";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="EPUB/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Minimal Kindle-friendly stylesheet shared by every chapter.
pub const MINIMAL_CSS: &str = r#"body {
    font-family: serif;
    line-height: 1.5;
    margin: 0;
    padding: 0;
}

p {
    margin: 0 0 1em 0;
    text-indent: 1.5em;
    text-align: justify;
}

h1, h2, h3, h4, h5, h6 {
    font-weight: bold;
    margin: 1.5em 0 0.5em 0;
    text-align: left;
    text-indent: 0;
}

h1 { font-size: 1.8em; }
h2 { font-size: 1.5em; }
h3 { font-size: 1.3em; }

em, i { font-style: italic; }
strong, b { font-weight: bold; }

.chapter-title {
    margin-top: 2em;
    margin-bottom: 1em;
}
"#;

pub fn chapter_file_name(position: usize) -> String {
    format!("chapter_{}.xhtml", position + 1)
}

pub fn write_epub(book: &OutputBook, path: &Path) -> Result<()> {
    info!(
        path = %path.display(),
        chapters = book.chapters.len(),
        "Writing EPUB container"
    );
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut zip = ZipWriter::new(file);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_entry(&mut zip, "mimetype", b"application/epub+zip", stored)?;
    add_entry(
        &mut zip,
        "META-INF/container.xml",
        CONTAINER_XML.as_bytes(),
        deflated,
    )?;
    add_entry(
        &mut zip,
        &format!("{CONTENT_DIR}/content.opf"),
        package_document(book).as_bytes(),
        deflated,
    )?;
    add_entry(
        &mut zip,
        &format!("{CONTENT_DIR}/nav.xhtml"),
        nav_document(book).as_bytes(),
        deflated,
    )?;
    add_entry(
        &mut zip,
        &format!("{CONTENT_DIR}/toc.ncx"),
        ncx_document(book).as_bytes(),
        deflated,
    )?;
    add_entry(
        &mut zip,
        &format!("{CONTENT_DIR}/style.css"),
        MINIMAL_CSS.as_bytes(),
        deflated,
    )?;
    for chapter in &book.chapters {
        let xhtml = chapter_document(chapter, &book.metadata.language);
        add_entry(
            &mut zip,
            &format!("{CONTENT_DIR}/{}", chapter.file_name),
            xhtml.as_bytes(),
            deflated,
        )?;
    }

    zip.finish()
        .with_context(|| format!("Failed to finalize {}", path.display()))?;
    Ok(())
}

fn add_entry(
    zip: &mut ZipWriter<File>,
    name: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .with_context(|| format!("Failed to start archive entry {name}"))?;
    zip.write_all(data)
        .with_context(|| format!("Failed to write archive entry {name}"))?;
    debug!(entry = name, bytes = data.len(), "Wrote archive entry");
    Ok(())
}

fn chapter_id(chapter: &Chapter) -> &str {
    chapter
        .file_name
        .strip_suffix(".xhtml")
        .unwrap_or(&chapter.file_name)
}

fn package_document(book: &OutputBook) -> String {
    let meta = &book.metadata;
    let modified = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    let mut manifest = String::new();
    let mut spine = String::new();
    for chapter in &book.chapters {
        let id = chapter_id(chapter);
        manifest.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            escape(id),
            escape(chapter.file_name.as_str())
        ));
        spine.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape(id)));
    }

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id" xml:lang="{lang}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="id">{identifier}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{lang}</dc:language>
    <dc:creator id="creator">{author}</dc:creator>
    <dc:publisher>{publisher}</dc:publisher>
    <dc:date>{date}</dc:date>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="style" href="style.css" media-type="text/css"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#,
        lang = escape(meta.language.as_str()),
        identifier = escape(meta.identifier.as_str()),
        title = escape(meta.title.as_str()),
        author = escape(meta.author.as_str()),
        publisher = escape(meta.publisher.as_str()),
        date = escape(meta.date.as_str()),
    )
}

fn nav_document(book: &OutputBook) -> String {
    let meta = &book.metadata;
    let items: String = book
        .chapters
        .iter()
        .map(|chapter| {
            format!(
                "      <li><a href=\"{}\">{}</a></li>\n",
                escape(chapter.file_name.as_str()),
                escape(chapter.title.as_str())
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>{title}</h1>
    <ol>
{items}    </ol>
  </nav>
</body>
</html>
"#,
        lang = escape(meta.language.as_str()),
        title = escape(meta.title.as_str()),
    )
}

fn ncx_document(book: &OutputBook) -> String {
    let meta = &book.metadata;
    let points: String = book
        .chapters
        .iter()
        .enumerate()
        .map(|(idx, chapter)| {
            format!(
                "    <navPoint id=\"navpoint-{order}\" playOrder=\"{order}\">\n      <navLabel><text>{label}</text></navLabel>\n      <content src=\"{src}\"/>\n    </navPoint>\n",
                order = idx + 1,
                label = escape(chapter.title.as_str()),
                src = escape(chapter.file_name.as_str()),
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{identifier}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{points}  </navMap>
</ncx>
"#,
        identifier = escape(meta.identifier.as_str()),
        title = escape(meta.title.as_str()),
    )
}

fn chapter_document(chapter: &Chapter, language: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="style.css"/>
</head>
<body>
{body}
</body>
</html>
"#,
        lang = escape(language),
        title = escape(chapter.title.as_str()),
        body = chapter.body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BookMetadata;
    use std::io::Read;
    use zip::ZipArchive;

    fn sample_book() -> OutputBook {
        OutputBook {
            metadata: BookMetadata {
                identifier: "urn:uuid:11111111-2222-4333-8444-555555555555".to_string(),
                title: "Fish & Chips".to_string(),
                author: "Unknown".to_string(),
                language: "en".to_string(),
                publisher: "Self-published".to_string(),
                date: "2026-10-19".to_string(),
            },
            chapters: (0..3)
                .map(|idx| Chapter {
                    title: format!("Page {}", idx + 1),
                    file_name: chapter_file_name(idx),
                    body: format!("<p>Body {idx}</p>"),
                })
                .collect(),
        }
    }

    fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> String {
        let mut entry = archive.by_name(name).expect("entry should exist");
        let mut out = String::new();
        entry
            .read_to_string(&mut out)
            .expect("entry should be utf-8");
        out
    }

    #[test]
    fn chapter_names_are_one_based() {
        assert_eq!(chapter_file_name(0), "chapter_1.xhtml");
        assert_eq!(chapter_file_name(9), "chapter_10.xhtml");
    }

    #[test]
    fn mimetype_is_first_and_stored() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let path = dir.path().join("out.epub");
        write_epub(&sample_book(), &path).expect("epub should be written");

        let mut archive = ZipArchive::new(File::open(&path).expect("open")).expect("zip");
        {
            let first = archive.by_index(0).expect("first entry");
            assert_eq!(first.name(), "mimetype");
            assert_eq!(first.compression(), CompressionMethod::Stored);
        }
        assert_eq!(read_entry(&mut archive, "mimetype"), "application/epub+zip");
        assert!(read_entry(&mut archive, "META-INF/container.xml").contains("EPUB/content.opf"));
        assert!(read_entry(&mut archive, "EPUB/style.css").contains("text-indent: 1.5em"));
    }

    #[test]
    fn package_lists_chapters_in_order_and_escapes_metadata() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let path = dir.path().join("out.epub");
        write_epub(&sample_book(), &path).expect("epub should be written");
        let mut archive = ZipArchive::new(File::open(&path).expect("open")).expect("zip");

        let opf = read_entry(&mut archive, "EPUB/content.opf");
        assert!(opf.contains("<dc:title>Fish &amp; Chips</dc:title>"));
        assert!(opf.contains("<dc:publisher>Self-published</dc:publisher>"));
        assert!(opf.contains("<dc:date>2026-10-19</dc:date>"));
        let first = opf.find("idref=\"chapter_1\"").expect("chapter 1 in spine");
        let third = opf.find("idref=\"chapter_3\"").expect("chapter 3 in spine");
        assert!(first < third);
        assert!(!opf.contains("idref=\"nav\""));

        let nav = read_entry(&mut archive, "EPUB/nav.xhtml");
        assert!(nav.contains("<a href=\"chapter_2.xhtml\">Page 2</a>"));
        let ncx = read_entry(&mut archive, "EPUB/toc.ncx");
        assert!(ncx.contains("playOrder=\"3\""));

        let chapter = read_entry(&mut archive, "EPUB/chapter_2.xhtml");
        assert!(chapter.contains("<p>Body 1</p>"));
        assert!(chapter.contains("href=\"style.css\""));
        assert!(chapter.contains("xml:lang=\"en\""));
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let err = write_epub(&sample_book(), Path::new("/definitely/not/here/out.epub"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to create"));
    }
}
