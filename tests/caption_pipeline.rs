//! End-to-end runs over a small documentation output tree.
//!
//! Exercises the public library API the way the CLI does: load config and
//! template, collect files from a manifest or a directory, process them, check
//! what ended up on disk.

use image_legend::config::{self, CONFIG_FILENAME};
use image_legend::driver::{CaptionOptions, ErrorKind, process_files};
use image_legend::html::Html5Engine;
use image_legend::manifest::{discover_html_files, load_manifest};
use image_legend::template::{self, Template};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FIGURE: &str = "<figure>{img}<figcaption>{title}</figcaption></figure>";

fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>Docs</title></head><body>{body}</body></html>")
}

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// A DocFX-like output folder: two conceptual pages, one API page, a manifest.
fn site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "articles/intro.html",
        &page(r#"<header><img id="logo" title="Brand" src="logo.svg"></header><main><img title="A sunset" src="sunset.png"></main>"#),
    );
    write(
        root,
        "articles/plain.html",
        &page(r#"<p><img src="diagram.png" alt="no title"></p>"#),
    );
    write(
        root,
        "api/Foo.html",
        &page(r#"<img title="API image" src="foo.png">"#),
    );
    write(
        root,
        "manifest.json",
        r#"{
            "files": [
                { "type": "Conceptual", "output": { ".html": { "relative_path": "articles/intro.html" } } },
                { "type": "Conceptual", "output": { ".html": { "relative_path": "articles/plain.html" } } },
                { "type": "ManagedReference", "output": { ".html": { "relative_path": "api/Foo.html" } } }
            ]
        }"#,
    );
    tmp
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn manifest_run_captions_conceptual_pages_only() {
    let tmp = site();
    let root = tmp.path();
    let config = config::load_config(root).unwrap();
    let manifest = load_manifest(&root.join("manifest.json")).unwrap();
    let paths = manifest.html_outputs(root, &config.document_types);
    let api_before = read(&root.join("api/Foo.html"));
    let plain_before = read(&root.join("articles/plain.html"));

    let summary = process_files(
        &Html5Engine,
        &Template::new(FIGURE),
        &paths,
        CaptionOptions {
            mark_captions: false,
        },
    );

    assert!(summary.failures.is_empty());
    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.captions(), 1);
    assert_eq!(
        read(&root.join("articles/intro.html")),
        page(
            r#"<header><img id="logo" title="Brand" src="logo.svg"></header><main><figure><img title="A sunset" src="sunset.png"><figcaption>A sunset</figcaption></figure></main>"#
        )
    );
    assert_eq!(read(&root.join("articles/plain.html")), plain_before);
    assert_eq!(read(&root.join("api/Foo.html")), api_before);
}

#[test]
fn directory_run_with_bundled_template_is_stable_on_rerun() {
    let tmp = site();
    let root = tmp.path();
    let template = template::load(None).unwrap();
    let paths = discover_html_files(root).unwrap();
    assert_eq!(paths.len(), 3);

    let first = process_files(&Html5Engine, &template, &paths, CaptionOptions::default());
    assert_eq!(first.captions(), 2);
    let intro = read(&root.join("articles/intro.html"));
    assert!(intro.contains(r#"<figure class="image-legend" data-image-legend="">"#));
    assert!(intro.contains("<figcaption>A sunset</figcaption>"));

    let second = process_files(&Html5Engine, &template, &paths, CaptionOptions::default());
    assert_eq!(second.captions(), 0);
    assert_eq!(second.rewritten(), 0);
    assert_eq!(read(&root.join("articles/intro.html")), intro);
}

#[test]
fn escaped_titles_stay_text() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "page.html",
        &page(r#"<img title="Fish &amp; chips <b>hot</b>">"#),
    );

    process_files(
        &Html5Engine,
        &Template::new(FIGURE),
        std::slice::from_ref(&path),
        CaptionOptions::default(),
    );

    let html = read(&path);
    assert!(html.contains("<figcaption>Fish &amp; chips &lt;b&gt;hot&lt;/b&gt;</figcaption>"));
    assert!(!html.contains("<b>hot</b>"));
    // The rewritten page parses back to the same thing.
    let reparsed = image_legend::html::HtmlEngine::parse_document(&Html5Engine, &html).unwrap();
    assert_eq!(reparsed.to_html(), html);
}

#[test]
fn missing_configured_template_stops_before_any_file() {
    let tmp = site();
    let root = tmp.path();
    fs::write(root.join(CONFIG_FILENAME), r#"template = "templates/missing.html""#).unwrap();
    let intro_before = read(&root.join("articles/intro.html"));

    let config = config::load_config(root).unwrap();
    let err = template::load(config.template.as_deref()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResourceMissing);
    assert!(err.to_string().contains("missing.html"));
    assert_eq!(read(&root.join("articles/intro.html")), intro_before);
}

#[test]
fn configured_template_is_used() {
    let tmp = site();
    let root = tmp.path();
    write(
        root,
        "templates/legend.html",
        r#"<div class="legend">{img}<p class="legend-text">{title}</p></div>"#,
    );
    fs::write(
        root.join(CONFIG_FILENAME),
        "template = \"templates/legend.html\"\nmark_captions = false\n",
    )
    .unwrap();

    let config = config::load_config(root).unwrap();
    let template = template::load(config.template.as_deref()).unwrap();
    let intro = root.join("articles/intro.html");
    process_files(
        &Html5Engine,
        &template,
        std::slice::from_ref(&intro),
        CaptionOptions::from(&config),
    );

    assert!(read(&intro).contains(
        r#"<div class="legend"><img title="A sunset" src="sunset.png"><p class="legend-text">A sunset</p></div>"#
    ));
}

#[test]
fn broken_file_does_not_stop_the_run() {
    let tmp = site();
    let root = tmp.path();
    let broken = root.join("articles/broken.html");
    fs::write(&broken, b"<img title=\"x\">\xc3\x28").unwrap();
    let mut paths = discover_html_files(root).unwrap();
    paths.sort();

    let summary = process_files(
        &Html5Engine,
        &Template::new(FIGURE),
        &paths,
        CaptionOptions::default(),
    );

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].path, broken);
    assert_eq!(summary.failures[0].kind(), ErrorKind::ParseFailure);
    assert_eq!(fs::read(&broken).unwrap(), b"<img title=\"x\">\xc3\x28");
    assert_eq!(summary.captions(), 2);
    assert!(!summary.all_failed());
}
