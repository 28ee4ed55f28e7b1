//! End-to-end pipeline tests over a real source tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use quill::Site;
use walkdir::WalkDir;

fn write_post(source: &Path, name: &str, content: &str) {
    let posts = source.join("_posts");
    fs::create_dir_all(&posts).unwrap();
    fs::write(posts.join(name), content).unwrap();
}

fn fixture(source: &Path) {
    fs::create_dir_all(source).unwrap();
    fs::write(
        source.join("_config.yml"),
        "title: Test Blog\nauthor: Tester\npage_size: 2\n",
    )
    .unwrap();

    write_post(
        source,
        "2024-01-15-post-a.md",
        "---\nlayout: post\ntitle: Post A\ntags: [x, y]\n---\nBody of A.\n\n```rust\nfn main() {}\n```\n",
    );
    write_post(
        source,
        "2024-01-10-post-b.md",
        "---\nlayout: post\ntitle: Post B\ntags: [y]\n---\nBody of B with ![pic](img/pic.png).\n",
    );
    write_post(
        source,
        "2024-01-05-post-c.md",
        "---\nlayout: post\ntitle: Post C\n---\nBody of C.\n",
    );

    let assets = source.join("assets/img");
    fs::create_dir_all(&assets).unwrap();
    fs::write(assets.join("pic.png"), b"not really a png").unwrap();
}

/// Relative path -> file contents for a whole output tree.
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut map = BTreeMap::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.unwrap();
        if entry.path().is_file() {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .to_string();
            map.insert(rel, fs::read(entry.path()).unwrap());
        }
    }
    map
}

#[test]
fn builds_full_site() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);

    let site = Site::new(&source, &output, None).unwrap();
    let summary = site.build().unwrap();
    assert_eq!(summary.documents, 3);

    // index page, newest first
    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("Post A"));
    let a_pos = index.find("Post A").unwrap();
    let b_pos = index.find("Post B").unwrap();
    assert!(a_pos < b_pos);

    // page_size 2 over 3 posts: a second listing page exists
    assert!(output.join("page/2/index.html").exists());
    assert!(!output.join("page/3").exists());

    // one standalone page per post
    assert!(output.join("2024/01/post-a/index.html").exists());
    assert!(output.join("2024/01/post-b/index.html").exists());
    assert!(output.join("2024/01/post-c/index.html").exists());

    // archive, feed, search index, copied assets
    assert!(output.join("archives/index.html").exists());
    assert!(output.join("atom.xml").exists());
    assert!(output.join("search.json").exists());
    assert!(output.join("assets/img/pic.png").exists());
}

#[test]
fn tag_pages_list_exactly_their_documents() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);

    Site::new(&source, &output, None).unwrap().build().unwrap();

    let y = fs::read_to_string(output.join("tags/y/index.html")).unwrap();
    assert!(y.contains("Post A"));
    assert!(y.contains("Post B"));
    assert!(!y.contains("Post C"));

    let x = fs::read_to_string(output.join("tags/x/index.html")).unwrap();
    assert!(x.contains("Post A"));
    assert!(!x.contains("Post B"));
}

#[test]
fn fenced_language_survives_to_output() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);

    Site::new(&source, &output, None).unwrap().build().unwrap();

    let page = fs::read_to_string(output.join("2024/01/post-a/index.html")).unwrap();
    assert!(page.contains("language-rust"));
}

#[test]
fn resolved_asset_reference_is_left_as_written() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);

    let summary = Site::new(&source, &output, None).unwrap().build().unwrap();
    assert!(summary.report.is_empty());

    let page = fs::read_to_string(output.join("2024/01/post-b/index.html")).unwrap();
    assert!(page.contains(r#"<img src="img/pic.png""#));
}

#[test]
fn unresolved_asset_renders_placeholder_and_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);
    write_post(
        &source,
        "2024-02-01-broken.md",
        "---\nlayout: post\ntitle: Broken\n---\n![gone](img/gone.png)\n",
    );

    let summary = Site::new(&source, &output, None).unwrap().build().unwrap();
    assert_eq!(summary.report.len(), 1);

    let page = fs::read_to_string(output.join("2024/02/broken/index.html")).unwrap();
    assert!(page.contains("broken-asset"));
}

#[test]
fn malformed_document_is_skipped_others_unaffected() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);
    write_post(
        &source,
        "2024-03-01-untitled.md",
        "---\nlayout: post\n---\nNo title here.\n",
    );

    let summary = Site::new(&source, &output, None).unwrap().build().unwrap();
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.report.len(), 1);
    assert!(!output.join("2024/03").exists());
}

#[test]
fn duplicate_identifiers_abort_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);
    // Same file stem in a nested directory resolves to the same identifier
    let nested = source.join("_posts/nested");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("2024-01-15-post-a.md"),
        "---\nlayout: post\ntitle: Shadow\n---\nbody\n",
    )
    .unwrap();

    let err = Site::new(&source, &output, None).unwrap().build().unwrap_err();
    assert!(matches!(err, quill::error::Error::DuplicateId { .. }));
}

#[test]
fn colliding_tag_slugs_get_distinct_pages() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fs::create_dir_all(&source).unwrap();
    write_post(
        &source,
        "2024-05-01-cpp.md",
        "---\nlayout: post\ntitle: Cpp Post\ntags: [\"C++\"]\n---\nplus plus\n",
    );
    write_post(
        &source,
        "2024-05-02-c.md",
        "---\nlayout: post\ntitle: C Post\ntags: [c]\n---\nplain c\n",
    );

    Site::new(&source, &output, None).unwrap().build().unwrap();

    // both tags keep a page of their own
    let cpp = fs::read_to_string(output.join("tags/c/index.html")).unwrap();
    assert!(cpp.contains("Cpp Post"));
    assert!(!cpp.contains("C Post"));

    let c = fs::read_to_string(output.join("tags/c-2/index.html")).unwrap();
    assert!(c.contains("C Post"));
    assert!(!c.contains("Cpp Post"));

    // and the listing links at the disambiguated slug
    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("/tags/c/"));
    assert!(index.contains("/tags/c-2/"));
}

#[test]
fn equal_dates_order_by_identifier() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fs::create_dir_all(&source).unwrap();
    write_post(
        &source,
        "2024-06-01-zebra.md",
        "---\nlayout: post\ntitle: Zebra\n---\nz\n",
    );
    write_post(
        &source,
        "2024-06-01-apple.md",
        "---\nlayout: post\ntitle: Apple\n---\na\n",
    );

    Site::new(&source, &output, None).unwrap().build().unwrap();

    let index = fs::read_to_string(output.join("index.html")).unwrap();
    let apple = index.find("Apple").unwrap();
    let zebra = index.find("Zebra").unwrap();
    assert!(apple < zebra);
}

#[test]
fn two_runs_produce_byte_identical_output() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    fixture(&source);

    let out1 = tmp.path().join("out1");
    let out2 = tmp.path().join("out2");
    Site::new(&source, &out1, None).unwrap().build().unwrap();
    Site::new(&source, &out2, None).unwrap().build().unwrap();

    let snap1 = snapshot(&out1);
    let snap2 = snapshot(&out2);
    assert!(!snap1.is_empty());
    assert_eq!(snap1, snap2);
}

#[test]
fn cli_page_size_overrides_config() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("source");
    let output = tmp.path().join("public");
    fixture(&source);

    // config says 2; override with 10 so everything fits on one page
    Site::new(&source, &output, Some(10)).unwrap().build().unwrap();
    assert!(!output.join("page").exists());
}
