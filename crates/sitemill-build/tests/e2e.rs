//! End-to-end tests for the build pipeline.
//!
//! Each test lays out a complete site in a temp directory (config,
//! templates, fixtures, static files), runs a real build through the public
//! API and asserts on the produced tree.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use sitemill_build::{BuildReport, Builder, TeraRenderer};
use sitemill_content::client_from_config;
use sitemill_core::{
    Config, Entry, RenderTarget, Target, TargetGenerator, TargetNode, TargetSpec,
};
use tempfile::TempDir;

const PAGE_TEMPLATE: &str = "<h1>{{ title }}</h1>\n<ul>{% for page in pages %}<li>{{ page.fields.title }}</li>{% endfor %}</ul>\n";

const PAGE_FIXTURES: &str = r#"[
    { "sys": { "id": "1" }, "fields": { "url": "home", "title": "Home" } },
    { "sys": { "id": "2" }, "fields": { "url": "about", "title": "About" } }
]"#;

/// Lay out a complete test site under `root` and return the config path.
fn create_test_site(root: &Path) -> PathBuf {
    let templates = root.join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("page.html"), PAGE_TEMPLATE).unwrap();
    fs::write(
        templates.join("404.html"),
        "<h1>Not Found</h1><p>{{ site_name }}</p>",
    )
    .unwrap();

    let fixtures = root.join("fixtures");
    fs::create_dir_all(&fixtures).unwrap();
    fs::write(fixtures.join("page.json"), PAGE_FIXTURES).unwrap();

    let static_dir = root.join("static");
    fs::create_dir_all(static_dir.join("css")).unwrap();
    fs::write(static_dir.join("css/site.css"), "body { margin: 0 }").unwrap();
    fs::write(static_dir.join("robots.txt"), "User-agent: *\n").unwrap();

    let config_path = root.join("sitemill.toml");
    fs::write(config_path.as_path(), site_config(root)).unwrap();
    config_path
}

fn site_config(root: &Path) -> String {
    let root = root.display();
    format!(
        r#"
[build]
output_dir = "{root}/dist"
templates_dir = "{root}/templates"
concurrency = 4

[content]
provider = "fixtures"
fixtures_dir = "{root}/fixtures"

[[sources]]
name = "pages"
content_type = "page"

[[targets]]
src = "{root}/static"
dest = "{root}/dist"

[[targets]]
template = "404.html"
dest = "{root}/dist/404.html"
extra_context = {{ site_name = "Sitemill" }}

[[targets]]
each = "pages"
template = "page.html"
dest = "{root}/dist/{{{{ fields.url }}}}/index.html"
include = ["pages"]
"#
    )
}

/// Load the config, wire up real collaborators and run one build.
async fn run_build(config_path: &Path) -> BuildReport {
    let config = Config::load(config_path).unwrap();
    let client = client_from_config(&config.content).unwrap();
    let renderer = TeraRenderer::from_dir(Path::new(&config.build.templates_dir)).unwrap();
    Builder::new(config, client, Box::new(renderer))
        .build()
        .await
        .unwrap()
}

/// Read every file under `dir` into a path -> bytes map.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            files.insert(relative, fs::read(entry.path()).unwrap());
        }
    }
    files
}

#[tokio::test]
async fn test_full_build_produces_site() {
    let dir = TempDir::new().unwrap();
    let config_path = create_test_site(dir.path());

    let report = run_build(&config_path).await;
    assert!(report.success());
    assert_eq!(report.collisions, 0);
    // static copy + 404 + two fanned-out pages
    assert_eq!(report.written, 4);

    let dist = dir.path().join("dist");
    assert_eq!(
        fs::read_to_string(dist.join("css/site.css")).unwrap(),
        "body { margin: 0 }"
    );
    assert_eq!(
        fs::read_to_string(dist.join("robots.txt")).unwrap(),
        "User-agent: *\n"
    );
    assert_eq!(
        fs::read_to_string(dist.join("404.html")).unwrap(),
        "<h1>Not Found</h1><p>Sitemill</p>"
    );

    let home = fs::read_to_string(dist.join("home/index.html")).unwrap();
    assert!(home.contains("<h1>Home</h1>"));
    assert!(home.contains("<li>Home</li>"));
    assert!(home.contains("<li>About</li>"));

    let about = fs::read_to_string(dist.join("about/index.html")).unwrap();
    assert!(about.contains("<h1>About</h1>"));
}

#[tokio::test]
async fn test_build_removes_stale_output() {
    let dir = TempDir::new().unwrap();
    let config_path = create_test_site(dir.path());

    let dist = dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("stale.html"), "old").unwrap();

    let report = run_build(&config_path).await;
    assert!(report.success());
    assert!(!dist.join("stale.html").exists());
    assert!(dist.join("404.html").exists());
}

#[tokio::test]
async fn test_retargeted_output_builds_site_elsewhere() {
    let dir = TempDir::new().unwrap();
    let config_path = create_test_site(dir.path());

    let mut config = Config::load(&config_path).unwrap();
    let public = dir.path().join("public");
    config.retarget_output(public.display().to_string());

    let client = client_from_config(&config.content).unwrap();
    let renderer = TeraRenderer::from_dir(Path::new(&config.build.templates_dir)).unwrap();
    let report = Builder::new(config, client, Box::new(renderer))
        .build()
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(report.written, 4);
    assert!(public.join("404.html").exists());
    assert!(public.join("home/index.html").exists());
    assert!(public.join("css/site.css").exists());
    assert!(!dir.path().join("dist").exists());
}

#[tokio::test]
async fn test_rebuild_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let config_path = create_test_site(dir.path());
    let dist = dir.path().join("dist");

    run_build(&config_path).await;
    let first = snapshot(&dist);
    assert!(!first.is_empty());

    run_build(&config_path).await;
    let second = snapshot(&dist);

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_sequential_build_matches_concurrent() {
    let dir = TempDir::new().unwrap();
    let config_path = create_test_site(dir.path());
    run_build(&config_path).await;
    let concurrent = snapshot(&dir.path().join("dist"));

    let sequential_dir = TempDir::new().unwrap();
    let config_path = create_test_site(sequential_dir.path());
    let config = fs::read_to_string(&config_path)
        .unwrap()
        .replace("concurrency = 4", "concurrency = 1");
    fs::write(&config_path, config).unwrap();
    run_build(&config_path).await;
    let sequential = snapshot(&sequential_dir.path().join("dist"));

    assert_eq!(concurrent, sequential);
}

#[tokio::test]
async fn test_destination_collision_last_target_wins() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let templates = root.join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("first.html"), "first").unwrap();
    fs::write(templates.join("second.html"), "second").unwrap();

    fs::create_dir_all(root.join("fixtures")).unwrap();

    let config_path = root.join("sitemill.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[build]
output_dir = "{root}/dist"
templates_dir = "{root}/templates"

[content]
provider = "fixtures"
fixtures_dir = "{root}/fixtures"

[[targets]]
template = "first.html"
dest = "{root}/dist/index.html"

[[targets]]
template = "second.html"
dest = "{root}/dist/index.html"
"#,
            root = root.display()
        ),
    )
    .unwrap();

    let report = run_build(&config_path).await;
    assert!(report.success());
    assert_eq!(report.collisions, 1);
    assert_eq!(report.written, 1);
    assert_eq!(
        fs::read_to_string(root.join("dist/index.html")).unwrap(),
        "second"
    );
}

#[tokio::test]
async fn test_failed_target_does_not_stop_siblings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let templates = root.join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("good.html"), "good").unwrap();

    fs::create_dir_all(root.join("fixtures")).unwrap();

    let config_path = root.join("sitemill.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[build]
output_dir = "{root}/dist"
templates_dir = "{root}/templates"

[content]
provider = "fixtures"
fixtures_dir = "{root}/fixtures"

[[targets]]
template = "missing.html"
dest = "{root}/dist/broken.html"

[[targets]]
template = "good.html"
dest = "{root}/dist/good.html"
"#,
            root = root.display()
        ),
    )
    .unwrap();

    let report = run_build(&config_path).await;
    assert!(!report.success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.written, 1);
    assert!(report.failures[0].target.contains("missing.html"));
    assert_eq!(
        fs::read_to_string(root.join("dist/good.html")).unwrap(),
        "good"
    );
    assert!(!root.join("dist/broken.html").exists());
}

#[tokio::test]
async fn test_programmatic_spec_with_generator() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let config_path = create_test_site(root);

    let config = Config::load(&config_path).unwrap();
    let client = client_from_config(&config.content).unwrap();
    let renderer = TeraRenderer::from_dir(Path::new(&config.build.templates_dir)).unwrap();

    let out = root.join("dist");
    let spec: TargetSpec = vec![TargetGenerator::named("pages by id", {
        let out = out.clone();
        move |data| {
            let entries = data.get("pages").ok_or("pages missing")?;
            let nodes = entries
                .iter()
                .map(|entry: &Entry| {
                    TargetNode::Concrete(Target::Render(
                        RenderTarget::new("page.html", out.join(format!("{}.html", entry.id)))
                            .with_include(["pages"])
                            .with_context_value("title", entry.id.as_str()),
                    ))
                })
                .collect();
            Ok(TargetNode::List(nodes))
        }
    })
    .into()];

    let report = Builder::new(config, client, Box::new(renderer))
        .with_spec(spec)
        .build()
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(report.written, 2);
    assert!(fs::read_to_string(out.join("1.html"))
        .unwrap()
        .contains("<h1>1</h1>"));
    assert!(out.join("2.html").exists());
}
