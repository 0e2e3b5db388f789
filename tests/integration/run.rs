use predicates::prelude::*;

use crate::common::{site_project, stencil};

const SITE: &str = r#"
[options]
resolve = "templates"
data = "data/*.json"
helpers = "helpers/*.tera"

[[targets]]
name = "pages"
render = true
preserve_whitespace = false
[[targets.files]]
expand = true
cwd = "templates/pages"
src = "*.tera"
dest = "out"
ext = ".html"

[[targets]]
name = "bundle"
compile = true
concat = true
[[targets.files]]
src = ["templates/pages/*.tera"]
dest = "out/template/pages.js"
"#;

#[test]
fn test_run_renders_pages() {
    let project = site_project(SITE);

    stencil(&project)
        .args(["run", "pages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pages (render): 2 file(s) written"));

    assert_eq!(project.read_file("out/index.html").unwrap(), "<h1>STENCIL</h1><footer>2026</footer>");
    assert_eq!(project.read_file("out/about.html").unwrap(), "<p>About Stencil</p>");
    assert!(!project.file_exists("out/template/pages.js"));
}

#[test]
fn test_run_concatenates_compiled_templates() {
    let project = site_project(SITE);

    stencil(&project).args(["run", "bundle"]).assert().success();

    let bundle = project.read_file("out/template/pages.js").unwrap();
    let parts: Vec<&str> = bundle.split(";\n").collect();
    assert_eq!(parts.len(), 2);
    assert!(parts[0].starts_with(r#"(function(){templates.register("about","#));
    assert!(parts[1].starts_with(r#"(function(){templates.register("index","#));
}

#[test]
fn test_run_all_targets_in_declaration_order() {
    let project = site_project(SITE);

    let output = stencil(&project).arg("run").assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    let pages = stdout.find("pages (render)").unwrap();
    let bundle = stdout.find("bundle (compile)").unwrap();
    assert!(pages < bundle);
}

#[test]
fn test_quiet_suppresses_summary() {
    let project = site_project(SITE);

    stencil(&project).args(["-q", "run", "pages"]).assert().success().stdout(predicate::str::is_empty());
    assert!(project.file_exists("out/index.html"));
}

#[test]
fn test_target_without_mode_does_nothing() {
    let project = site_project("[[targets]]\nname = \"idle\"\n[[targets.files]]\nsrc = \"templates/**/*.tera\"\ndest = \"out\"\n");

    stencil(&project)
        .args(["run", "idle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idle (nothing): nothing to do"));
    assert!(!project.file_exists("out"));
}

#[test]
fn test_paths_are_relative_to_the_project_file() {
    let project = site_project(SITE);

    stencil(&project)
        .current_dir(project.join("templates"))
        .args(["--config", "../stencil.toml", "run", "pages"])
        .assert()
        .success();
    assert!(project.file_exists("out/index.html"));
    assert!(!project.file_exists("templates/out"));
}
