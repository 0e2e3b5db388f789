use predicates::prelude::*;

use crate::common::{site_project, stencil};
use stencil_cli::test_utils::TestProject;

#[test]
fn test_missing_project_file() {
    let project = TestProject::new().unwrap();

    stencil(&project)
        .arg("run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Project file not found"))
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn test_unknown_target_lists_available() {
    let project = site_project("[[targets]]\nname = \"pages\"\n[[targets]]\nname = \"bundle\"\n");

    stencil(&project)
        .args(["run", "pagez"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target 'pagez' is not defined"))
        .stderr(predicate::str::contains("Available targets: pages, bundle"));
}

#[test]
fn test_compile_failure_stops_run() {
    let project = TestProject::with_config(
        "[[targets]]\nname = \"bundle\"\ncompile = true\n[[targets.files]]\nexpand = true\nsrc = \"src/*.tera\"\ndest = \"out\"\next = \".js\"\n",
    )
    .unwrap();
    project.write_file("src/a.tera", "A").unwrap();
    project.write_file("src/b.tera", "{% for %}").unwrap();
    project.write_file("src/c.tera", "C").unwrap();

    stencil(&project)
        .args(["run", "bundle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to compile 'src/b.tera'"));

    assert!(project.file_exists("out/src/a.js"));
    assert!(!project.file_exists("out/src/b.js"));
    assert!(!project.file_exists("out/src/c.js"));
}

#[test]
fn test_missing_partial_suggests_names() {
    let project = site_project(
        "[options]\nresolve = \"templates\"\n[[targets]]\nname = \"pages\"\nrender = true\n[[targets.files]]\nsrc = \"templates/broken.tera\"\ndest = \"out/broken.html\"\n",
    );
    project.write_file("templates/broken.tera", "{% include \"partials/foter\" %}").unwrap();

    stencil(&project)
        .args(["run", "pages"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("partials/foter"))
        .stderr(predicate::str::contains("Did you mean: partials/footer?"));
}

#[test]
fn test_render_and_compile_together_rejected() {
    let project = TestProject::with_config("[[targets]]\nname = \"both\"\nrender = true\ncompile = true\n").unwrap();

    stencil(&project)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_malformed_data_is_not_fatal() {
    let project = site_project(
        "[options]\nresolve = \"templates\"\ndata = \"data/*.json\"\n[[targets]]\nname = \"about\"\nrender = true\n[[targets.files]]\nsrc = \"templates/pages/about.tera\"\ndest = \"out/about.html\"\n",
    );
    project.write_file("data/broken.json", "{ nope").unwrap();

    stencil(&project)
        .args(["run", "about"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 data/helper file(s) skipped"));
    assert_eq!(project.read_file("out/about.html").unwrap(), "<p>About Stencil</p>");
}
