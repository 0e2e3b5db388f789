//! Common helpers for Stencil integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use stencil_cli::test_utils::TestProject;

/// A `stencil` command running inside `project`.
pub fn stencil(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("stencil").expect("stencil binary is built");
    cmd.current_dir(project.path()).env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

/// Project with the usual layout: data, a helper library, a partial and two pages.
pub fn site_project(config: &str) -> TestProject {
    let project = TestProject::with_config(config).unwrap();
    project.write_file("data/site.json", r#"{"title": "Stencil", "year": 2026}"#).unwrap();
    project
        .write_file("helpers/format.tera", "{% macro shout(text) %}{{ text | upper }}{% endmacro %}")
        .unwrap();
    project.write_file("templates/partials/footer.tera", "<footer>{{ site.year }}</footer>").unwrap();
    project
        .write_file(
            "templates/pages/index.tera",
            "{% import \"format\" as f %}<h1>{{ f::shout(text=site.title) }}</h1>{% include \"partials/footer\" %}",
        )
        .unwrap();
    project.write_file("templates/pages/about.tera", "<p>About {{ site.title }}</p>").unwrap();
    project
}
