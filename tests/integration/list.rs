use predicates::prelude::*;

use crate::common::stencil;
use stencil_cli::test_utils::TestProject;

#[test]
fn test_list_shows_targets_and_modes() {
    let project = TestProject::with_config(
        r#"
[[targets]]
name = "pages"
render = true

[[targets]]
name = "bundle"
compile = true
concat = true
[[targets.files]]
src = "templates/*.tera"
dest = "out/all.js"

[[targets]]
name = "client"
client = "out/js"

[[views]]
route = "/"
template = "index"
"#,
    )
    .unwrap();

    stencil(&project)
        .args(["list", "--files"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pages [render]"))
        .stdout(predicate::str::contains("bundle [compile] (concat)"))
        .stdout(predicate::str::contains("templates/*.tera -> out/all.js"))
        .stdout(predicate::str::contains("client [client] -> out/js"))
        .stdout(predicate::str::contains("/ -> index"));
}

#[test]
fn test_list_empty_project() {
    let project = TestProject::with_config("").unwrap();

    stencil(&project).arg("list").assert().success().stdout(predicate::str::contains("No targets defined"));
}
