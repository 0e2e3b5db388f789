use predicates::prelude::*;

use crate::common::stencil;
use stencil_cli::client::loader_script;
use stencil_cli::test_utils::TestProject;

#[test]
fn test_client_target_writes_four_bundles() {
    let project = TestProject::with_config(
        "[[targets]]\nname = \"client\"\nclient = \"out/js\"\nresolve = \"/template/\"\n",
    )
    .unwrap();
    project.write_dist("vendor/engine", "engine").unwrap();

    stencil(&project)
        .args(["run", "client"])
        .assert()
        .success()
        .stdout(predicate::str::contains("client (client): 4 file(s) written"));

    for variant in ["core.js", "core.min.js", "full.js", "full.min.js"] {
        let bundle = project.read_file(&format!("out/js/engine-{variant}")).unwrap();
        assert_eq!(bundle, format!("/* {variant} */;\n{}", loader_script("/template/")));
    }
}

#[test]
fn test_client_command_with_helpers() {
    let project = TestProject::new().unwrap();
    project.write_dist("dist", "tpl").unwrap();
    project.write_file("dist/tpl-helpers.js", "/* engine helpers */").unwrap();
    project.write_file("js/helpers/date.js", "/* date helper */").unwrap();

    stencil(&project)
        .args([
            "client",
            "--dest",
            "public",
            "--dist-dir",
            "dist",
            "--dist-prefix",
            "tpl",
            "--engine-helpers",
            "--builtin-helpers",
            "--helpers",
            "js/helpers/*.js",
        ])
        .assert()
        .success();

    let bundle = project.read_file("public/tpl-core.js").unwrap();
    assert!(bundle.starts_with("/* core.js */;\n/* Engine Helpers */\n/* engine helpers */\n"));
    assert!(bundle.contains("/* Built-in Helpers */"));
    assert!(bundle.contains("/* User Helpers */\n/* date helper */\n"));
    assert!(bundle.ends_with(&loader_script("")));
}

#[test]
fn test_client_missing_dist_fails() {
    let project = TestProject::new().unwrap();

    stencil(&project)
        .args(["client", "--dest", "public"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Client distribution file not found"));
    assert!(!project.file_exists("public"));
}
