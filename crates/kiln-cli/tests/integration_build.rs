//! Integration tests for the build command.
//!
//! These run `commands::build::execute` against a real project directory.

mod common;

use common::{file_names, wasm_pack_project};
use kiln_cli::cli::BuildArgs;
use kiln_cli::commands::build;
use kiln_cli::{BuildError, CliError, ConfigError};
use std::fs;
use std::path::PathBuf;

fn args_for(dir: &std::path::Path) -> BuildArgs {
    BuildArgs {
        cwd: Some(dir.to_path_buf()),
        year: Some(2024),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_build_default_targets() {
    let project = wasm_pack_project();

    build::execute(args_for(project.path())).await.unwrap();

    assert_eq!(
        file_names(&project.path().join("dist")),
        [
            "mbd-wasm.cjs.js",
            "mbd-wasm.cjs.js.map",
            "mbd-wasm.cjs_bg.wasm",
            "mbd-wasm.js",
            "mbd-wasm.js.map",
            "mbd-wasm.min.js",
            "mbd-wasm.min.js.map",
            "mbd-wasm_bg.wasm",
        ]
    );

    let minified = fs::read_to_string(project.path().join("dist/mbd-wasm.min.js")).unwrap();
    assert_eq!(
        minified.lines().next(),
        Some("// https://example.com/mbd v0.1.0 Copyright 2024 Jane Doe")
    );
    assert!(minified.ends_with("//# sourceMappingURL=mbd-wasm.min.js.map\n"));
}

#[tokio::test]
async fn test_build_with_config_file() {
    let project = wasm_pack_project();
    fs::write(
        project.path().join("kiln.config.json"),
        r#"{
            "outDir": "out",
            "metadata": { "author": "Acme Corp" },
            "targets": [
                { "id": "node", "format": "cjs", "output": "node/index.js" },
                { "id": "prod", "format": "umd", "output": "index.min.js", "minify": true, "inlineBinary": true }
            ]
        }"#,
    )
    .unwrap();

    build::execute(args_for(project.path())).await.unwrap();

    let out = project.path().join("out");
    assert!(out.join("node/index.js").exists());
    assert!(out.join("node/index.js.map").exists());
    assert!(out.join("node/index_bg.wasm").exists());
    assert!(out.join("index.min.js").exists());
    assert!(!out.join("index.min_bg.wasm").exists());

    let prod = fs::read_to_string(out.join("index.min.js")).unwrap();
    assert!(prod.starts_with("// https://example.com/mbd v0.1.0 Copyright 2024 Acme Corp\n"));
}

#[tokio::test]
async fn test_build_fails_when_inline_binary_missing() {
    let project = wasm_pack_project();
    fs::remove_file(project.path().join("pkg/mbd_wasm_bg.wasm")).unwrap();

    let err = build::execute(args_for(project.path())).await.unwrap_err();
    match err {
        CliError::Build(BuildError::TargetsFailed { failed, total }) => {
            assert_eq!(failed, ["minified"]);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    // external targets are still written
    let dist = project.path().join("dist");
    assert!(dist.join("mbd-wasm.js").exists());
    assert!(dist.join("mbd-wasm.cjs.js").exists());
    assert!(!dist.join("mbd-wasm.min.js").exists());
    assert!(!dist.join("mbd-wasm.min.js.map").exists());
}

#[tokio::test]
async fn test_build_missing_entry_writes_nothing() {
    let project = wasm_pack_project();
    fs::remove_file(project.path().join("pkg/mbd_wasm.js")).unwrap();

    let err = build::execute(args_for(project.path())).await.unwrap_err();
    assert!(matches!(err, CliError::Bundler(_)));
    assert!(file_names(&project.path().join("dist")).is_empty());
}

#[tokio::test]
async fn test_build_clean_removes_stale_files() {
    let project = wasm_pack_project();
    let dist = project.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("stale.js"), "old").unwrap();

    let args = BuildArgs {
        clean: true,
        sequential: true,
        ..args_for(project.path())
    };
    build::execute(args).await.unwrap();

    assert!(!dist.join("stale.js").exists());
    assert!(dist.join("mbd-wasm.js").exists());
}

#[tokio::test]
async fn test_build_rejects_project_root_as_out_dir() {
    let project = wasm_pack_project();
    let args = BuildArgs {
        out_dir: Some(PathBuf::from(".")),
        ..args_for(project.path())
    };

    let err = build::execute(args).await.unwrap_err();
    assert!(matches!(err, CliError::Build(BuildError::OutputNotWritable(_))));
}

#[tokio::test]
async fn test_build_without_manifest_requires_name() {
    let project = wasm_pack_project();
    fs::remove_file(project.path().join("Cargo.toml")).unwrap();

    let err = build::execute(args_for(project.path())).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Config(ConfigError::MissingField { ref field, .. }) if field == "name"
    ));
}
