//! End-to-end tests for the packaging pipeline.
//!
//! These tests verify:
//! 1. The default table writes every file with the fixed naming convention
//! 2. Output bytes are deterministic across runs and execution modes
//! 3. Binary integration, banner and source map contracts hold per target
//! 4. Target failures are isolated and leave no previous outputs behind

mod helpers;

use std::fs;

use helpers::*;
use kiln_bundler::{Error, SourceMap, TargetSpec};

#[test]
fn default_table_writes_every_file() {
    let project = Project::new();
    let report = project.pipeline("dist").run().unwrap();
    assert!(report.is_success());

    let ids: Vec<_> = report.outcomes().map(|(id, _)| id).collect();
    assert_eq!(ids, ["standard", "commonjs", "minified"]);

    let names: Vec<_> = snapshot(&project.dist("dist"))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        names,
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
    assert_eq!(
        fs::read(project.dist("dist").join("mbd-wasm_bg.wasm")).unwrap(),
        WASM
    );
}

#[test]
fn runs_are_byte_identical() {
    let project = Project::new();
    project.pipeline("first").run().unwrap();
    project.pipeline("second").run().unwrap();

    assert_eq!(
        snapshot(&project.dist("first")),
        snapshot(&project.dist("second"))
    );
}

#[test]
fn parallel_and_sequential_match() {
    let project = Project::new();
    project.pipeline("parallel").parallel(true).run().unwrap();
    project.pipeline("sequential").sequential().run().unwrap();

    assert_eq!(
        snapshot(&project.dist("parallel")),
        snapshot(&project.dist("sequential"))
    );
}

#[test]
fn binary_references_follow_strategy() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");

    let standard = read(&dist, "mbd-wasm.js");
    assert_eq!(standard.matches("mbd-wasm_bg.wasm").count(), 1);

    let commonjs = read(&dist, "mbd-wasm.cjs.js");
    assert_eq!(commonjs.matches("mbd-wasm.cjs_bg.wasm").count(), 1);

    let minified = read(&dist, "mbd-wasm.min.js");
    assert!(!minified.contains(".wasm"));
    assert!(minified.contains("AGFzbQEAAAA="));
}

#[test]
fn banner_only_on_production_target() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");

    let minified = read(&dist, "mbd-wasm.min.js");
    assert_eq!(minified.lines().next(), Some(BANNER));
    assert_eq!(minified.matches(BANNER).count(), 1);

    assert!(!read(&dist, "mbd-wasm.js").contains("Copyright"));
    assert!(!read(&dist, "mbd-wasm.cjs.js").contains("Copyright"));
}

#[test]
fn source_map_references_resolve() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");

    for file in ["mbd-wasm.js", "mbd-wasm.cjs.js", "mbd-wasm.min.js"] {
        let code = read(&dist, file);
        let last = code.lines().last().unwrap();
        let map_file = last
            .strip_prefix("//# sourceMappingURL=")
            .unwrap_or_else(|| panic!("{} has no map reference", file));
        assert_eq!(map_file, format!("{}.map", file));

        let json = read(&dist, map_file);
        let map = SourceMap::from_json_string(&json).unwrap();
        assert_eq!(map.get_file().map(|f| f.to_string()), Some(file.to_string()));
        assert_eq!(
            map.get_source(0).map(|s| s.to_string()),
            Some("../pkg/mbd.js".to_string())
        );
        assert!(map.get_tokens().count() > 0, "{} has an empty map", file);
    }
}

#[test]
fn banner_line_is_unmapped() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");

    let json = read(&dist, "mbd-wasm.min.js.map");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let mappings = value["mappings"].as_str().unwrap();
    assert!(mappings.starts_with(';'));

    let map = SourceMap::from_json_string(&json).unwrap();
    assert!(map.get_tokens().all(|t| t.get_dst_line() > 0));
}

#[test]
fn glue_lines_map_back_to_glue() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");

    let code = read(&dist, "mbd-wasm.js");
    let generated: Vec<&str> = code.lines().collect();
    let map = SourceMap::from_json_string(&read(&dist, "mbd-wasm.js.map")).unwrap();
    for token in map.get_tokens() {
        let original = GLUE.lines().nth(token.get_src_line() as usize).unwrap();
        assert_eq!(generated[token.get_dst_line() as usize], original);
    }
}

#[test]
fn standard_and_commonjs_share_the_surface() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");

    let standard = read(&dist, "mbd-wasm.js");
    let commonjs = read(&dist, "mbd-wasm.cjs.js");
    for code in [&standard, &commonjs] {
        assert!(code.contains(GLUE));
        assert!(code.contains("__kiln_default.default = __kiln_default;"));
        assert!(code.contains("return init(bytes);"));
    }
    assert!(standard.contains("global[\"mbd-wasm\"] = factory()"));
    assert!(commonjs.contains("module.exports = __kiln_default;"));
}

#[test]
fn missing_binary_fails_only_inline_target() {
    let project = Project::new();
    fs::remove_file(project.binary()).unwrap();

    let report = project.pipeline("dist").run().unwrap();
    assert!(!report.is_success());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    let (id, err) = failures[0];
    assert_eq!(id, "minified");
    assert!(matches!(err, Error::AssetNotFound { .. }));
    assert!(err.to_string().contains("mbd_bg.wasm"));

    let names: Vec<_> = snapshot(&project.dist("dist"))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        names,
        [
            "mbd-wasm.cjs.js",
            "mbd-wasm.cjs.js.map",
            "mbd-wasm.js",
            "mbd-wasm.js.map",
        ]
    );
}

#[test]
fn unknown_format_is_a_target_config_error() {
    let project = Project::new();
    let targets = vec![
        TargetSpec {
            id: "esm".into(),
            format: "esm".into(),
            output: "mbd.mjs.js".into(),
            sourcemap: true,
            inline_binary: false,
            minify: false,
            banner: None,
        },
        TargetSpec {
            id: "node".into(),
            format: "cjs".into(),
            output: "mbd.cjs.js".into(),
            sourcemap: false,
            inline_binary: true,
            minify: false,
            banner: None,
        },
    ];

    let report = project.pipeline("dist").targets(targets).run().unwrap();
    assert!(!report.is_success());

    let err = report.get("esm").unwrap().unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("'esm'"));

    let node = report.get("node").unwrap().unwrap();
    assert!(node.sourcemap_file.is_none());
    assert!(node.code_file.exists());
    assert!(!project.dist("dist").join("mbd.mjs.js").exists());
}

#[test]
fn rebuild_without_binary_leaves_no_stale_outputs() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let dist = project.dist("dist");
    assert!(dist.join("mbd-wasm_bg.wasm").exists());
    assert!(dist.join("mbd-wasm.min.js").exists());

    fs::remove_file(project.binary()).unwrap();
    let report = project.pipeline("dist").run().unwrap();
    assert!(matches!(report.get("minified"), Some(Err(Error::AssetNotFound { .. }))));

    let names: Vec<_> = snapshot(&dist).into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        [
            "mbd-wasm.cjs.js",
            "mbd-wasm.cjs.js.map",
            "mbd-wasm.js",
            "mbd-wasm.js.map",
        ]
    );
}

#[test]
fn invalid_entry_aborts_before_writing() {
    let project = Project::new();
    fs::write(project.entry(), "function start(bytes) { return bytes; }\n").unwrap();

    let err = project.pipeline("dist").run().unwrap_err();
    assert!(matches!(err, Error::InvalidEntry { .. }));
    assert!(err.to_string().contains("standard, commonjs, minified"));
    assert!(!project.dist("dist").exists());
}

#[test]
fn duplicate_ids_abort_before_writing() {
    let project = Project::new();
    let mut targets = kiln_bundler::default_targets("mbd-wasm");
    targets[1].id = "standard".into();

    let err = project.pipeline("dist").targets(targets).run().unwrap_err();
    assert!(matches!(err, Error::InvalidTargetTable(_)));
    assert!(!project.dist("dist").exists());
}

#[test]
fn nested_output_maps_relative_to_its_directory() {
    let project = Project::new();
    let targets = vec![TargetSpec {
        id: "browser".into(),
        format: "umd".into(),
        output: "umd/mbd.js".into(),
        sourcemap: true,
        inline_binary: false,
        minify: true,
        banner: Some(false),
    }];

    let report = project.pipeline("dist").targets(targets).run().unwrap();
    assert!(report.is_success());

    let dist = project.dist("dist").join("umd");
    let code = read(&dist, "mbd.js");
    assert!(!code.starts_with("//"));
    assert!(code.contains("mbd_bg.wasm"));
    assert!(dist.join("mbd_bg.wasm").exists());

    let map = SourceMap::from_json_string(&read(&dist, "mbd.js.map")).unwrap();
    assert_eq!(
        map.get_source(0).map(|s| s.to_string()),
        Some("../../pkg/mbd.js".to_string())
    );
}

#[test]
fn rerun_overwrites_previous_output() {
    let project = Project::new();
    project.pipeline("dist").run().unwrap();
    let first = snapshot(&project.dist("dist"));

    project.pipeline("dist").run().unwrap();
    assert_eq!(snapshot(&project.dist("dist")), first);
}

struct Counting(std::sync::atomic::AtomicUsize);

impl kiln_bundler::Transform for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn transform(
        &self,
        code: &str,
        map: Option<&SourceMap>,
    ) -> Result<(String, Option<SourceMap>), kiln_bundler::TransformError> {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok((code.to_string(), map.cloned()))
    }
}

#[test]
fn transform_runs_only_for_minified_targets() {
    let project = Project::new();
    let counting = std::sync::Arc::new(Counting(Default::default()));

    let report = project
        .pipeline("dist")
        .minifier(counting.clone())
        .run()
        .unwrap();
    assert!(report.is_success());
    assert_eq!(counting.0.load(std::sync::atomic::Ordering::SeqCst), 1);

    // identity transform: the production bundle is the wrapped glue plus banner
    let minified = read(&project.dist("dist"), "mbd-wasm.min.js");
    assert!(minified.starts_with(&format!("{}\n(function (global, factory) {{", BANNER)));
}
