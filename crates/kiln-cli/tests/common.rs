//! Fixture project shared by the CLI tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const MANIFEST: &str = r#"[package]
name = "mbd-wasm"
version = "0.1.0"
homepage = "https://example.com/mbd"
authors = ["Jane Doe <jane@example.com>"]
edition = "2021"

[lib]
crate-type = ["cdylib"]
"#;

pub const GLUE: &str = r#"var wasm;

function init(bytes) {
    return WebAssembly.instantiate(bytes, {}).then(function (result) {
        wasm = result.instance.exports;
        return { memory: wasm.memory };
    });
}
"#;

pub const WASM: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

/// A crate directory after `wasm-pack build --target no-modules`.
pub fn wasm_pack_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("Cargo.toml"), MANIFEST).unwrap();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::write(root.join("pkg/mbd_wasm.js"), GLUE).unwrap();
    fs::write(root.join("pkg/mbd_wasm_bg.wasm"), WASM).unwrap();
    dir
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
