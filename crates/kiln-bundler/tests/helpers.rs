//! Shared test utilities for kiln-bundler tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use kiln_bundler::{Pipeline, ProjectMetadata, ProvenanceBanner};
use tempfile::TempDir;

/// Glue in the shape the binding generator emits: a classic script with a
/// top-level init function taking the module bytes.
pub const GLUE: &str = r#"var wasm;

function getStringFromWasm(ptr, len) {
    return new TextDecoder('utf-8').decode(new Uint8Array(wasm.memory.buffer).subarray(ptr, ptr + len));
}

function init(bytes) {
    return WebAssembly.instantiate(bytes, {}).then(function (result) {
        wasm = result.instance.exports;
        return {
            version: function () {
                return getStringFromWasm(wasm.version_ptr(), wasm.version_len());
            }
        };
    });
}
"#;

/// Smallest valid module: magic + version.
pub const WASM: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

pub const BANNER: &str = "// https://example.com/mbd v0.1.0 Copyright 2024 Jane Doe";

pub struct Project {
    pub dir: TempDir,
}

impl Project {
    /// `pkg/mbd.js` and `pkg/mbd_bg.wasm` in a fresh temp directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("mbd.js"), GLUE).unwrap();
        fs::write(pkg.join("mbd_bg.wasm"), WASM).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn entry(&self) -> PathBuf {
        self.root().join("pkg/mbd.js")
    }

    pub fn binary(&self) -> PathBuf {
        self.root().join("pkg/mbd_bg.wasm")
    }

    pub fn dist(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Pipeline over the default table with a fixed banner year.
    pub fn pipeline(&self, out_dir: &str) -> Pipeline {
        let metadata = metadata();
        Pipeline::new(&metadata, self.entry(), self.binary())
            .banner(ProvenanceBanner::new(&metadata, 2024))
            .out_dir(self.dist(out_dir))
    }
}

pub fn metadata() -> ProjectMetadata {
    ProjectMetadata {
        name: "mbd-wasm".to_string(),
        homepage: "https://example.com/mbd".to_string(),
        version: "0.1.0".to_string(),
        author: "Jane Doe <jane@example.com>".to_string(),
    }
}

pub fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).unwrap_or_else(|e| panic!("{}: {}", file, e))
}

/// Sorted `(file name, bytes)` of every file in `dir`.
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .map(|e| {
            (
                e.file_name().to_string_lossy().into_owned(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}
