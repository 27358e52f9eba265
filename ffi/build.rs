use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let Ok(crate_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping header generation");
        return;
    };
    let crate_dir = PathBuf::from(crate_dir);
    let output_file = crate_dir.join("include").join("toodle.h");

    if let Some(dir) = output_file.parent() {
        let _ = std::fs::create_dir_all(dir);
    }

    let config = match cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")) {
        Ok(config) => config,
        Err(e) => {
            println!("cargo:warning=cbindgen.toml unreadable ({e}), using defaults");
            cbindgen::Config {
                language: cbindgen::Language::C,
                sys_includes: vec!["stdint.h".to_string(), "stdbool.h".to_string()],
                ..Default::default()
            }
        }
    };

    // A header failure must not break the library build.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&output_file);
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
