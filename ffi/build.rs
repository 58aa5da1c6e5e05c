use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    let header = crate_dir.join("include").join("jadugar.h");

    let generated = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("JADUGAR_H")
        .with_pragma_once(true)
        .generate();

    match generated {
        Ok(bindings) => {
            if let Some(dir) = header.parent() {
                if let Err(err) = std::fs::create_dir_all(dir) {
                    println!("cargo:warning=could not create {}: {err}", dir.display());
                    return;
                }
            }
            let mut text = Vec::new();
            bindings.write(&mut text);
            if let Err(err) = std::fs::write(&header, text) {
                println!("cargo:warning=could not write {}: {err}", header.display());
            }
        }
        Err(err) => println!("cargo:warning=could not generate jadugar.h: {err}"),
    }
}
