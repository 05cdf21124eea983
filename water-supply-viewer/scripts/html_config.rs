//! Trunk post-build hook: makes the staged page load its script and wasm
//! relative to itself so the build can be served from any sub-path.
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

const STAGED_HTML: &str = "index.html";
const BUNDLE_NAME: &str = "water-supply-viewer";

fn relative_bundle_paths(html: &str) -> String {
    html.replace(&format!("/{BUNDLE_NAME}.js"), &format!("./{BUNDLE_NAME}.js"))
        .replace(
            &format!("/{BUNDLE_NAME}_bg.wasm"),
            &format!("./{BUNDLE_NAME}_bg.wasm"),
        )
}

fn main() {
    // Environment variable parameter - the distributed directory
    let Ok(staging_dir) = env::var("TRUNK_STAGING_DIR") else {
        eprintln!("TRUNK_STAGING_DIR is not set; run this as a Trunk hook");
        process::exit(1);
    };
    let staged_html_path = PathBuf::from(staging_dir).join(STAGED_HTML);

    let html = match fs::read_to_string(&staged_html_path) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Failed to read {}: {}", staged_html_path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = fs::write(&staged_html_path, relative_bundle_paths(&html)) {
        eprintln!("Failed to write {}: {}", staged_html_path.display(), e);
        process::exit(1);
    }
}
