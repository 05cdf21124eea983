/// Directory (under the Bevy asset root) holding downloaded stage models.
pub const MODEL_DIRECTORY: &str = "models";

/// Manifest written by the model fetcher and read by the viewer.
pub const MODEL_MANIFEST_FILE: &str = "manifest.json";

/// Asset-relative manifest path, e.g. `models/manifest.json`.
pub fn model_manifest_path() -> String {
    format!("{}/{}", MODEL_DIRECTORY, MODEL_MANIFEST_FILE)
}

/// Asset-relative model path for a stage file name.
pub fn model_file_path(file: &str) -> String {
    format!("{}/{}", MODEL_DIRECTORY, file)
}
