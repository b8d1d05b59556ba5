// build.rs
fn main() {
    // Build info shown on /health. Missing git metadata only produces warnings.
    if let Err(e) = vergen::EmitBuilder::builder()
        .all_build()
        .all_git()
        .emit()
    {
        println!("cargo:warning=Unable to generate build info: {}", e);
    }
}
