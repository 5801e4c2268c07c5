use cubemap_skybox::app::{run_viewer, DEFAULT_ATTRIBUTES};

// Usage: cubemap_viewer ["folder: skies/night/; edgeLength: 2000; nameMap: posx=right negx=left"]
fn main() {
    let attributes = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ATTRIBUTES.to_string());
    pollster::block_on(run_viewer(attributes));
}
