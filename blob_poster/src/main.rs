// This file is an example of how to use the `blob_poster` library.
// The CLI lives in the `poster_render` crate; this runner just prints a
// summary of one seeded render pass.

use blob_poster::{BlobKind, PosterParams, PosterPipeline};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pipeline = PosterPipeline::default();
    let params = PosterParams {
        seed: Some(42),
        ..PosterParams::default()
    };
    let instructions = pipeline.render(&params, None);

    log::info!(
        "Blob Poster - seed {:?}, {}x{} canvas",
        params.seed,
        instructions.canvas.width,
        instructions.canvas.height
    );
    for blob in instructions.blobs.iter().filter(|b| b.kind == BlobKind::Fill) {
        let [r, g, b] = blob.color.to_rgb8();
        log::info!(
            "layer {:>2}: z={:>2} alpha={:.2} color=#{r:02x}{g:02x}{b:02x} points={}",
            blob.layer,
            blob.z_order,
            blob.alpha,
            blob.contour.len()
        );
    }
}
