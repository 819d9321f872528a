use std::path::PathBuf;

use wavyte_fx::{
    Color, CompositeOperator, EvalOptions, Evaluator, FilterGraph, IntPoint, IntRect, Matrix5x4,
    NodeKind, RasterBuffer,
};

fn build_graph() -> anyhow::Result<(FilterGraph, wavyte_fx::NodeId)> {
    let mut g = FilterGraph::new();

    let noise = g.create_node(NodeKind::Turbulence);
    g.set_attribute(noise, "base_frequency", [0.03f32, 0.03])?;
    g.set_attribute(noise, "num_octaves", 3)?;
    g.set_attribute(noise, "seed", 7)?;
    g.set_attribute(noise, "rect", IntRect::new(48, 48, 160, 160))?;

    let swatch = g.create_node(NodeKind::Flood);
    g.set_attribute(swatch, "color", Color::new(0.15, 0.45, 0.9, 1.0))?;
    let card = g.create_node(NodeKind::Crop);
    g.set_input(card, "in", swatch)?;
    g.set_attribute(card, "rect", [48.0f32, 48.0, 160.0, 160.0])?;

    let textured = g.create_node(NodeKind::Composite);
    g.set_input(textured, "in0", card)?;
    g.set_input(textured, "in1", noise)?;
    g.set_attribute(textured, "operator", CompositeOperator::Atop)?;

    // shadow: alpha only, tinted black
    let mut black = [0.0f32; 20];
    black[15] = 1.0;
    let silhouette = g.create_node(NodeKind::ColorMatrix);
    g.set_input(silhouette, "in", textured)?;
    g.set_attribute(silhouette, "matrix", Matrix5x4::from_row_major(&black))?;
    let shifted = g.create_node(NodeKind::Offset);
    g.set_input(shifted, "in", silhouette)?;
    g.set_attribute(shifted, "offset", IntPoint::new(12, 12))?;
    let soft = g.create_node(NodeKind::GaussianBlur);
    g.set_input(soft, "in", shifted)?;
    g.set_attribute(soft, "std_deviation", 6.0f32)?;

    let out = g.create_node(NodeKind::Composite);
    g.set_input(out, "in0", soft)?;
    g.set_input(out, "in1", textured)?;
    g.set_attribute(out, "operator", CompositeOperator::Over)?;
    Ok((g, out))
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let (graph, root) = build_graph()?;
    let eval = Evaluator::new(&graph, EvalOptions { memoize: true });
    let frame: RasterBuffer = eval.render(root, IntRect::new(0, 0, 256, 256))?;
    let stats = eval.stats();
    eprintln!(
        "rendered {} nodes ({} cache hits)",
        stats.node_renders, stats.cache_hits
    );

    let out_dir = PathBuf::from("assets");
    std::fs::create_dir_all(&out_dir)?;
    let out_path = out_dir.join("out_drop_shadow.png");
    frame
        .to_rgba_image()
        .save_with_format(&out_path, image::ImageFormat::Png)?;

    eprintln!("wrote {}", out_path.display());
    Ok(())
}
