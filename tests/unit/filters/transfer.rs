use super::*;
use crate::graph::arena::FilterGraph;
use crate::graph::node::NodeKind;

fn filter(kind: TransferKind, attrs: &[(&str, AttributeValue)]) -> TransferFilter {
    let mut f = TransferFilter::new(kind);
    for (name, value) in attrs {
        f.set_attribute(name, value).unwrap();
    }
    f
}

#[test]
fn disabled_channels_map_to_identity() {
    let f = filter(TransferKind::Linear, &[("slope_r", 0.0f32.into())]);
    let t = f.lookup_tables();
    for table in t {
        assert!(table.iter().enumerate().all(|(i, &v)| v as usize == i));
    }
}

#[test]
fn table_interpolates_between_entries() {
    let f = filter(
        TransferKind::Table,
        &[
            ("disable_g", false.into()),
            ("table_g", vec![1.0f32, 0.0].into()),
        ],
    );
    let t = f.lookup_tables()[G];
    assert_eq!(t[0], 255);
    assert_eq!(t[255], 0);
    assert!(t[128] < t[127]);
}

#[test]
fn discrete_steps() {
    let f = filter(
        TransferKind::Discrete,
        &[
            ("disable_b", false.into()),
            ("table_b", vec![0.0f32, 1.0].into()),
        ],
    );
    let t = f.lookup_tables()[B];
    assert_eq!(t[127], 0);
    assert_eq!(t[128], 255);
    assert_eq!(t[255], 255);
}

#[test]
fn linear_and_gamma_formulas() {
    let lin = filter(
        TransferKind::Linear,
        &[
            ("disable_r", false.into()),
            ("slope_r", 0.5f32.into()),
            ("intercept_r", 0.25f32.into()),
        ],
    );
    assert_eq!(lin.lookup_tables()[R][100], 114);

    let gamma = filter(
        TransferKind::Gamma,
        &[("disable_a", false.into()), ("exponent_a", 2.0f32.into())],
    );
    let t = gamma.lookup_tables()[A];
    assert_eq!((t[0], t[51], t[255]), (0, 10, 255));
}

#[test]
fn attributes_are_checked_per_kind() {
    let mut f = TransferFilter::new(TransferKind::Gamma);
    assert!(f.set_attribute("slope_r", &1.0f32.into()).is_err());
    assert!(f.set_attribute("exponent_x", &1.0f32.into()).is_err());
    assert!(f.set_attribute("exponent", &1.0f32.into()).is_err());
    assert!(f.set_attribute("disable_r", &1.0f32.into()).is_err());
}

#[test]
fn all_disabled_passes_input_through() {
    let mut g = FilterGraph::new();
    let src = RasterBuffer::filled(3, 3, [1, 2, 3, 4]).unwrap();
    let s = g.add_surface(src.clone());
    let n = g.create_node(NodeKind::TableTransfer);
    g.set_input(n, "in", s).unwrap();
    assert_eq!(g.render(n, IntRect::new(0, 0, 3, 3)).unwrap(), src);
}

#[test]
fn enabled_alpha_claims_the_whole_request() {
    let mut g = FilterGraph::new();
    let s = g.add_surface(RasterBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap());
    let n = g.create_node(NodeKind::LinearTransfer);
    g.set_input(n, "in", s).unwrap();
    let rect = IntRect::new(0, 0, 4, 4);
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(0, 0, 2, 2));

    g.set_attribute(n, "disable_a", false).unwrap();
    g.set_attribute(n, "intercept_a", 1.0f32).unwrap();
    assert_eq!(g.output_rect(n, rect).unwrap(), rect);
    let out = g.render(n, rect).unwrap();
    assert_eq!(out.pixel(3, 3), [0, 0, 0, 255]);
}
