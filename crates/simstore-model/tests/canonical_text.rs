//! Canonical text round trips and identity of model nodes.

use std::collections::HashSet;

use proptest::prelude::*;

use simstore_model::components::geometry::{BoxGeometry, Cylinder, Sphere};
use simstore_model::components::medium::{Lorentz, Medium, MediumSpec};
use simstore_model::components::monitor::{FieldMonitor, FluxMonitor};
use simstore_model::components::simulation::{GridSize, PMLLayer, Simulation};
use simstore_model::components::source::{GaussianPulse, PlaneWave};
use simstore_model::components::structure::Structure;
use simstore_model::{Address, Component, FromValue, Model, ModelError, ToValue, Value, text};

fn simulation() -> Simulation {
    let pulse = GaussianPulse::new(2e14, 1e13, 5.0, 0.0).unwrap();
    let wave = PlaneWave::new(
        [0.0, 0.0, -1.5],
        [f64::INFINITY, f64::INFINITY, 0.0],
        pulse.into(),
        "+".into(),
        "Ex".into(),
        0.0,
        0.0,
    )
    .unwrap();
    Simulation::builder([2.0, 2.0, 4.0], GridSize::Uniform(0.02))
        .run_time(1e-12)
        .structure(
            Structure::new(
                Sphere::new([0.0; 3], 0.5).unwrap().into(),
                Medium::new(4.0, 0.0).unwrap().into(),
            )
            .unwrap(),
        )
        .structure(
            Structure::new(
                BoxGeometry::new([0.0, 0.0, 1.0], [1.0, 1.0, 0.2]).unwrap().into(),
                Lorentz::new(1.0, vec![(2.0, 3e14, 1e12)]).unwrap().into(),
            )
            .unwrap(),
        )
        .source("plane_wave", wave)
        .monitor(FluxMonitor::new([0.0, 0.0, 1.5], [f64::INFINITY, f64::INFINITY, 0.0], "flux".into(), vec![2e14, 2.5e14]).unwrap())
        .monitor(
            FieldMonitor::new(
                [0.0; 3],
                [2.0, 0.0, 4.0],
                "fields".into(),
                vec!["Ex".into(), "Hy".into()],
                vec![2e14],
            )
            .unwrap(),
        )
        .pml_layers([
            PMLLayer::none(),
            PMLLayer::none(),
            PMLLayer::new("standard".into(), 12).unwrap(),
        ])
        .build()
        .unwrap()
}

#[test]
fn simulation_round_trips_through_json() {
    let sim = simulation();
    let text = sim.canonical_json();
    let back: Simulation = text::from_json_str(&text).unwrap();
    assert_eq!(back, sim);
    assert_eq!(back.canonical_json(), text);
}

#[test]
fn simulation_round_trips_through_yaml() {
    let sim = simulation();
    let yaml = text::to_yaml(&sim.to_value()).unwrap();
    let back: Simulation = text::from_yaml_str(&yaml).unwrap();
    assert_eq!(back, sim);
}

#[test]
fn infinite_sizes_use_sentinels() {
    let text = simulation().canonical_json();
    assert!(text.contains("\"Infinity\""));
}

#[test]
fn type_tag_is_written_first() {
    let text = simulation().canonical_json();
    assert!(text.starts_with("{\n    \"type\": \"Simulation\",\n    \"center\""));
}

#[test]
fn polymorphic_fields_keep_their_variant() {
    let sim = simulation();
    let back: Simulation = text::from_json_str(&sim.canonical_json()).unwrap();
    let media: Vec<&str> = back
        .structures()
        .iter()
        .map(|structure| structure.medium().type_tag())
        .collect();
    assert_eq!(media, ["Medium", "Lorentz"]);
    assert!(matches!(back.structures()[1].medium(), MediumSpec::Lorentz(_)));
}

#[test]
fn unknown_root_type_decodes_through_component() {
    let cylinder = Cylinder::new([0.0; 3], 0.2, 1.0, 2).unwrap();
    let component: Component = text::from_json_str(&cylinder.canonical_json()).unwrap();
    assert_eq!(component, Component::Cylinder(cylinder));
}

#[test]
fn extra_field_in_text_is_rejected() {
    let text = r#"{"type": "Sphere", "center": [0, 0, 0], "radius": 1.0, "colour": "red"}"#;
    let err = text::from_json_str::<Sphere>(text).unwrap_err();
    assert!(matches!(err, ModelError::ExtraField { .. }));
    assert!(err.to_string().contains("extra field not permitted"));
}

#[test]
fn nested_errors_name_the_address() {
    let mut value = simulation().to_value();
    let Value::Map(root) = &mut value else {
        unreachable!()
    };
    let Some(Value::Seq(structures)) = root.get_mut("structures") else {
        unreachable!()
    };
    let Value::Map(structure) = &mut structures[0] else {
        unreachable!()
    };
    structure.insert("geometry".into(), Value::Str("sphere".into()));
    let err = Simulation::from_value(value, &Address::root()).unwrap_err();
    assert!(err.to_string().contains("/structures/0/geometry"), "{err}");
}

#[test]
fn equal_nodes_hash_equal() {
    let a = simulation();
    let b = simulation();
    assert_eq!(a, b);
    assert_eq!(a.content_hash(), b.content_hash());

    let mut set = HashSet::new();
    set.insert(a.clone());
    assert!(set.contains(&b));

    let c = a.updated([("run_time", Value::Float(2e-12))]).unwrap();
    assert_ne!(a, c);
    assert_ne!(a.content_hash(), c.content_hash());
    assert!(!set.contains(&c));
}

#[test]
fn updated_shares_untouched_fields() {
    let sim = simulation();
    let shorter = sim.updated([("courant", Value::Float(0.5))]).unwrap();
    assert_eq!(*shorter.courant(), 0.5);
    assert_eq!(shorter.structures(), sim.structures());
    assert!(sim.updated([("courant", Value::Float(1.5))]).is_err());
}

fn arb_finite() -> impl Strategy<Value = f64> {
    prop_oneof![-1e6..1e6f64, Just(0.0), Just(-0.0), Just(1e-300), Just(f64::MAX)]
}

fn arb_any_float() -> impl Strategy<Value = f64> {
    prop_oneof![
        arb_finite(),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn arb_sphere() -> impl Strategy<Value = Component> {
    (prop::array::uniform3(arb_any_float()), 0.0..1e3f64)
        .prop_map(|(center, radius)| Sphere::new(center, radius).unwrap().into())
}

fn arb_box() -> impl Strategy<Value = Component> {
    (prop::array::uniform3(arb_finite()), prop::array::uniform3(0.0..1e3f64))
        .prop_map(|(center, size)| BoxGeometry::new(center, size).unwrap().into())
}

fn arb_lorentz() -> impl Strategy<Value = Component> {
    (
        1.0..10.0f64,
        prop::collection::vec((arb_finite(), 0.0..1e15f64, 0.0..1e13f64), 0..4),
    )
        .prop_map(|(eps_inf, coeffs)| Lorentz::new(eps_inf, coeffs).unwrap().into())
}

fn arb_pulse() -> impl Strategy<Value = Component> {
    (0.0..1e15f64, 1.0..1e14f64, arb_finite(), arb_finite())
        .prop_map(|(freq0, fwidth, offset, phase)| {
            GaussianPulse::new(freq0, fwidth, offset, phase).unwrap().into()
        })
}

proptest! {
    #[test]
    fn text_round_trip(component in prop_oneof![arb_sphere(), arb_box(), arb_lorentz(), arb_pulse()]) {
        let text = component.canonical_json();
        let back: Component = text::from_json_str(&text).unwrap();
        prop_assert_eq!(back.canonical_json(), text);
        prop_assert_eq!(back, component);
    }
}
