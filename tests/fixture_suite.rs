use std::path::Path;

use geodiagram::render::decode_data_uri;
use geodiagram::{
    Diagram, ErrorCode, RenderOptions, ValidationOptions, parse_diagram, render, render_svg,
    validate,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: NaN leaked into markup");
}

fn load_fixture(rel: &str) -> Diagram {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {}", rel);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    parse_diagram(&input).expect("parse failed")
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new shape families must be added intentionally.
    let candidates = [
        "polygon/right_triangle.json",
        "polygon/rectangle_on_grid.json",
        "polygon/coordinate_polygon.json",
        "circle/circle.json",
        "circle/chord.json",
        "circle/sector.json",
        "circle/tangent.json",
        "number_line/inequality.json",
        "number_line/number_line.json",
        "transformation/reflection.json",
        "transformation/rotation.json",
        "transformation/dilation.json",
        "angle/supplementary.json",
        "angle/from_rays.json",
        "angle/vertical.json",
    ];

    for rel in candidates {
        let diagram = load_fixture(rel);
        let result = validate(&diagram, ValidationOptions::default());
        assert!(result.is_valid, "{rel}: {:?}", result.errors);

        let svg = render_svg(&diagram, &RenderOptions::default())
            .unwrap_or_else(|err| panic!("{rel}: {err}"));
        assert_valid_svg(&svg, rel);

        let uri = render(&diagram).unwrap_or_else(|| panic!("{rel}: render returned None"));
        assert_eq!(decode_data_uri(&uri).as_deref(), Some(svg.as_str()), "{rel}");
    }
}

#[test]
fn invalid_fixtures_report_their_codes() {
    let cases = [
        ("invalid/duplicate_labels.json", ErrorCode::DuplicateVertexLabels),
        ("invalid/algebraic.json", ErrorCode::AlgebraicCoordinates),
        ("invalid/unknown_shape.json", ErrorCode::InvalidShapeType),
    ];
    for (rel, code) in cases {
        let diagram = load_fixture(rel);
        let result = validate(&diagram, ValidationOptions::default());
        assert!(!result.is_valid, "{rel} should be invalid");
        assert!(result.has_code(code), "{rel}: expected {code}, got {:?}", result.errors);
    }
}

#[test]
fn unrenderable_fixtures_give_none() {
    for rel in ["invalid/solid.json", "invalid/unknown_shape.json"] {
        let diagram = load_fixture(rel);
        assert!(render(&diagram).is_none(), "{rel}");
        let err = render_svg(&diagram, &RenderOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRenderer, "{rel}");
    }
}

#[test]
fn solid_fixture_is_still_valid_metadata() {
    let diagram = load_fixture("invalid/solid.json");
    assert!(validate(&diagram, ValidationOptions::default()).is_valid);
}

#[test]
fn titles_become_svg_titles() {
    let diagram = load_fixture("polygon/right_triangle.json");
    let svg = render_svg(&diagram, &RenderOptions::default()).unwrap();
    assert!(svg.contains("<title>Right triangle ABC</title>"));
}

#[test]
fn monochrome_theme_renders_every_family() {
    let options = RenderOptions::monochrome();
    for rel in [
        "polygon/rectangle_on_grid.json",
        "circle/sector.json",
        "number_line/inequality.json",
        "transformation/rotation.json",
        "angle/vertical.json",
    ] {
        let svg = render_svg(&load_fixture(rel), &options).unwrap();
        assert_valid_svg(&svg, rel);
        assert!(!svg.contains("#2563EB"), "{rel}: classroom colour in monochrome output");
    }
}
