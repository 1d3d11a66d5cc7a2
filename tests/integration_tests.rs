//! Integration tests for the SVG fixup pipeline

use pretty_assertions::assert_eq;

use shaper_svg_fixup::{fixup, fixup_svg, Document, FixupConfig, FixupError, SVG_NAMESPACE};

const FREECAD_EXPORT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#,
    "\n",
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="100 mm" height="50 mm" viewBox="0 0 100 50">"#,
    "\n",
    r#"  <g id="layer1" style="stroke-width:0.35;fill-rule: evenodd">"#,
    "\n",
    r#"    <rect style="fill-rule: evenodd;fill:none" width="0.35 px" height="4.01 mm"/>"#,
    "\n",
    r#"  </g>"#,
    "\n",
    r#"</svg>"#,
);

#[test]
fn test_freecad_export() {
    let (output, report) = fixup_svg(FREECAD_EXPORT, &FixupConfig::default()).unwrap();
    insta::assert_snapshot!(output, @r#"
<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="50mm" viewBox="0 0 100 50">
  <g id="layer1" style="stroke-width:0.35;">
    <rect style="fill:none;" width="0.35px" height="4.01mm"/>
  </g>
</svg>
"#);
    assert_eq!(report.elements, 3);
    assert_eq!(report.lengths_normalized, 4);
    assert_eq!(report.styles_sanitized, 2);
}

#[test]
fn test_rect_end_to_end() {
    let source = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect style="fill-rule: evenodd;fill:none" width="0.35 px" height="4.01 mm"/></svg>"#;
    let mut document = Document::parse(source).unwrap();
    fixup(&mut document);

    let rect = document.elements().nth(1).unwrap();
    assert_eq!(rect.name, "rect");
    assert_eq!(rect.attribute("style"), Some("fill:none;"));
    assert_eq!(rect.attribute("width"), Some("0.35px"));
    assert_eq!(rect.attribute("height"), Some("4.01mm"));

    let names: Vec<_> = rect.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["style", "width", "height"]);
}

#[test]
fn test_default_namespace_stays_unprefixed() {
    let (output, _) = fixup_svg(FREECAD_EXPORT, &FixupConfig::default()).unwrap();
    let document = Document::parse(&output).unwrap();
    assert_eq!(document.root().unwrap().name, "svg");
    assert_eq!(document.root().unwrap().attribute("xmlns"), Some(SVG_NAMESPACE));
    assert!(!output.contains("ns0:"));
    assert!(!output.contains("svg:"));
}

#[test]
fn test_structure_is_preserved() {
    let source = r##"<!DOCTYPE svg>
<!-- FreeCAD -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <defs><path id="p" d="M 0 0 L 1 1"/></defs>
  <use xlink:href="#p" x="1 mm"/>
  <text x="0" y="0">12 px &amp; more<![CDATA[ 3 pt ]]></text>
  <?keep this?>
</svg>
"##;
    let (output, _) = fixup_svg(source, &FixupConfig::default()).unwrap();
    assert_eq!(
        output,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg>
<!-- FreeCAD -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <defs><path id="p" d="M 0 0 L 1 1"/></defs>
  <use xlink:href="#p" x="1mm"/>
  <text x="0" y="0">12 px &amp; more<![CDATA[ 3 pt ]]></text>
  <?keep this?>
</svg>
"##
    );
}

#[test]
fn test_untouched_multiline_path_data_keeps_its_value() {
    let source = "<svg><path d=\"M 0 0\n     L 1 1\" width=\"2\tmm\"/></svg>";
    let (output, report) = fixup_svg(source, &FixupConfig::default()).unwrap();
    assert_eq!(report.lengths_normalized, 1);

    let reread = Document::parse(&output).unwrap();
    let path = reread.elements().nth(1).unwrap();
    assert_eq!(path.attribute("d"), Some("M 0 0      L 1 1"));
    assert_eq!(path.attribute("width"), Some("2mm"));
    assert!(!output.contains("&#10;"));
}

#[test]
fn test_adobe_style_entity_namespace() {
    let source = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
	<!ENTITY ns_svg "http://www.w3.org/2000/svg">
]>
<svg xmlns="&ns_svg;" width="10 mm"/>"#;
    let (output, _) = fixup_svg(source, &FixupConfig::default()).unwrap();
    assert!(output.contains(r#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm"/>"#));
    let reread = Document::parse(&output).unwrap();
    assert_eq!(reread.root().unwrap().attribute("xmlns"), Some(SVG_NAMESPACE));
}

#[test]
fn test_fixup_twice_matches_once() {
    let (once, _) = fixup_svg(FREECAD_EXPORT, &FixupConfig::default()).unwrap();
    let (twice, report) = fixup_svg(&once, &FixupConfig::default()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(report.changed(), 0);
}

#[test]
fn test_malformed_attribute_values_pass_through() {
    let source = r#"<svg><rect width="12. px" height="+-12.2 px" x="12.1.1 px" style="Fill-Rule:x"/></svg>"#;
    let (output, report) = fixup_svg(source, &FixupConfig::default()).unwrap();
    assert!(output.contains(r#"width="12. px""#));
    assert!(output.contains(r#"height="+-12.2 px""#));
    assert!(output.contains(r#"x="12.1.1 px""#));
    assert!(output.contains(r#"style="Fill-Rule:x;""#));
    assert_eq!(report.lengths_normalized, 0);
}

#[test]
fn test_malformed_document_is_an_error() {
    let err = fixup_svg("<svg><rect></svg>", &FixupConfig::default()).unwrap_err();
    assert!(matches!(err, FixupError::Xml { .. }));
    assert!(err.format("<svg><rect></svg>", "bad.svg").contains("bad.svg"));
}
