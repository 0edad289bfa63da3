use serde_json::json;

use super::*;

fn doc(body: &str) -> SvgDocument {
    SvgDocument::parse(&format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{body}</svg>"#)).expect("parses")
}

#[test]
fn decodes_json_and_falls_back_to_text() {
    let d = doc(
        r#"<metadata>
             <text id="units"> mm </text>
             <text id="scale">0.5</text>
             <text id="extents">{"w": 1000, "h": 800}</text>
           </metadata>"#,
    );
    let m = extract(&d);
    assert_eq!(m.len(), 3);
    assert_eq!(m.get("units"), Some(&json!("mm")));
    assert_eq!(m.get("scale"), Some(&json!(0.5)));
    assert_eq!(m.get("extents"), Some(&json!({"w": 1000, "h": 800})));
}

#[test]
fn entries_without_id_are_skipped() {
    let d = doc(r#"<metadata><text>orphan</text><text id="">blank</text><text id="ok">1</text></metadata>"#);
    let m = extract(&d);
    assert_eq!(m.len(), 1);
    assert_eq!(m.get("ok"), Some(&json!(1)));
}

#[test]
fn text_outside_metadata_is_ignored() {
    let d = doc(r#"<text id="label">Room 101</text>"#);
    assert!(extract(&d).is_empty());
}

#[test]
fn layer_table_decodes_records() {
    let d = doc(
        r#"<metadata><text id="cadviewer_LayerTable">[
             {"Name": "RM_WALL", "Off": false, "Frozen": false, "Hidden": false, "Plottable": true},
             {"Name": "RM_NOTES", "Off": true}
           ]</text></metadata>"#,
    );
    let table = extract(&d).layer_table().expect("decodes").expect("present");
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].name, "RM_WALL");
    assert!(table[0].plottable);
    assert!(table[1].off);
    assert!(!table[1].frozen);
}

#[test]
fn missing_layer_table_is_none() {
    assert!(extract(&doc("<metadata/>")).layer_table().expect("ok").is_none());
}

#[test]
fn malformed_layer_table_is_an_error() {
    let d = doc(r#"<metadata><text id="cadviewer_LayerTable">not a table</text></metadata>"#);
    let err = extract(&d).layer_table().expect_err("malformed");
    assert!(matches!(err, MetadataDecodeError::LayerTable { .. }));
}

#[test]
fn to_json_is_an_object() {
    let d = doc(r#"<metadata><text id="a">true</text></metadata>"#);
    assert_eq!(extract(&d).to_json(), json!({"a": true}));
}
