// Licensed under the Apache-2.0 license

//! End-to-end exports through the public API.

use registers_export::config::{HtmlOptions, IpxactOptions, UvmOptions};
use registers_export::diag::{MemorySink, Severity};
use registers_export::emit::html::desc::RawHtml;
use registers_export::emit::{HeaderEmitter, HtmlEmitter, IpxactEmitter, UvmEmitter};
use registers_export::explode::Explosion;
use registers_export::model::{Design, Field, Node};
use registers_export::{export, ExportError};
use std::fs;

const CHIP_JSON: &str = r#"{
    "top": {
        "inst_name": "chip",
        "kind": "addrmap",
        "children": [
            {
                "inst_name": "ctrl",
                "kind": "reg",
                "fields": [
                    { "inst_name": "enable", "lsb": 0, "msb": 0, "properties": { "sw": "rw" } }
                ]
            },
            {
                "inst_name": "entry",
                "kind": "reg",
                "offset": 16,
                "array": { "dimensions": [4], "stride": 4 },
                "fields": [
                    { "inst_name": "data", "lsb": 0, "msb": 31 }
                ]
            }
        ]
    }
}"#;

fn chip() -> Design {
    Design::from_json_str(CHIP_JSON).unwrap()
}

#[test]
fn test_header_constants() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chip.h");
    let sink = MemorySink::new();
    let report = export(&HeaderEmitter::c(), chip().top(), &dest, &sink).unwrap();
    assert_eq!(report.explosion, Explosion::Wrap);
    assert_eq!(report.warnings, 0);

    let text = fs::read_to_string(&dest).unwrap();
    assert!(text.contains("#define CHIP_CTRL 0x0\n"));
    assert!(text.contains("#define CTRL_ENABLE_OFFSET 0\n"));
    assert!(text.contains("#define CTRL_ENABLE_MASK 0x1\n"));
    for (i, addr) in ["0x10", "0x14", "0x18", "0x1c"].iter().enumerate() {
        assert!(text.contains(&format!("#define CHIP_ENTRY_{i} {addr}\n")));
    }
}

#[test]
fn test_header_export_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let design = chip();
    let emitter = HeaderEmitter::verilog();
    let first = dir.path().join("a.svh");
    let second = dir.path().join("b.svh");
    export(&emitter, design.top(), &first, &MemorySink::new()).unwrap();
    export(&emitter, design.top(), &second, &MemorySink::new()).unwrap();
    let first = fs::read_to_string(first).unwrap();
    // Only the include guard follows the file name.
    let second = fs::read_to_string(second).unwrap().replace("__B_SVH__", "__A_SVH__");
    assert_eq!(first, second);

    // Rewriting the same destination yields the same bytes.
    let again = dir.path().join("a.svh");
    export(&emitter, design.top(), &again, &MemorySink::new()).unwrap();
    assert_eq!(fs::read_to_string(again).unwrap(), first);
}

#[test]
fn test_uvm_array_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chip.sv");
    export(
        &UvmEmitter::new(UvmOptions::default()),
        chip().top(),
        &dest,
        &MemorySink::new(),
    )
    .unwrap();
    let text = fs::read_to_string(dest).unwrap();
    for (i, addr) in ["'h10", "'h14", "'h18", "'h1c"].iter().enumerate() {
        assert!(text.contains(&format!("this.default_map.add_reg(this.entry[{i}], {addr},")));
    }
    assert!(text.trim_end().ends_with("endpackage"));
}

#[test]
fn test_shared_image_copied_once() {
    let dir = tempfile::tempdir().unwrap();
    let figures = dir.path().join("figures");
    fs::create_dir(&figures).unwrap();
    fs::write(figures.join("timing.png"), b"timing diagram").unwrap();

    let top = Node::addrmap("chip")
        .source(dir.path().join("chip.rdl"))
        .child(Node::reg("a").prop("desc", "<img src=\"figures/timing.png\" />"))
        .child(
            Node::reg("b")
                .at(0x4)
                .prop("desc", "<p><img src=\"figures/timing.png\" /></p>"),
        );
    let dest = dir.path().join("docs");
    let emitter = HtmlEmitter::new(HtmlOptions::default()).with_renderer(RawHtml);
    let report = export(&emitter, &top, &dest, &MemorySink::new()).unwrap();

    let images: Vec<_> = report
        .files
        .iter()
        .filter(|p| p.to_string_lossy().ends_with("_timing.png"))
        .collect();
    assert_eq!(images.len(), 1);
    assert_eq!(fs::read(images[0]).unwrap(), b"timing diagram");

    let name = images[0].file_name().unwrap().to_string_lossy().into_owned();
    let link = format!("src=\"content/{name}\"");
    assert!(fs::read_to_string(dest.join("content/1.html")).unwrap().contains(&link));
    assert!(fs::read_to_string(dest.join("content/2.html")).unwrap().contains(&link));
}

#[test]
fn test_sparse_register_array_left_out_of_xml() {
    let top = Node::addrmap("chip")
        .child(Node::reg("ctrl").field(Field::new("go", 0, 0)))
        .child(
            Node::reg("slot")
                .at(0x10)
                .array(&[4], 8)
                .field(Field::new("v", 0, 31)),
        );
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chip.xml");
    let sink = MemorySink::new();
    let report = export(&IpxactEmitter::new(IpxactOptions::default()), &top, &dest, &sink).unwrap();

    assert_eq!(report.warnings, 1);
    let warnings = sink.with_severity(Severity::Warning);
    assert!(warnings[0].contains("stride (8)"));
    assert!(warnings[0].contains("Discarding 'chip.slot'"));

    let xml = fs::read_to_string(dest).unwrap();
    assert!(xml.contains("<ipxact:name>ctrl</ipxact:name>"));
    assert!(!xml.contains("slot"));
}

#[test]
fn test_overlapping_register_array_aborts_every_format() {
    let top = Node::addrmap("chip").child(Node::reg("r").array(&[2], 2));
    let dir = tempfile::tempdir().unwrap();

    let dest = dir.path().join("chip.h");
    let sink = MemorySink::new();
    let err = export(&HeaderEmitter::c(), &top, &dest, &sink).unwrap_err();
    assert!(matches!(err, ExportError::StructuralIncompatibility(_)));
    assert_eq!(sink.with_severity(Severity::Fatal).len(), 1);
    assert!(!dest.exists());

    let dest = dir.path().join("chip.xml");
    let err = export(&IpxactEmitter::default(), &top, &dest, &MemorySink::new()).unwrap_err();
    assert!(matches!(err, ExportError::StructuralIncompatibility(_)));
    assert!(!dest.exists());
}

#[test]
fn test_malformed_design_rejected() {
    let err = Design::from_json_str(r#"{ "top": { "inst_name": "chip" } }"#).unwrap_err();
    assert!(matches!(err, ExportError::Json(_)));

    let overlapping = r#"{ "top": { "inst_name": "chip", "kind": "addrmap", "children": [
        { "inst_name": "r", "kind": "reg", "fields": [
            { "inst_name": "a", "lsb": 0, "msb": 3 },
            { "inst_name": "b", "lsb": 2, "msb": 5 }
        ] }
    ] } }"#;
    let err = Design::from_json_str(overlapping).unwrap_err();
    assert!(matches!(err, ExportError::Model(_)));
}

#[test]
fn test_exploded_top_in_every_format() {
    let top = Node::addrmap("soc")
        .child(Node::addrmap("uart").child(Node::reg("data").field(Field::new("d", 0, 7))))
        .child(Node::mem("sram", 64, 32).at(0x1000));
    let dir = tempfile::tempdir().unwrap();

    let report = export(
        &HeaderEmitter::c(),
        &top,
        &dir.path().join("soc.h"),
        &MemorySink::new(),
    )
    .unwrap();
    assert_eq!(report.explosion, Explosion::Explode);

    let report = export(
        &IpxactEmitter::default(),
        &top,
        &dir.path().join("soc.xml"),
        &MemorySink::new(),
    )
    .unwrap();
    assert_eq!(report.explosion, Explosion::Explode);
    let xml = fs::read_to_string(dir.path().join("soc.xml")).unwrap();
    assert_eq!(xml.matches("<ipxact:addressBlock>").count(), 2);

    // Documentation always keeps a single tree.
    let report = export(
        &HtmlEmitter::default(),
        &top,
        &dir.path().join("docs"),
        &MemorySink::new(),
    )
    .unwrap();
    assert_eq!(report.explosion, Explosion::Wrap);
}

#[test]
fn test_wide_register_rejected_before_emitting() {
    let top = Node::addrmap("chip").child(
        Node::reg("wide")
            .prop("regwidth", 128)
            .field(Field::new("hi", 64, 71)),
    );
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chip.h");
    let sink = MemorySink::new();
    let err = export(&HeaderEmitter::c(), &top, &dest, &sink).unwrap_err();
    assert!(matches!(err, ExportError::Model(_)));
    assert_eq!(sink.with_severity(Severity::Fatal).len(), 1);
    assert!(!dest.exists());
}
