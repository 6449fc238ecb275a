//! Decoding of the annotation and encoded-array pools, and the option flag
//! that skips them.

mod common;

use common::{ClassSpec, DexBuilder};
use dexscope::{DexObject, ParseOptions, ValueType, Visibility};

fn sample() -> Vec<u8> {
    DexBuilder::new()
        .strings(&["LAnno;", "Lfoo/Bar;", "Ljava/lang/Object;", "value"])
        .types(&[0, 1, 2])
        .class(ClassSpec::marker(1, 2))
        // @Anno(value = 42), runtime visible
        .annotation_item(vec![0x01, 0x00, 0x01, 0x03, 0x04, 42])
        // [true, null]
        .encoded_array_item(vec![0x02, 0x3F, 0x1E])
        .build()
}

#[test]
fn annotation_pool_decodes() {
    let dex = DexObject::from_mem(sample()).unwrap();

    assert_eq!(dex.annotations().len(), 1);
    let annotation = &dex.annotations()[0];
    assert_eq!(annotation.visibility, Visibility::Runtime);
    assert_eq!(annotation.annotation_type.descriptor.value, "LAnno;");

    assert_eq!(annotation.elements.len(), 1);
    let element = &annotation.elements[0];
    assert_eq!(element.name.value, "value");
    assert_eq!(element.value.value_type, ValueType::Int);
    assert_eq!(element.value.payload.as_deref(), Some(&[42u8][..]));
}

#[test]
fn encoded_array_pool_decodes() {
    let dex = DexObject::from_mem(sample()).unwrap();

    assert_eq!(dex.arrays().len(), 1);
    let array = &dex.arrays()[0];
    assert_eq!(array.values.len(), 2);
    assert_eq!(array.values[0].as_bool(), Some(true));
    assert_eq!(array.values[1].value_type, ValueType::Null);
    assert!(array.values[1].payload.is_none());
}

#[test]
fn pools_empty_when_annotations_excluded() {
    let options = ParseOptions {
        include_annotations: false,
        ..ParseOptions::default()
    };
    let dex = DexObject::from_mem_with(sample(), &options).unwrap();

    assert!(dex.annotations().is_empty());
    assert!(dex.arrays().is_empty());
    // The rest of the container decodes as usual.
    assert_eq!(dex.classes().len(), 1);
}

#[test]
fn deeply_nested_array_item_fails_open() {
    // A map-listed encoded_array_item whose single element nests arrays far
    // past any legitimate structure must fail the open instead of crashing.
    let mut item = vec![0x01];
    for _ in 0..100_000 {
        item.extend_from_slice(&[0x1C, 0x01]);
    }
    item.push(0x1E);

    let bytes = DexBuilder::new()
        .strings(&["LAnno;"])
        .types(&[0])
        .encoded_array_item(item)
        .build();

    assert!(DexObject::from_mem(bytes).is_err());
}

#[test]
fn empty_run_with_stale_offset_tolerated() {
    // Some tools leave a size-0 map entry behind whose offset points past
    // the end of the file. With nothing to decode it must not fail the open.
    let bytes = DexBuilder::new()
        .strings(&["LAnno;", "Lfoo/Bar;", "Ljava/lang/Object;", "value"])
        .types(&[0, 1, 2])
        .class(ClassSpec::marker(1, 2))
        .annotation_item(vec![0x01, 0x00, 0x01, 0x03, 0x04, 42])
        .map_entry(0x2005, 0, 0x00FF_FFFF)
        .build();

    let dex = DexObject::from_mem(bytes).unwrap();
    assert_eq!(dex.annotations().len(), 1);
    assert!(dex.arrays().is_empty());
}

#[test]
fn bad_annotation_visibility_fails_open() {
    let bytes = DexBuilder::new()
        .strings(&["LAnno;"])
        .types(&[0])
        .annotation_item(vec![0x07, 0x00, 0x00]) // visibility 7 does not exist
        .build();

    assert!(DexObject::from_mem(bytes).is_err());
}

#[test]
fn bad_annotation_ignored_when_excluded() {
    let bytes = DexBuilder::new()
        .strings(&["LAnno;"])
        .types(&[0])
        .annotation_item(vec![0x07, 0x00, 0x00])
        .build();

    let options = ParseOptions {
        include_annotations: false,
        ..ParseOptions::default()
    };
    assert!(DexObject::from_mem_with(bytes, &options).is_ok());
}
