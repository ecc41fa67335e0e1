use super::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

const SAMPLE_TSV: &str = "replicate\tcellLine\tdose\tcontrol\tbatch
Sample1\tHeLa\t1.5\ttrue\t1
Sample2\tHeLa\t10\tFALSE\t2
Sample3\tA549\tNA\tfalse\t2";

fn types(pairs: &[(&str, Dtype)]) -> BTreeMap<String, Dtype> {
    pairs.iter().map(|(k, d)| (k.to_string(), *d)).collect()
}

#[test]
fn test_infer_type_examples() {
    assert_eq!(infer_type(""), Dtype::Null);
    assert_eq!(infer_type("NA"), Dtype::Null);
    assert_eq!(infer_type("#N/A"), Dtype::Null);
    assert_eq!(infer_type("NaN"), Dtype::Null);
    assert_eq!(infer_type("TRUE"), Dtype::Bool);
    assert_eq!(infer_type("False"), Dtype::Bool);
    assert_eq!(infer_type("42"), Dtype::Int);
    assert_eq!(infer_type("-7"), Dtype::Int);
    assert_eq!(infer_type("3.14e2"), Dtype::Float);
    assert_eq!(infer_type(".5"), Dtype::Float);
    assert_eq!(infer_type("2."), Dtype::Float);
    assert_eq!(infer_type("abc"), Dtype::String);
    assert_eq!(infer_type("tRUE"), Dtype::String);
    assert_eq!(infer_type(" 42"), Dtype::String);
}

#[test]
fn test_lattice_order() {
    assert!(Dtype::Null < Dtype::Bool);
    assert!(Dtype::Bool < Dtype::Int);
    assert!(Dtype::Int < Dtype::Float);
    assert!(Dtype::Float < Dtype::String);
    assert_eq!(Dtype::Int.max(Dtype::String), Dtype::String);
}

#[test]
fn test_try_cmp_rejects_unknown_names() {
    assert_eq!(Dtype::Int.try_cmp("FLOAT").unwrap(), Ordering::Less);
    assert_eq!(Dtype::String.try_cmp("STRING").unwrap(), Ordering::Equal);
    assert!(matches!(
        Dtype::Int.try_cmp("DOUBLE"),
        Err(MetadataError::UnknownDtype(name)) if name == "DOUBLE"
    ));
}

#[test]
fn test_dtype_names() {
    for dtype in Dtype::ALL {
        assert_eq!(dtype.as_str().parse::<Dtype>().unwrap(), dtype);
    }
    assert_eq!(Dtype::Float.to_string(), "FLOAT");
}

#[test]
fn test_convert() {
    assert_eq!(Dtype::Null.convert("").unwrap(), TypedValue::Null);
    assert_eq!(Dtype::Bool.convert("TRUE").unwrap(), TypedValue::Bool(true));
    assert_eq!(Dtype::Bool.convert("false").unwrap(), TypedValue::Bool(false));
    assert_eq!(Dtype::Int.convert("+12").unwrap(), TypedValue::Int(12));
    assert_eq!(Dtype::Float.convert("3.14e2").unwrap(), TypedValue::Float(314.0));
    assert_eq!(
        Dtype::String.convert("HeLa").unwrap(),
        TypedValue::String("HeLa".to_string())
    );
}

#[test]
fn test_convert_widens_lower_types() {
    assert_eq!(Dtype::Int.convert("NA").unwrap(), TypedValue::Null);
    assert_eq!(Dtype::Int.convert("true").unwrap(), TypedValue::Int(1));
    assert_eq!(Dtype::Float.convert("7").unwrap(), TypedValue::Float(7.0));
    assert_eq!(Dtype::Float.convert("False").unwrap(), TypedValue::Float(0.0));
    assert_eq!(
        Dtype::String.convert("42").unwrap(),
        TypedValue::String("42".to_string())
    );
}

#[test]
fn test_convert_rejects_wider_values() {
    assert!(matches!(
        Dtype::Int.convert("1.5"),
        Err(MetadataError::Conversion { dtype: Dtype::Int, .. })
    ));
    assert!(Dtype::Bool.convert("1").is_err());
    assert!(Dtype::Float.convert("abc").is_err());
    assert!(Dtype::Null.convert("0").is_err());
    // Outside the i64 range, so inferred as FLOAT
    assert!(Dtype::Int.convert("99999999999999999999").is_err());
}

#[test]
fn test_non_ascii_digits_are_strings() {
    for raw in ["١٢٣", "١.٥", "１２", "٣e٢"] {
        assert_eq!(infer_type(raw), Dtype::String, "{raw}");
        assert!(Dtype::String.convert(raw).is_ok());
    }
}

#[test]
fn test_integers_outside_i64_infer_as_float() {
    assert_eq!(infer_type("9223372036854775807"), Dtype::Int);
    assert_eq!(infer_type("-9223372036854775808"), Dtype::Int);
    assert_eq!(infer_type("9223372036854775808"), Dtype::Float);
    assert_eq!(infer_type("12345678901234567890"), Dtype::Float);

    assert_eq!(
        Dtype::Int.convert("-9223372036854775808").unwrap(),
        TypedValue::Int(i64::MIN)
    );
    assert_eq!(
        Dtype::Float.convert("12345678901234567890").unwrap(),
        TypedValue::Float(12345678901234567890.0)
    );
}

#[test]
fn test_consolidate_adopts_and_widens() {
    let existing = types(&[("dose", Dtype::Int), ("cellLine", Dtype::String)]);
    let incoming = types(&[("dose", Dtype::Float), ("cellLine", Dtype::Bool), ("batch", Dtype::Int)]);

    let merged = consolidate(&existing, &incoming);
    assert_eq!(merged["dose"], Dtype::Float);
    assert_eq!(merged["cellLine"], Dtype::String);
    assert_eq!(merged["batch"], Dtype::Int);
    assert_eq!(consolidate(&merged, &incoming), merged);
}

#[test]
fn test_changed_types() {
    let existing = types(&[("dose", Dtype::Int), ("cellLine", Dtype::String)]);
    let merged = consolidate(
        &existing,
        &types(&[("dose", Dtype::String), ("batch", Dtype::Int)]),
    );

    let changed = changed_types(&existing, &merged);
    assert_eq!(
        changed,
        vec![
            ("batch", None, Dtype::Int),
            ("dose", Some(Dtype::Int), Dtype::String),
        ]
    );
}

#[test]
fn test_annotation_tsv_parsing() {
    let reader = std::io::Cursor::new(SAMPLE_TSV);
    let annotations = SampleAnnotations::from_reader(reader, b'\t').unwrap();

    assert_eq!(annotations.len(), 3);
    assert_eq!(annotations.values("Sample1").unwrap()["cellLine"], "HeLa");
    assert_eq!(annotations.values("Sample3").unwrap()["dose"], "NA");

    let inferred = annotations.inferred_types();
    assert_eq!(inferred["cellLine"], Dtype::String);
    assert_eq!(inferred["dose"], Dtype::Float);
    assert_eq!(inferred["control"], Dtype::Bool);
    assert_eq!(inferred["batch"], Dtype::Int);
}

#[test]
fn test_annotation_missing_replicate_column() {
    let reader = std::io::Cursor::new("sample\tdose\nS1\t1");
    assert!(matches!(
        SampleAnnotations::from_reader(reader, b'\t'),
        Err(MetadataError::MissingColumn(_))
    ));
}

#[test]
fn test_annotation_duplicate_replicate() {
    let reader = std::io::Cursor::new("replicate,dose\nS1,1\nS1,2");
    assert!(matches!(
        SampleAnnotations::from_reader(reader, b','),
        Err(MetadataError::DuplicateReplicate(name)) if name == "S1"
    ));
}

#[test]
fn test_annotation_json() {
    let json = r#"{
        "S1": {"dose": 1.5, "control": true, "cellLine": "HeLa", "batch": null},
        "S2": {"dose": 2, "control": false, "cellLine": "A549", "batch": 3}
    }"#;
    let annotations = SampleAnnotations::from_json(json).unwrap();

    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations.values("S1").unwrap()["batch"], "");
    let inferred = annotations.inferred_types();
    assert_eq!(inferred["dose"], Dtype::Float);
    assert_eq!(inferred["control"], Dtype::Bool);
    assert_eq!(inferred["batch"], Dtype::Int);

    assert!(matches!(
        SampleAnnotations::from_json(r#"{"S1": {"dose": [1, 2]}}"#),
        Err(MetadataError::InvalidFormat(_))
    ));
    assert!(SampleAnnotations::from_json("[]").is_err());
}
