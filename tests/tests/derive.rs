mod common;
use common::*;

use strainer::path::{resolve, resolve_type_of};
use strainer::{Field, FieldType, Filterable, Record, RecordSchema, ResolveError, Value, ValueType};

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Track {
    #[record(rename = "title")]
    pub name: String,
    pub seconds: u32,
    pub explicit: bool,
    #[record(skip)]
    #[allow(unused)]
    pub waveform: Vec<u8>,
}

#[test]
fn test_derived_accessor_table() {
    let schema: &dyn RecordSchema = Album::accessors();
    assert_eq!(schema.type_name(), "Album");
    assert_eq!(schema.field_names(), vec!["name", "year", "artist", "rating"]);
    assert_eq!(schema.field_type("year"), Some(FieldType::Scalar(ValueType::I64)));
    assert_eq!(schema.field_type("rating"), Some(FieldType::Scalar(ValueType::F64)));
    assert_eq!(schema.field_type("artist"), Some(FieldType::record::<Artist>()));
}

#[test]
fn test_rename_and_skip() {
    let track = Track { name: "Bliss".into(), seconds: 252, explicit: false, waveform: vec![1, 2, 3] };
    assert_eq!(Track::accessors().field_names(), vec!["title", "seconds", "explicit"]);
    assert!(matches!(track.field("title"), Some(Ok(Field::Value(Value::String(ref s)))) if s == "Bliss"));
    assert!(track.field("name").is_none());
    assert!(track.field("waveform").is_none());
    assert_eq!(resolve("seconds", &track).unwrap(), Some(Value::I64(252)));
    assert_eq!(resolve("explicit", &track).unwrap(), Some(Value::Bool(false)));
}

#[test]
fn test_nested_resolution_through_derived_tables() {
    let albums = albums();
    assert_eq!(resolve("artist.country.code", &albums[0]).unwrap(), Some(Value::String("GB".into())));
    assert_eq!(resolve("artist.country.code", &albums[3]).unwrap(), None);
    assert_eq!(resolve("rating", &albums[2]).unwrap(), None);

    match resolve("artist.country.name", &albums[0]) {
        Err(ResolveError::FieldNotFound { type_name, segment, path }) => {
            assert_eq!(type_name, "Country");
            assert_eq!(segment, "name");
            assert_eq!(path, "artist.country.name");
        }
        other => panic!("expected FieldNotFound, got {other:?}"),
    }
}

#[test]
fn test_type_level_resolution() {
    assert_eq!(resolve_type_of::<Album>("artist.country.code").unwrap().value_type(), Some(ValueType::String));
    assert_eq!(resolve_type_of::<Album>("artist.country").unwrap().type_name(), "Country");
    assert!(resolve_type_of::<Album>("artist.label").is_err());
}
