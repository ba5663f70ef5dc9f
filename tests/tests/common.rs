use tracing::Level;

use serde::{Deserialize, Serialize};
use strainer::Record;

#[derive(Record, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

#[derive(Record, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
}

#[derive(Record, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub country: Option<Country>,
}

#[derive(Record, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub year: i32,
    pub artist: Artist,
    pub rating: Option<f64>,
}

#[allow(unused)]
pub fn people() -> Vec<Person> { vec![Person { name: "Alice".into(), age: 30 }, Person { name: "bob".into(), age: 40 }] }

#[allow(unused)]
pub fn albums() -> Vec<Album> {
    let muse = Artist { name: "Muse".into(), country: Some(Country { code: "GB".into() }) };
    let metric = Artist { name: "Metric".into(), country: Some(Country { code: "CA".into() }) };
    let unknown = Artist { name: "Anonymous".into(), country: None };
    vec![
        Album { name: "Showbiz".into(), year: 1999, artist: muse.clone(), rating: Some(3.5) },
        Album { name: "Origin of Symmetry".into(), year: 2001, artist: muse, rating: Some(4.5) },
        Album { name: "Fantasies".into(), year: 2009, artist: metric, rating: None },
        Album { name: "Untitled".into(), year: 2020, artist: unknown, rating: Some(2.0) },
    ]
}

#[allow(unused)]
pub fn names<R>(records: &[R], name: impl Fn(&R) -> &str) -> Vec<&str> { records.iter().map(name).collect() }

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init(); }
