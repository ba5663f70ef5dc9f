mod record;

use proc_macro::TokenStream;

/// Generates the accessor table (`strainer::Record`) and nesting support (`strainer::Property`) for a
/// struct with named fields.
///
/// Field attributes:
/// - `#[record(skip)]` leaves the field out of the accessor table
/// - `#[record(rename = "name")]` registers the accessor under a different name
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream { record::derive_record_impl(input) }
