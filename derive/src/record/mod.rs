pub(crate) mod description;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use description::RecordDescription;

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let desc = match RecordDescription::parse(&input) {
        Ok(desc) => desc,
        Err(e) => return e.to_compile_error().into(),
    };

    let name = desc.name();
    let name_str = desc.name_str();
    let accessor_names = desc.accessor_names();
    let field_idents = desc.field_idents();

    let expanded: proc_macro::TokenStream = quote! {
        impl ::strainer::Record for #name {
            fn accessors() -> &'static ::strainer::Accessors<Self> {
                static ACCESSORS: ::std::sync::OnceLock<::strainer::Accessors<#name>> = ::std::sync::OnceLock::new();
                ACCESSORS.get_or_init(|| {
                    ::strainer::Accessors::new(#name_str)
                        #( .property(#accessor_names, |record: &Self| &record.#field_idents) )*
                })
            }
        }

        impl ::strainer::Property for #name {
            fn field_type() -> ::strainer::FieldType { ::strainer::FieldType::record::<#name>() }
            fn to_field(&self) -> ::strainer::Field<'_> { ::strainer::Field::Record(self) }
        }
    }
    .into();

    expanded
}
