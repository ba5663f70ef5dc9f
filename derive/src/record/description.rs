use syn::{Data, DeriveInput, Fields, Ident, LitStr};

/// A named field that gets an accessor
struct AccessorField {
    ident: Ident,
    name: String,
}

/// Everything the Record derive needs from the input struct
pub struct RecordDescription {
    name: Ident,
    fields: Vec<AccessorField>,
}

impl RecordDescription {
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let name = input.ident.clone();

        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(&input.generics, "Record cannot be derived for generic types"));
        }

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(fields) => fields.named.clone(),
                fields => return Err(syn::Error::new_spanned(fields, "Only named fields are supported")),
            },
            _ => return Err(syn::Error::new_spanned(&name, "Only structs are supported")),
        };

        let mut fields = Vec::new();
        for field in named.into_iter() {
            let Some(ident) = field.ident.clone() else { continue };
            let attrs = RecordAttrs::parse(&field.attrs)?;
            if attrs.skip {
                continue;
            }
            let name = attrs.rename.unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
            if fields.iter().any(|f: &AccessorField| f.name == name) {
                return Err(syn::Error::new_spanned(&field, format!("duplicate accessor name `{}`", name)));
            }
            fields.push(AccessorField { ident, name });
        }

        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &Ident { &self.name }
    pub fn name_str(&self) -> String { self.name.to_string() }
    pub fn accessor_names(&self) -> Vec<&str> { self.fields.iter().map(|f| f.name.as_str()).collect() }
    pub fn field_idents(&self) -> Vec<&Ident> { self.fields.iter().map(|f| &f.ident).collect() }
}

#[derive(Default)]
struct RecordAttrs {
    skip: bool,
    rename: Option<String>,
}

impl RecordAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    parsed.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute, expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }
        Ok(parsed)
    }
}
