use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, Ident, LitStr, Type, TypePath, parse_macro_input,
    spanned::Spanned,
};

/// Implements the `TableEntity` trait for a named-field struct.
///
/// Field options, one `#[row(...)]` attribute per field:
/// - `partition_key` / `row_key` — the field supplies that key (must be a
///   `String`; one field may carry both),
/// - `etag` / `timestamp` — row metadata fields, must be `Option`s,
/// - `skip` — never serialized,
/// - `extend` — inline another `TableEntity`'s schema before this struct's
///   own fields; redeclaring a property name here overrides the embedded
///   declaration,
/// - `name = "..."` — custom wire name for a regular property.
#[proc_macro_derive(TableEntity, attributes(row))]
pub fn derive_table_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_table_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct RowFieldOptions {
    partition_key: bool,
    row_key: bool,
    etag: bool,
    timestamp: bool,
    skip: bool,
    extend: bool,
    wire_name: Option<String>,
}

impl RowFieldOptions {
    fn has_role(&self) -> bool {
        self.partition_key || self.row_key || self.etag || self.timestamp
    }
}

struct EntityField {
    ident: Ident,
    ty: Type,
    options: RowFieldOptions,
}

impl EntityField {
    fn wire_name(&self) -> String {
        self.options
            .wire_name
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

fn expand_table_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "TableEntity cannot be derived for generic types",
        ));
    }

    let Data::Struct(data_struct) = input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "TableEntity can only be derived for structs",
        ));
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "TableEntity requires named fields",
            ));
        }
    };

    let mut fields = Vec::<EntityField>::new();
    let mut extend_field: Option<(Ident, Type)> = None;

    for field in named_fields.named {
        let ident = field.ident.clone().ok_or_else(|| {
            syn::Error::new(field.span(), "TableEntity requires named fields")
        })?;
        let options = parse_row_field_options(&field.attrs)?;

        if options.extend {
            if extend_field.is_some() {
                return Err(syn::Error::new(
                    field.span(),
                    "At most one #[row(extend)] field is supported",
                ));
            }
            extend_field = Some((ident, field.ty));
            continue;
        }

        if options.etag && !is_option_type(&field.ty) {
            return Err(syn::Error::new(
                field.ty.span(),
                "#[row(etag)] field must be an Option<String>",
            ));
        }
        if options.timestamp && !is_option_type(&field.ty) {
            return Err(syn::Error::new(
                field.ty.span(),
                "#[row(timestamp)] field must be an Option<DateTime<Utc>>",
            ));
        }

        fields.push(EntityField {
            ident,
            ty: field.ty,
            options,
        });
    }

    let name = &input.ident;
    let schema_body = build_schema_body(&extend_field, &fields);
    let property_body = build_property_body(&extend_field, &fields);
    let from_row_inits = build_from_row_inits(&extend_field, &fields);

    Ok(quote! {
        impl ::tablemap::TableEntity for #name {
            fn schema() -> ::std::vec::Vec<::tablemap::PropertySpec> {
                #schema_body
            }

            fn property(&self, name: &str) -> ::std::option::Option<::tablemap::EntityProperty> {
                #property_body
            }

            fn from_row(row: &::tablemap::TableRow) -> ::tablemap::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #(#from_row_inits),*
                })
            }
        }
    })
}

fn build_schema_body(
    extend_field: &Option<(Ident, Type)>,
    fields: &[EntityField],
) -> TokenStream2 {
    let base = extend_field.as_ref().map(|(_, ty)| {
        quote! {
            specs.extend(<#ty as ::tablemap::TableEntity>::schema());
        }
    });

    let pushes = fields.iter().map(|field| {
        let wire_name = field.wire_name();
        let ty = &field.ty;
        let partition_key = field.options.partition_key;
        let row_key = field.options.row_key;
        let etag = field.options.etag;
        let timestamp = field.options.timestamp;
        let excluded = field.options.skip;
        let edm_type = if field.options.skip {
            quote!(::std::option::Option::None)
        } else {
            quote!(::std::option::Option::Some(
                <#ty as ::tablemap::PropertyValue>::EDM_TYPE
            ))
        };

        quote! {
            specs.push(::tablemap::PropertySpec {
                name: #wire_name,
                roles: ::tablemap::RoleFlags {
                    partition_key: #partition_key,
                    row_key: #row_key,
                    etag: #etag,
                    timestamp: #timestamp,
                    excluded: #excluded,
                },
                edm_type: #edm_type,
            });
        }
    });

    quote! {
        let mut specs = ::std::vec::Vec::new();
        #base
        #(#pushes)*
        specs
    }
}

fn build_property_body(
    extend_field: &Option<(Ident, Type)>,
    fields: &[EntityField],
) -> TokenStream2 {
    let arms = fields.iter().filter(|field| !field.options.skip).map(|field| {
        let wire_name = field.wire_name();
        let ident = &field.ident;
        quote! {
            #wire_name => ::std::option::Option::Some(
                ::tablemap::PropertyValue::to_property(&self.#ident)
            ),
        }
    });

    let fallback = match extend_field {
        Some((ident, _)) => quote!(::tablemap::TableEntity::property(&self.#ident, name)),
        None => quote!(::std::option::Option::None),
    };

    quote! {
        match name {
            #(#arms)*
            _ => #fallback,
        }
    }
}

fn build_from_row_inits(
    extend_field: &Option<(Ident, Type)>,
    fields: &[EntityField],
) -> Vec<TokenStream2> {
    let mut inits = Vec::new();

    if let Some((ident, ty)) = extend_field {
        inits.push(quote! {
            #ident: <#ty as ::tablemap::TableEntity>::from_row(row)?
        });
    }

    for field in fields {
        let ident = &field.ident;
        let wire_name = field.wire_name();
        // Key values flow through the slot conversion so a non-string
        // key-marked field stays a runtime mapping error, not a compile
        // error here while hydrate reports it through the role scanner.
        let init = if field.options.partition_key {
            quote! {
                #ident: ::tablemap::PropertyValue::from_property(
                    &::tablemap::EntityProperty::new(row.partition_key())
                )?
            }
        } else if field.options.row_key {
            quote! {
                #ident: ::tablemap::PropertyValue::from_property(
                    &::tablemap::EntityProperty::new(row.row_key())
                )?
            }
        } else if field.options.etag {
            quote!(#ident: row.etag().map(::std::string::ToString::to_string))
        } else if field.options.timestamp {
            quote!(#ident: row.timestamp())
        } else if field.options.skip {
            quote!(#ident: ::std::default::Default::default())
        } else if is_option_type(&field.ty) {
            quote! {
                #ident: match row.properties().get(#wire_name) {
                    ::std::option::Option::Some(prop) => {
                        ::tablemap::PropertyValue::from_property(prop)?
                    }
                    ::std::option::Option::None => ::std::option::Option::None,
                }
            }
        } else {
            quote!(#ident: ::tablemap::PropertyValue::from_property(row.property(#wire_name)?)?)
        };
        inits.push(init);
    }

    inits
}

fn parse_row_field_options(attrs: &[syn::Attribute]) -> syn::Result<RowFieldOptions> {
    let mut options: Option<RowFieldOptions> = None;

    for attr in attrs {
        if !attr.path().is_ident("row") {
            continue;
        }

        if options.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "Duplicate #[row(...)] attribute on field",
            ));
        }

        let mut parsed = RowFieldOptions::default();
        match &attr.meta {
            syn::Meta::Path(_) => {}
            syn::Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("partition_key") {
                        parsed.partition_key = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("row_key") {
                        parsed.row_key = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("etag") {
                        parsed.etag = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("timestamp") {
                        parsed.timestamp = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("skip") {
                        parsed.skip = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("extend") {
                        parsed.extend = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("name") {
                        let value = meta.value()?;
                        let lit: LitStr = value.parse()?;
                        parsed.wire_name = Some(lit.value());
                        return Ok(());
                    }

                    Err(meta.error(
                        "Unsupported #[row(...)] option. Supported: partition_key, row_key, etag, timestamp, skip, extend, name = \"...\"",
                    ))
                })?;
            }
            syn::Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "Unsupported #[row = ...] syntax. Use #[row(partition_key)], #[row(skip)], #[row(name = \"...\")]",
                ));
            }
        }

        validate_row_field_options(attr, &parsed)?;
        options = Some(parsed);
    }

    Ok(options.unwrap_or_default())
}

fn validate_row_field_options(
    attr: &syn::Attribute,
    options: &RowFieldOptions,
) -> syn::Result<()> {
    if options.extend
        && (options.has_role() || options.skip || options.wire_name.is_some())
    {
        return Err(syn::Error::new(
            attr.span(),
            "#[row(extend)] cannot be combined with other options",
        ));
    }

    if options.skip && (options.has_role() || options.wire_name.is_some()) {
        return Err(syn::Error::new(
            attr.span(),
            "#[row(skip)] cannot be combined with other options",
        ));
    }

    let key_roles = usize::from(options.partition_key) + usize::from(options.row_key);
    let meta_roles = usize::from(options.etag) + usize::from(options.timestamp);
    if meta_roles > 1 || (meta_roles == 1 && key_roles > 0) {
        return Err(syn::Error::new(
            attr.span(),
            "A field may combine partition_key and row_key; other role combinations are not supported",
        ));
    }

    if options.has_role() && options.wire_name.is_some() {
        return Err(syn::Error::new(
            attr.span(),
            "A custom wire name applies only to regular properties",
        ));
    }

    Ok(())
}

fn is_option_type(ty: &Type) -> bool {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return false;
    };
    path.segments
        .last()
        .map(|segment| segment.ident == "Option")
        .unwrap_or(false)
}
