use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident};

/// Derive `dynastore::Record` from two marked fields.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize, Record)]
/// struct Order {
///     #[partition_key]
///     customer_id: String,
///     #[sort_key]
///     order_id: u64,
///     total: u32,
/// }
/// ```
///
/// This will expand to an implementation whose `pk()` and `sk()` return the
/// marked fields rendered with `ToString`.
///
/// # Requirements
///
/// - The type must be a struct with named fields
/// - Exactly one field must carry `#[partition_key]`
/// - Exactly one field must carry `#[sort_key]`
/// - Both marked fields must implement `ToString`
#[proc_macro_derive(Record, attributes(partition_key, sort_key))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_record(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_record(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Record)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Record)] can only be applied to structs",
            ));
        }
    };

    let pk = find_marked(&input.ident, fields.iter(), "partition_key")?;
    let sk = find_marked(&input.ident, fields.iter(), "sort_key")?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::dynastore::Record for #name #ty_generics #where_clause {
            fn pk(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(&self.#pk)
            }

            fn sk(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(&self.#sk)
            }
        }
    })
}

fn find_marked<'a>(
    type_name: &Ident,
    fields: impl Iterator<Item = &'a Field>,
    marker: &str,
) -> syn::Result<&'a Ident> {
    let mut marked = fields.filter(|field| field.attrs.iter().any(|a| a.path().is_ident(marker)));

    let field = marked.next().ok_or_else(|| {
        syn::Error::new_spanned(type_name, format!("Missing a field marked #[{marker}]"))
    })?;

    if let Some(duplicate) = marked.next() {
        return Err(syn::Error::new_spanned(
            duplicate,
            format!("Only one field may be marked #[{marker}]"),
        ));
    }

    field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "Marked field must be named"))
}
