use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_injectable_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Injectable)] only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    let field_injections = fields.iter().map(|field| {
        let field_name = &field.ident;
        match shared_type(&field.ty) {
            Some(inner) => quote! {
                #field_name: container.resolve::<#inner>()?
            },
            None => quote! {
                #field_name: ::std::default::Default::default()
            },
        }
    });

    Ok(quote! {
        impl #impl_generics ::restline::di::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                container: &::restline::di::Container
            ) -> ::restline::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #(#field_injections),*
                })
            }
        }
    })
}

/// `T` of an `Arc<T>` field, `dyn Trait` included.
fn shared_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
