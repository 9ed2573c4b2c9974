use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, FnArg, ImplItem, ImplItemFn, ItemImpl,
    LitStr, Pat, ReturnType, Token, Type, Visibility,
};

const VERBS: [&str; 9] = [
    "get", "head", "post", "put", "patch", "delete", "connect", "options", "trace",
];
const HOOKS: [&str; 2] = ["before", "after"];

struct ControllerArgs {
    path: Option<String>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = None;
        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "path" {
                let lit: LitStr = input.parse()?;
                path = Some(lit.value());
            } else {
                return Err(syn::Error::new_spanned(
                    name,
                    "unknown #[controller] argument, expected `path`",
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(ControllerArgs { path })
    }
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemImpl);
    let expanded = generate_controller_impl(&args, &input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_controller_impl(args: &ControllerArgs, input: &ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[controller] goes on an inherent impl block",
        ));
    }

    let mut methods = Vec::new();
    for item in &input.items {
        if let ImplItem::Fn(method) = item {
            if is_exported(method) {
                methods.push(generate_method(method)?);
            }
        }
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let context_mapping = args.path.as_ref().map(|path| {
        quote! {
            fn context_mapping(&self) -> ::std::option::Option<&str> {
                ::std::option::Option::Some(#path)
            }
        }
    });

    Ok(quote! {
        #input

        impl #impl_generics ::restline::web::Controller for #self_ty #where_clause {
            #context_mapping

            fn methods(self: ::std::sync::Arc<Self>) -> ::std::vec::Vec<::restline::web::Method> {
                ::std::vec![#(#methods),*]
            }
        }
    })
}

/// Public `&self` methods named after a verb or a hook.
fn is_exported(method: &ImplItemFn) -> bool {
    if !matches!(method.vis, Visibility::Public(_)) || method.sig.receiver().is_none() {
        return false;
    }
    let name = method.sig.ident.to_string();
    let first = first_word(&name).to_ascii_lowercase();
    VERBS.contains(&first.as_str()) || HOOKS.iter().any(|hook| name.eq_ignore_ascii_case(hook))
}

/// Leading word of a snake_case or CamelCase identifier.
fn first_word(name: &str) -> &str {
    let name = name.trim_start_matches('_');
    let end = name
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '_' || c.is_uppercase())
        .map_or(name.len(), |(i, _)| i);
    &name[..end]
}

fn generate_method(method: &ImplItemFn) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "controller methods must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "controller methods can not be generic",
        ));
    }
    if let Some(receiver) = sig.receiver() {
        if receiver.reference.is_none() || receiver.mutability.is_some() {
            return Err(syn::Error::new_spanned(
                receiver,
                "controller methods take `&self`",
            ));
        }
    }

    let ident = &sig.ident;
    let name = ident.to_string();
    let mut params = Vec::new();
    let mut takes = Vec::new();
    let mut call_args = Vec::new();
    let mut context_binding = None;

    let typed = sig.inputs.iter().filter_map(|input| match input {
        FnArg::Typed(pat_type) => Some(pat_type),
        FnArg::Receiver(_) => None,
    });
    for (index, pat_type) in typed.enumerate() {
        let param_name = match pat_type.pat.as_ref() {
            Pat::Ident(pat) => pat.ident.to_string(),
            _ => format!("arg{index}"),
        };
        let ty = pat_type.ty.as_ref();

        if let Some(mutable) = context_reference(ty) {
            if context_binding.is_some() {
                return Err(syn::Error::new_spanned(
                    pat_type,
                    "a controller method takes the context at most once",
                ));
            }
            params.push(quote! { ::restline::web::Param::context(#param_name) });
            context_binding = Some(quote! {
                let __restline_ctx = __restline_args.context();
            });
            call_args.push(if mutable {
                quote! { __restline_ctx }
            } else {
                quote! { &*__restline_ctx }
            });
            continue;
        }

        let arg = format_ident!("__arg{}", index);
        params.push(quote! { <#ty as ::restline::web::FromArgument>::describe(#param_name) });
        takes.push(quote! {
            let #arg: #ty = __restline_args.take::<#ty>(#index)?;
        });
        call_args.push(quote! { #arg });
    }

    let return_type = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    Ok(quote! {
        {
            let __restline_this = ::std::sync::Arc::clone(&self);
            ::restline::web::Method::new(#name)
                #(.param(#params))*
                .returns(<#return_type as ::restline::web::IntoReturns>::describe())
                .invoke(move |__restline_args| {
                    #(#takes)*
                    #context_binding
                    ::std::result::Result::Ok(::restline::web::IntoReturns::into_returns(
                        __restline_this.#ident(#(#call_args),*)
                    ))
                })
        }
    })
}

/// `Some(mutable)` when `ty` is `&Context` or `&mut Context`.
fn context_reference(ty: &Type) -> Option<bool> {
    let Type::Reference(reference) = ty else {
        return None;
    };
    let Type::Path(path) = reference.elem.as_ref() else {
        return None;
    };
    let last = path.path.segments.last()?;
    (last.ident == "Context" && last.arguments.is_empty()).then_some(reference.mutability.is_some())
}
