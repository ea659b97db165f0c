use crate::{
    Artifact, ArtifactKind, Error, GeneratorConfig,
    helper::{doc_attr, native_type},
};
use paramkit_schema::{node::ClassRegistry, validate::naming::accessor_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// Structural artifact of a class: index enum, accessor struct and accessor
/// trait. Defaults and store keys are not consulted.
pub fn emit_declaration(class: &ClassRegistry, config: &GeneratorConfig) -> Result<Artifact, Error> {
    let rt = config.runtime_path()?;
    let docs = config.emit_docs;

    let class_ident = format_ident!("{}", class.class_name());
    let index_ident = format_ident!("{}Index", class.class_name());
    let access_ident = format_ident!("{}Access", class.class_name());

    let variants: Vec<(&str, &str)> = class
        .params()
        .iter()
        .map(|p| (p.name(), p.descriptor.doc.as_str()))
        .collect();
    let index_doc = doc_attr(docs, &format!("Parameter indices of `{}`.", class.class_name()));
    let index_enum = index_enum(&index_ident, &variants, &index_doc, docs);

    let mut methods = quote!();
    for p in class.params() {
        let d = &p.descriptor;
        let ty = native_type(d.kind);
        let stem = accessor_name(&d.name);
        let getter = format_ident!("{stem}");
        let default_fn = format_ident!("default_{stem}");
        let set_fn = format_ident!("set_{stem}");
        let doc_fn = format_ident!("doc_{stem}");
        let getter_doc = doc_attr(docs, &d.doc);

        methods.extend(quote! {
            #getter_doc
            fn #getter(&self) -> #ty;
            fn #default_fn(&self) -> #ty;
            fn #set_fn(&self, value: #ty) -> ::std::result::Result<bool, #rt::Error>;
        });
        if config.emit_remove {
            let remove_fn = format_ident!("remove_{stem}");
            methods.extend(quote! {
                fn #remove_fn(&self) -> ::std::result::Result<bool, #rt::Error>;
            });
        }
        methods.extend(quote! {
            fn #doc_fn(&self) -> &'static str;
        });
        if d.on_change {
            let hook = format_ident!("on_{stem}_changed");
            methods.extend(quote! {
                fn #hook<F>(&self, callback: F) -> ::std::result::Result<#rt::SubscriptionId, #rt::Error>
                where
                    F: Fn(#ty) + Send + Sync + 'static;
            });
        }
    }
    if class.emits_change_signal() {
        methods.extend(quote! {
            fn on_changed<F>(&self, callback: F) -> ::std::result::Result<#rt::SubscriptionId, #rt::Error>
            where
                F: Fn(#index_ident) + Send + Sync + 'static;
        });
    }

    let class_doc = doc_attr(docs, class.doc());
    let tokens = quote! {
        #index_enum

        #class_doc
        #[derive(Clone, Debug)]
        pub struct #class_ident {
            params: #rt::ParamSet,
        }

        pub trait #access_ident {
            #methods
        }
    };

    Ok(Artifact::new(class.class_name(), ArtifactKind::Declaration, tokens))
}

/// `#[repr(usize)]` enum with explicit discriminants in index order.
/// Shared by parameter classes and property catalogs.
pub(crate) fn index_enum(
    ident: &Ident,
    variants: &[(&str, &str)],
    doc: &TokenStream,
    docs: bool,
) -> TokenStream {
    let count = variants.len();
    let idents: Vec<Ident> = variants.iter().map(|(n, _)| format_ident!("{n}")).collect();
    let names: Vec<&str> = variants.iter().map(|(n, _)| *n).collect();
    let variant_docs: Vec<TokenStream> = variants.iter().map(|(_, d)| doc_attr(docs, d)).collect();
    let indices: Vec<usize> = (0..count).collect();

    quote! {
        #doc
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[repr(usize)]
        pub enum #ident {
            #( #variant_docs #idents = #indices, )*
        }

        impl #ident {
            pub const COUNT: usize = #count;
            pub const ALL: [Self; #count] = [ #( Self::#idents ),* ];

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    #( Self::#idents => #names, )*
                }
            }

            #[must_use]
            pub const fn index(self) -> usize {
                self as usize
            }

            #[must_use]
            pub const fn from_index(index: usize) -> ::std::option::Option<Self> {
                match index {
                    #( #indices => ::std::option::Option::Some(Self::#idents), )*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::std::convert::From<#ident> for usize {
            fn from(index: #ident) -> Self {
                index as Self
            }
        }
    }
}
