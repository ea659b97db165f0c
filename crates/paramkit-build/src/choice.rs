use crate::{
    Artifact, ArtifactKind, Error, GeneratorConfig,
    helper::{doc_attr, quote_slice},
};
use paramkit_schema::node::{ChoiceSet, ValidateNode};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// Choice artifact: a fieldless enum over the set plus its runtime
/// `ChoiceTable`.
pub fn emit_choices(set: &ChoiceSet, config: &GeneratorConfig) -> Result<Artifact, Error> {
    set.validate()
        .map_err(|errors| paramkit_schema::Error::Descriptor {
            unit: set.name.clone(),
            errors,
        })?;

    let rt = config.runtime_path()?;
    let docs = config.emit_docs;

    let ident = format_ident!("{}", set.name);
    let set_name = set.name.as_str();
    let count = set.items.len();

    let variants: Vec<Ident> = set
        .items
        .iter()
        .map(|i| format_ident!("{}", i.variant_name()))
        .collect();
    let names: Vec<&str> = set.items.iter().map(|i| i.name.as_str()).collect();
    let labels: Vec<&str> = set.items.iter().map(|i| i.display_label()).collect();
    let item_docs: Vec<&str> = set.items.iter().map(|i| i.doc.as_str()).collect();
    let variant_docs: Vec<TokenStream> = set.items.iter().map(|i| doc_attr(docs, &i.doc)).collect();

    let choices = quote_slice(&set.items, |i| {
        let (name, label, doc) = (i.name.as_str(), i.display_label(), i.doc.as_str());
        quote!(#rt::Choice::new(#name, #label, #doc))
    });
    let doc = doc_attr(docs, &set.doc);

    let tokens = quote! {
        #doc
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum #ident {
            #( #variant_docs #variants, )*
        }

        impl #ident {
            pub const ALL: [Self; #count] = [ #( Self::#variants ),* ];
            pub const TABLE: #rt::ChoiceTable = #rt::ChoiceTable::new(#set_name, #choices);

            /// Persisted token.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    #( Self::#variants => #names, )*
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    #( Self::#variants => #labels, )*
                }
            }

            #[must_use]
            pub const fn doc(self) -> &'static str {
                match self {
                    #( Self::#variants => #item_docs, )*
                }
            }

            #[must_use]
            pub const fn index(self) -> usize {
                self as usize
            }

            #[must_use]
            pub fn from_index(index: usize) -> ::std::option::Option<Self> {
                Self::ALL.get(index).copied()
            }

            #[must_use]
            pub fn from_name(name: &str) -> ::std::option::Option<Self> {
                match name {
                    #( #names => ::std::option::Option::Some(Self::#variants), )*
                    _ => ::std::option::Option::None,
                }
            }

            /// Like `from_name`, reporting unknown tokens.
            pub fn parse(name: &str) -> ::std::result::Result<Self, #rt::Error> {
                Self::from_name(name).ok_or_else(|| #rt::Error::UnknownIdentifier {
                    set: ::std::string::String::from(#set_name),
                    name: name.to_string(),
                })
            }
        }

        impl ::std::fmt::Display for #ident {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::str::FromStr for #ident {
            type Err = #rt::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };

    Ok(Artifact::new(set_name, ArtifactKind::Choices, tokens))
}
