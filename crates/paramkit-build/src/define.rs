use crate::{
    Artifact, ArtifactKind, Error, GeneratorConfig,
    helper::{constraint_exprs, default_expr, kind_expr, native_type, value_expr},
};
use convert_case::{Case, Casing};
use paramkit_schema::{
    binding::BindingRegistry,
    node::{ClassRegistry, RegisteredParam},
    validate::naming::accessor_name,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Behavioral artifact of a class: static parameter table, `open`, and the
/// accessor trait implementation over `ParamSet`.
pub fn emit_definition(
    class: &ClassRegistry,
    bindings: &BindingRegistry,
    config: &GeneratorConfig,
) -> Result<Artifact, Error> {
    let rt = config.runtime_path()?;

    let class_ident = format_ident!("{}", class.class_name());
    let index_ident = format_ident!("{}Index", class.class_name());
    let access_ident = format_ident!("{}Access", class.class_name());
    let table_ident = format_ident!("{}_TABLE", class.class_name().to_case(Case::UpperSnake));

    let infos = class
        .params()
        .iter()
        .map(|p| param_info(&rt, class, bindings, p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut methods = quote!();
    for p in class.params() {
        methods.extend(accessors(&rt, config, p));
    }
    if class.emits_change_signal() {
        methods.extend(quote! {
            fn on_changed<F>(&self, callback: F) -> ::std::result::Result<#rt::SubscriptionId, #rt::Error>
            where
                F: Fn(#index_ident) + Send + Sync + 'static,
            {
                self.params.subscribe_all(move |event| {
                    if let ::std::option::Option::Some(index) = #index_ident::from_index(event.index) {
                        callback(index);
                    }
                })
            }
        });
    }

    let qualified = class.qualified_name();
    let root = class.root().as_str();
    let signal = class.emits_change_signal();

    let tokens = quote! {
        static #table_ident: ::std::sync::LazyLock<::std::vec::Vec<#rt::ParamInfo>> =
            ::std::sync::LazyLock::new(|| ::std::vec![ #( #infos ),* ]);

        impl #class_ident {
            pub const CLASS: &'static str = #qualified;
            pub const ROOT: &'static str = #root;

            /// Seed every parameter from its default, overlay stored values
            /// and watch every key.
            pub fn open(
                store: ::std::sync::Arc<dyn #rt::ParamStore>,
            ) -> ::std::result::Result<Self, #rt::Error> {
                let params = #rt::ParamSet::open(Self::CLASS, Self::table().to_vec(), store, #signal)?;

                ::std::result::Result::Ok(Self { params })
            }

            #[must_use]
            pub const fn params(&self) -> &#rt::ParamSet {
                &self.params
            }

            #[must_use]
            pub fn table() -> &'static [#rt::ParamInfo] {
                &#table_ident
            }
        }

        impl #access_ident for #class_ident {
            #methods
        }
    };

    Ok(Artifact::new(class.class_name(), ArtifactKind::Definition, tokens))
}

// ParamInfo builder chain for one table row
fn param_info(
    rt: &syn::Path,
    class: &ClassRegistry,
    bindings: &BindingRegistry,
    p: &RegisteredParam,
) -> Result<TokenStream, Error> {
    let unit = class.class_name();
    let d = &p.descriptor;

    let index = p.index;
    let name = d.name.as_str();
    let kind = kind_expr(rt, d.kind);
    let default = default_expr(rt, unit, &p.default)?;
    let doc = d.doc.as_str();
    let key = p.key.as_str();

    let mut info = quote! {
        #rt::ParamInfo::new(#index, #name, #kind, #default)
            .with_doc(#doc)
            .with_key(#key)
    };

    if d.on_change {
        info.extend(quote!(.with_notify()));
    }

    let binding = bindings.resolve(class, p)?;
    if let Some(companion) = &binding.companion {
        let companion = companion.index;
        let sentinel = value_expr(rt, &binding.sentinel);
        info.extend(quote!(.with_gate(#companion, #sentinel)));
    }

    if let Some(c) = &d.constraint {
        let [min, max, step] = constraint_exprs(unit, c)?;
        info.extend(quote!(.with_constraints(#rt::Constraints::new(#min, #max, #step))));
    }

    let flags = d.parsed_flags();
    if !flags.is_empty() {
        let bits = flags.bits();
        info.extend(quote!(.with_flags(#rt::PropFlags::from_bits_retain(#bits))));
    }

    Ok(info)
}

// trait method bodies for one parameter
fn accessors(rt: &syn::Path, config: &GeneratorConfig, p: &RegisteredParam) -> TokenStream {
    let d = &p.descriptor;
    let index = p.index;
    let ty = native_type(d.kind);
    let stem = accessor_name(&d.name);
    let doc = d.doc.as_str();

    let getter = format_ident!("{stem}");
    let default_fn = format_ident!("default_{stem}");
    let set_fn = format_ident!("set_{stem}");
    let doc_fn = format_ident!("doc_{stem}");

    let mut tokens = quote! {
        fn #getter(&self) -> #ty {
            self.params.read::<#ty>(#index)
        }

        fn #default_fn(&self) -> #ty {
            self.params.read_default::<#ty>(#index)
        }

        fn #set_fn(&self, value: #ty) -> ::std::result::Result<bool, #rt::Error> {
            self.params.write(#index, value)
        }

        fn #doc_fn(&self) -> &'static str {
            #doc
        }
    };

    if config.emit_remove {
        let remove_fn = format_ident!("remove_{stem}");
        tokens.extend(quote! {
            fn #remove_fn(&self) -> ::std::result::Result<bool, #rt::Error> {
                self.params.remove(#index)
            }
        });
    }

    if d.on_change {
        let hook = format_ident!("on_{stem}_changed");
        tokens.extend(quote! {
            fn #hook<F>(&self, callback: F) -> ::std::result::Result<#rt::SubscriptionId, #rt::Error>
            where
                F: Fn(#ty) + Send + Sync + 'static,
            {
                self.params.observe::<#ty, F>(#index, callback)
            }
        });
    }

    tokens
}
