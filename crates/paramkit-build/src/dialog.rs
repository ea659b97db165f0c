use crate::{
    Artifact, ArtifactKind, Error, GeneratorConfig,
    helper::{doc_attr, float_lit, kind_expr},
};
use convert_case::{Case, Casing};
use paramkit_core::{SpinRange, ValueTransform};
use paramkit_schema::node::{DialogLayout, LayoutControl};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Dialog artifact: a lazily built `DialogSpec` plus a typed wrapper over
/// the runtime `Dialog`.
pub fn emit_dialog(layout: &DialogLayout, config: &GeneratorConfig) -> Result<Artifact, Error> {
    let rt = config.runtime_path()?;

    let ident = format_ident!("{}", layout.class_name);
    let spec_ident = format_ident!("{}_SPEC", layout.class_name.to_case(Case::UpperSnake));
    let name = layout.class_name.as_str();
    let title = layout.title.as_str();

    let mut chain = quote!();
    for (g, group) in layout.groups.iter().enumerate() {
        let (group_name, group_title) = (group.name.as_str(), group.title.as_str());
        chain.extend(quote!(.group(#group_name, #group_title)));

        for (r, row) in group.rows.iter().enumerate() {
            for c in &row.controls {
                let control = control(&rt, c, g, r);
                chain.extend(quote!(.control(#control)));
            }
        }
    }

    let doc = doc_attr(config.emit_docs, &format!("Settings page \"{title}\"."));
    let tokens = quote! {
        static #spec_ident: ::std::sync::LazyLock<#rt::DialogSpec> =
            ::std::sync::LazyLock::new(|| #rt::DialogSpec::new(#name, #title) #chain);

        #doc
        pub struct #ident<T: #rt::UiToolkit> {
            dialog: #rt::Dialog<T>,
        }

        impl<T: #rt::UiToolkit> #ident<T> {
            /// Build every control, wire companions and extensions, then
            /// translate.
            pub fn new(
                toolkit: T,
                extensions: #rt::ExtensionSet<T>,
            ) -> ::std::result::Result<Self, #rt::Error> {
                let dialog = #rt::Dialog::build(Self::spec().clone(), toolkit, extensions)?;

                ::std::result::Result::Ok(Self { dialog })
            }

            #[must_use]
            pub fn spec() -> &'static #rt::DialogSpec {
                &#spec_ident
            }

            #[must_use]
            pub const fn dialog(&self) -> &#rt::Dialog<T> {
                &self.dialog
            }

            pub const fn dialog_mut(&mut self) -> &mut #rt::Dialog<T> {
                &mut self.dialog
            }

            pub fn load_settings(
                &mut self,
                sources: &#rt::ParamSources,
            ) -> ::std::result::Result<(), #rt::Error> {
                self.dialog.load(sources)
            }

            pub fn save_settings(
                &self,
                sources: &#rt::ParamSources,
            ) -> ::std::result::Result<usize, #rt::Error> {
                self.dialog.save(sources)
            }

            pub fn retranslate_ui(&mut self) {
                self.dialog.retranslate();
            }
        }
    };

    Ok(Artifact::new(name, ArtifactKind::Dialog, tokens))
}

fn control(rt: &syn::Path, c: &LayoutControl, group: usize, row: usize) -> TokenStream {
    let b = &c.binding;
    let (id, class, name) = (c.id.as_str(), c.class.as_str(), c.name.as_str());
    let (label, tooltip) = (c.label.as_str(), c.tooltip.as_str());
    let param = c.param;
    let kind = kind_expr(rt, c.kind);
    let control_kind = format_ident!("{}", b.control.to_string());
    let transform = transform(rt, &b.transform);

    let mut tokens = quote! {
        #rt::ControlSpec::new(#id, #class, #param, #name, #kind, #rt::ControlKind::#control_kind)
            .at(#group, #row)
            .with_transform(#transform)
            .with_texts(#label, #tooltip)
    };

    if !b.items.is_empty() {
        let items = b.items.iter().map(|i| i.label.as_str());
        tokens.extend(quote!(.with_items([ #( #items ),* ])));
    }
    if let Some(companion) = &c.companion_id {
        tokens.extend(quote!(.with_companion(#companion)));
    }
    if let Some(range) = &b.range {
        let range = spin_range(rt, range);
        tokens.extend(quote!(.with_range(#range)));
    }
    if let Some(filter) = &b.filter {
        tokens.extend(quote!(.with_filter(#filter)));
    }
    if let Some(ext) = &b.extension {
        tokens.extend(quote!(.with_extension(#ext)));
    }

    tokens
}

fn transform(rt: &syn::Path, t: &ValueTransform) -> TokenStream {
    match t {
        ValueTransform::Identity => quote!(#rt::ValueTransform::Identity),
        ValueTransform::ComboIndex(values) => {
            quote!(#rt::ValueTransform::ComboIndex(::std::vec![ #( #values ),* ]))
        }
        ValueTransform::PackedColor => quote!(#rt::ValueTransform::PackedColor),
        ValueTransform::FilePath => quote!(#rt::ValueTransform::FilePath),
        ValueTransform::Shortcut => quote!(#rt::ValueTransform::Shortcut),
        ValueTransform::LinePattern => quote!(#rt::ValueTransform::LinePattern),
    }
}

fn spin_range(rt: &syn::Path, r: &SpinRange) -> TokenStream {
    let (min, max, step) = (float_lit(r.min), float_lit(r.max), float_lit(r.step));
    let decimals = r.decimals;

    quote!(#rt::SpinRange::new(#min, #max, #step, #decimals))
}
