use crate::{
    Artifact, ArtifactKind, Error, GeneratorConfig,
    declare::index_enum,
    helper::{constraint_exprs, doc_attr, quote_option, quote_slice, symbol_path, untyped_lit},
};
use convert_case::{Case, Casing};
use paramkit_core::Value;
use paramkit_schema::{
    node::{FeatureSpec, PropertyCatalog, RegisteredProperty},
    types::DefaultValue,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// Property artifact: index enum and `PropertySpec` table for the catalog,
/// plus one registration helper per feature.
pub fn emit_properties(catalog: &PropertyCatalog, config: &GeneratorConfig) -> Result<Artifact, Error> {
    let rt = config.runtime_path()?;
    let docs = config.emit_docs;
    let unit = catalog.name();

    let index_ident = format_ident!("{unit}Index");
    let info_ident = format_ident!("{}_PROPERTY_INFO", unit.to_case(Case::UpperSnake));

    let variants: Vec<(&str, &str)> = catalog
        .properties()
        .iter()
        .map(|p| (p.descriptor.name.as_str(), p.descriptor.doc.as_str()))
        .collect();
    let index_doc = doc_attr(docs, &format!("Property indices of `{unit}`."));
    let index_enum = index_enum(&index_ident, &variants, &index_doc, docs);

    let count = catalog.properties().len();
    let specs = catalog
        .properties()
        .iter()
        .map(|p| property_spec(&rt, unit, p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut features = quote!();
    for feature in catalog.features() {
        features.extend(feature_helper(&rt, catalog, feature, &index_ident, &info_ident, docs)?);
    }

    let tokens = quote! {
        #index_enum

        pub static #info_ident: [#rt::PropertySpec; #count] = [ #( #specs ),* ];

        #features
    };

    Ok(Artifact::new(unit, ArtifactKind::Properties, tokens))
}

fn property_spec(rt: &syn::Path, unit: &str, p: &RegisteredProperty) -> Result<TokenStream, Error> {
    let d = &p.descriptor;
    let index = p.index;
    let name = d.name.as_str();
    let type_tag = d.type_tag();
    let doc = d.doc.as_str();
    let bits = p.flags.bits();

    let bounds = d
        .constraint
        .as_ref()
        .map(|c| constraint_exprs(unit, c))
        .transpose()?;
    let constraints = quote_option(bounds.as_ref(), |[min, max, step]| {
        quote!(#rt::Constraints::new(#min, #max, #step))
    });

    Ok(quote! {
        #rt::PropertySpec {
            index: #index,
            name: #name,
            type_tag: #type_tag,
            doc: #doc,
            flags: #rt::PropFlags::from_bits_retain(#bits),
            constraints: #constraints,
        }
    })
}

fn feature_helper(
    rt: &syn::Path,
    catalog: &PropertyCatalog,
    feature: &FeatureSpec,
    index_ident: &Ident,
    info_ident: &Ident,
    docs: bool,
) -> Result<TokenStream, Error> {
    let ident = format_ident!("{}Properties", feature.class_name);
    let category = feature.category.as_str();
    let props: Vec<&RegisteredProperty> = catalog.feature_properties(feature).collect();

    let count = props.len();
    let variants: Vec<Ident> = props
        .iter()
        .map(|p| format_ident!("{}", p.descriptor.name))
        .collect();

    let mut registrations = quote!();
    for p in &props {
        let index = p.index;
        let default = default_value(catalog.name(), p)?;
        registrations.extend(quote! {
            self.map.register(host, &#info_ident[#index], Self::CATEGORY, ::std::boxed::Box::new(#default));
        });
    }

    let indices: Vec<usize> = props.iter().map(|p| p.index).collect();
    let restore = quote_slice(&indices, |i| quote!(&#info_ident[#i]));

    let doc = doc_attr(
        docs,
        &format!("Properties of `{}` registered under \"{category}\".", feature.class_name),
    );

    Ok(quote! {
        #doc
        #[derive(Clone, Debug)]
        pub struct #ident<H> {
            map: #rt::PropertyMap<H>,
        }

        impl<H: Clone> #ident<H> {
            pub const CATEGORY: &'static str = #category;
            pub const PROPERTIES: [#index_ident; #count] = [ #( #index_ident::#variants ),* ];

            #[must_use]
            pub fn new() -> Self {
                Self {
                    map: #rt::PropertyMap::new(#index_ident::COUNT),
                }
            }

            /// Add each property to the host in order, binding constraints.
            pub fn register_properties<P>(&mut self, host: &mut P)
            where
                P: #rt::PropertyHost<Handle = H>,
            {
                #registrations
            }

            /// Re-establish the index mapping after a document restore.
            pub fn on_restored<P>(&mut self, host: &mut P) -> usize
            where
                P: #rt::PropertyHost<Handle = H>,
            {
                self.map.restore(host, #restore)
            }

            #[must_use]
            pub fn property(&self, index: #index_ident) -> ::std::option::Option<&H> {
                self.map.get(index.index())
            }
        }

        impl<H: Clone> ::std::default::Default for #ident<H> {
            fn default() -> Self {
                Self::new()
            }
        }
    })
}

// default value expression, typed as the property's value type
fn default_value(unit: &str, p: &RegisteredProperty) -> Result<TokenStream, Error> {
    let pt = &p.descriptor.property_type;
    let ty: syn::Type = syn::parse_str(&pt.value_type).map_err(|_| Error::Syntax {
        unit: unit.to_string(),
        text: pt.value_type.clone(),
        what: "type",
    })?;
    let is_float = matches!(pt.value_type.trim(), "f32" | "f64");

    let tokens = match &p.descriptor.default {
        Some(DefaultValue::Literal(Value::Text(s))) => quote!(<#ty>::from(#s)),
        Some(DefaultValue::Literal(v @ (Value::Int(_) | Value::UInt(_)))) if is_float => {
            let lit = untyped_lit(v);
            quote!(#lit as #ty)
        }
        Some(DefaultValue::Literal(v)) => {
            let lit = untyped_lit(v);
            quote!({ let value: #ty = #lit; value })
        }
        Some(DefaultValue::Symbol(s)) => {
            let path = symbol_path(unit, s)?;
            quote!({ let value: #ty = #path; value })
        }
        None => match &pt.fallback {
            Some(expr) => {
                let expr: syn::Expr = syn::parse_str(expr).map_err(|_| Error::Syntax {
                    unit: unit.to_string(),
                    text: expr.clone(),
                    what: "expression",
                })?;
                quote!({ let value: #ty = #expr; value })
            }
            None => quote!(<#ty as ::std::default::Default>::default()),
        },
    };

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramkit_schema::{
        node::{PropertyCatalogSpec, PropertyDescriptor, PropertyType},
        types::{IntConstraint, SymbolRef},
    };

    fn catalog() -> PropertyCatalog {
        let mut placement = PropertyType::new("PropertyPlacement", "Placement");
        placement.fallback = Some("Placement::identity()".into());

        PropertyCatalog::register(
            PropertyCatalogSpec::new("LinkProps")
                .property(PropertyDescriptor::new("LinkPlacement", placement).doc("Link placement"))
                .property(
                    PropertyDescriptor::new("ElementCount", PropertyType::new("PropertyInteger", "i64"))
                        .derived("PropertyIntegerConstraint")
                        .constrained(IntConstraint::new(0, SymbolRef::new("INT_MAX").unwrap(), 1))
                        .flags("Hidden|NoPersist"),
                )
                .property(
                    PropertyDescriptor::new("Scale", PropertyType::new("PropertyFloat", "f64"))
                        .default_value(DefaultValue::literal(2)),
                )
                .property(
                    PropertyDescriptor::new("Label", PropertyType::new("PropertyString", "String"))
                        .default_value(DefaultValue::literal("link")),
                )
                .feature(FeatureSpec::new("LinkExtension", "Link", ["LinkPlacement", "ElementCount"]))
                .feature(FeatureSpec::new("LinkElement", "Link", ["Scale", "Label"])),
        )
        .unwrap()
    }

    fn render() -> String {
        emit_properties(&catalog(), &GeneratorConfig::default())
            .unwrap()
            .render()
            .replace(' ', "")
    }

    #[test]
    fn spec_table_uses_derived_type_and_flags() {
        let code = render();

        assert!(code.contains("pubstaticLINK_PROPS_PROPERTY_INFO:[::paramkit::PropertySpec;4usize]"));
        assert!(code.contains("type_tag:\"PropertyIntegerConstraint\""));
        assert!(code.contains("flags:::paramkit::PropFlags::from_bits_retain(33u32)"));
        assert!(code.contains(
            "constraints:Some(::paramkit::Constraints::new(0i64,(INT_MAX)asi64,1i64))"
        ));
        assert!(code.contains("constraints:None"));
    }

    #[test]
    fn features_register_their_subset_in_order() {
        let code = render();

        assert!(code.contains("pubstructLinkExtensionProperties<H>"));
        assert!(code.contains(
            "pubconstPROPERTIES:[LinkPropsIndex;2usize]=[LinkPropsIndex::LinkPlacement,LinkPropsIndex::ElementCount]"
        ));
        assert!(code.contains("self.map.restore(host,&[&LINK_PROPS_PROPERTY_INFO[2usize],&LINK_PROPS_PROPERTY_INFO[3usize]])"));
    }

    #[test]
    fn defaults_follow_the_value_type() {
        let code = render();

        assert!(code.contains("Box::new({letvalue:Placement=Placement::identity();value})"));
        assert!(code.contains("Box::new(<i64as::std::default::Default>::default())"));
        assert!(code.contains("Box::new(2asf64)"));
        assert!(code.contains("Box::new(<String>::from(\"link\"))"));
    }

    #[test]
    fn bad_value_type_is_a_syntax_error() {
        let cat = PropertyCatalog::register(
            PropertyCatalogSpec::new("Bad")
                .property(PropertyDescriptor::new("P", PropertyType::new("PropertyX", "not a type")))
                .feature(FeatureSpec::new("F", "", ["P"])),
        )
        .unwrap();

        assert!(matches!(
            emit_properties(&cat, &GeneratorConfig::default()),
            Err(Error::Syntax { what: "type", .. })
        ));
    }
}
