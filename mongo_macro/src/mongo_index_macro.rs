use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{DeriveInput, Ident, LitStr, Token, bracketed, parenthesized, parse_macro_input};

/// 单条索引声明：
/// `#[mongo_index(fields["a", "b"], unique, sparse, order("desc"), name("ix_ab"))]`
struct IndexDef {
    fields: Vec<String>,
    unique: bool,
    sparse: bool,
    sort_order: i32,
    name: Option<String>,
}

impl Parse for IndexDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut def = IndexDef { fields: vec![], unique: false, sparse: false, sort_order: 1, name: None };
        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            if ident == "fields" {
                let content;
                bracketed!(content in input);
                let lits: Punctuated<LitStr, Token![,]> = content.parse_terminated(<LitStr as Parse>::parse, Token![,])?;
                def.fields = lits.into_iter().map(|lit| lit.value()).collect();
            } else if ident == "unique" {
                def.unique = true;
            } else if ident == "sparse" {
                // 唯一索引跳过缺失字段的文档（可选字段用）
                def.sparse = true;
            } else if ident == "order" {
                let content;
                parenthesized!(content in input);
                let lit: LitStr = content.parse()?;
                if lit.value().eq_ignore_ascii_case("desc") {
                    def.sort_order = -1;
                }
            } else if ident == "name" {
                let content;
                parenthesized!(content in input);
                let lit: LitStr = content.parse()?;
                def.name = Some(lit.value());
            } else {
                return Err(syn::Error::new(ident.span(), "unknown mongo_index option"));
            }
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        if def.fields.is_empty() {
            return Err(input.error("mongo_index requires fields[...]"));
        }
        Ok(def)
    }
}

impl IndexDef {
    fn to_model_expr(&self) -> TokenStream {
        let sort_order = self.sort_order;
        let mut key_doc = quote! { bson::doc! {} };
        for field in &self.fields {
            key_doc = quote! {
                {
                    let mut d = #key_doc;
                    d.insert(#field, #sort_order);
                    d
                }
            };
        }

        let mut options = quote! { mongodb::options::IndexOptions::builder() };
        if self.unique {
            options = quote! { #options.unique(true) };
        }
        if self.sparse {
            options = quote! { #options.sparse(true) };
        }
        if let Some(ref name) = self.name {
            options = quote! { #options.name(Some(#name.to_string())) };
        }
        let options = quote! { Some(#options.build()) };

        quote! {
            mongodb::IndexModel::builder()
                .keys(#key_doc)
                .options(#options)
                .build()
        }
    }
}

pub fn expand_index_model_provider(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;

    let mut index_exprs = vec![];
    for attr in &ast.attrs {
        if attr.path().is_ident("mongo_index") {
            let def = match attr.parse_args::<IndexDef>() {
                Ok(def) => def,
                Err(e) => return e.to_compile_error().into(),
            };
            index_exprs.push(def.to_model_expr());
        }
    }

    let expanded = quote! {
        impl MongoIndexModelProvider for #name {
            fn index_models() -> Vec<mongodb::IndexModel> {
                vec![
                    #(#index_exprs),*
                ]
            }
        }
    };

    expanded.into()
}
