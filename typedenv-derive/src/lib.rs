//! Derive macro implementation for typedenv

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

/// Check if type is `Option<T>`
fn is_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        return type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident == "Option")
            .unwrap_or(false);
    }
    false
}

/// `EnvLoader` derive macro
///
/// Implements `typedenv::EnvLoader` (the type's declaration) and adds
/// `from_env()` / `from_instance()` constructors to the struct.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(frozen = false)]`: Allow reassigning resolved fields
/// - `#[env(extends = Parent)]`: Start from `Parent`'s declaration
/// - `#[env(converter = func)]`: Register an extra converter for this type
///
/// **Field-level**:
/// - `#[env(name = "CUSTOM_NAME")]`: Custom environment variable name
/// - `#[env(default = value)]`: Use explicit default value if env var not set
/// - `#[env(converter = func)]`: Inline converter for this field only
/// - `#[env(skip)]`: Not declared; filled with `Default::default()`
///
/// # Example
///
/// See the `typedenv` crate documentation for usage examples.
#[proc_macro_derive(EnvLoader, attributes(env))]
pub fn derive_env_loader(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvLoader only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvLoader only supports structs",
            ));
        }
    };

    let base = match &struct_attrs.extends {
        Some(parent) => quote! {
            ::typedenv::Declaration::extending(
                <#parent as ::typedenv::EnvLoader>::declaration()
            )
        },
        None => quote! { ::typedenv::Declaration::new() },
    };

    let frozen = struct_attrs.frozen.map(|frozen| {
        quote! { let declaration = declaration.frozen(#frozen); }
    });

    let converters = struct_attrs.converters.iter().map(|func| {
        quote! {
            let declaration = declaration.converter(::typedenv::Converter::new(#func));
        }
    });

    let mut field_declarations = Vec::new();
    let mut field_initializers = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "EnvLoader only supports named fields")
        })?;
        let field_type = &field.ty;
        let attrs = FieldAttrs::from_field(field)?;

        if attrs.skip {
            field_initializers.push(quote! {
                #field_name: ::core::default::Default::default()
            });
            continue;
        }

        // Environment variable name: explicit, or the upper-cased field name
        let env_var_name = attrs
            .name
            .unwrap_or_else(|| field_name.unraw().to_string().to_uppercase());

        let type_expr = match &attrs.converter {
            Some(func) => quote! {
                ::typedenv::TypeExpr::annotated(
                    <#field_type as ::typedenv::EnvType>::type_expr(),
                    [::typedenv::Metadata::Converter(::typedenv::Converter::new(#func))],
                )
            },
            None => quote! { <#field_type as ::typedenv::EnvType>::type_expr() },
        };

        let declaration = match &attrs.default {
            Some(default_value) => {
                let default_value = if is_option(field_type) {
                    quote! { ::core::option::Option::Some(#default_value) }
                } else {
                    quote! { #default_value }
                };
                quote! {
                    let declaration = declaration.field_with_default(
                        #env_var_name,
                        #type_expr,
                        {
                            let __default: #field_type = #default_value;
                            ::typedenv::EnvType::into_value(__default)
                        },
                    );
                }
            }
            None => quote! {
                let declaration = declaration.field(#env_var_name, #type_expr);
            },
        };

        field_declarations.push(declaration);
        // Narrow integers and other range-limited types fail as conversions
        field_declarations.push(quote! {
            let declaration = declaration.check(
                #env_var_name,
                <#field_type as ::typedenv::EnvType>::check,
            );
        });
        field_initializers.push(quote! {
            #field_name: instance.extract::<#field_type>(#env_var_name)?
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::typedenv::EnvLoader for #struct_name #ty_generics #where_clause {
            fn declaration() -> ::typedenv::Declaration {
                let declaration = #base;
                #frozen
                #(#converters)*
                #(#field_declarations)*
                declaration
            }
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Load the configuration from environment variables
            ///
            /// The first call resolves and caches the process-wide instance;
            /// later calls read the cached values.
            ///
            /// # Errors
            ///
            /// - Required environment variables are not set
            /// - Environment variable values cannot be converted to the field types
            /// - A field type has no converter
            pub fn from_env() -> ::core::result::Result<Self, ::typedenv::EnvError> {
                let instance = <Self as ::typedenv::EnvLoader>::load()?;
                Self::from_instance(&instance)
            }

            /// Read the struct out of a resolved instance
            pub fn from_instance(
                instance: &::typedenv::ConfigInstance,
            ) -> ::core::result::Result<Self, ::typedenv::EnvError> {
                ::core::result::Result::Ok(Self {
                    #(#field_initializers),*
                })
            }
        }
    })
}
