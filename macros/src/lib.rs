//! Derive macros for the Reflux state container
//!
//! This crate provides procedural macros to reduce boilerplate when writing
//! action enums by hand.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates type tags and mutation classification for action enums
//!
//! # Example
//!
//! ```ignore
//! use reflux_core::action::Action as _;
//! use reflux_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(prefix = "todos")]
//! enum TodoAction {
//!     #[mutation]
//!     CreateTask { description: String },
//!
//!     SelectTask { id: String },
//! }
//!
//! // Generated methods:
//! assert_eq!(TodoAction::CreateTask { description: "x".into() }.action_type(), "todos/CreateTask");
//! assert!(TodoAction::CreateTask { description: "x".into() }.is_mutation());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derive macro for Action enums
///
/// Generates:
/// - an implementation of `reflux_core::action::Action` whose `action_type()`
///   returns `"<prefix>/<Variant>"`
/// - `is_mutation()` - Returns true if the variant is marked `#[mutation]`
///
/// # Attributes
///
/// - `#[action(prefix = "...")]` on the enum - Tag prefix (defaults to the enum name)
/// - `#[mutation]` on a variant - Mark the variant as changing the data it targets
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - The `action` attribute is malformed
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(prefix = "orders")]
/// enum OrderAction {
///     #[mutation]
///     PlaceOrder { customer_id: String },
///
///     ViewOrder { order_id: String },
/// }
///
/// let action = OrderAction::PlaceOrder { customer_id: "cust-1".into() };
/// assert_eq!(action.action_type(), "orders/PlaceOrder");
/// assert!(action.is_mutation());
/// ```
#[proc_macro_derive(Action, attributes(action, mutation))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let prefix = match action_prefix(&input.attrs) {
        Ok(Some(prefix)) => prefix,
        Ok(None) => name.to_string(),
        Err(error) => return error.to_compile_error().into(),
    };

    let mut action_type_arms = Vec::new();
    let mut is_mutation_arms = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };

        let type_name = format!("{prefix}/{variant_name}");
        action_type_arms.push(quote! { #pattern => #type_name, });

        if has_attribute(&variant.attrs, "mutation") {
            is_mutation_arms.push(quote! { #pattern => true, });
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::reflux_core::action::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &'static str {
                match *self {
                    #(#action_type_arms)*
                }
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Returns true if this action changes the data it targets
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_mutation(&self) -> bool {
                match *self {
                    #(#is_mutation_arms)*
                    _ => false,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Reads `prefix` out of an `#[action(prefix = "...")]` attribute, if present
fn action_prefix(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut prefix = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("prefix") {
                let value: LitStr = meta.value()?.parse()?;
                prefix = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported action attribute, expected `prefix`"))
            }
        })?;
    }

    Ok(prefix)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
