use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let forms = forms_path();
    let mut field_names = Vec::new();
    let mut name_methods = Vec::new();
    let mut to_values = Vec::new();
    let mut from_values = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.to_string();

        name_methods.push(quote! {
            pub const fn #field_ident(&self) -> &'static str {
                #field_name
            }
        });

        to_values.push(quote! {
            values.insert(
                #forms::form::FieldKey::new(#field_name),
                ::core::convert::Into::<#forms::form::FieldValue>::into(
                    ::core::clone::Clone::clone(&self.#field_ident),
                ),
            );
        });

        from_values.push(quote! {
            #field_ident: #forms::form::read_field::<#field_ty>(values, #field_name)?
        });

        field_names.push(field_name);
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#name_methods)*
        }

        impl #forms::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_names() -> &'static [&'static str] {
                &[#(#field_names),*]
            }

            fn to_values(&self) -> #forms::form::FieldValues {
                let mut values = #forms::form::FieldValues::new();
                #(#to_values)*
                values
            }

            fn from_values(
                values: &#forms::form::FieldValues,
            ) -> #forms::form::FormResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#from_values),*
                })
            }
        }
    }
    .into()
}

// The library declares `extern crate self as buildconnect_forms`, so the
// absolute path resolves from every target of that package.
fn forms_path() -> TokenStream2 {
    match crate_name("buildconnect_forms") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) | Err(_) => quote!(::buildconnect_forms),
    }
}
