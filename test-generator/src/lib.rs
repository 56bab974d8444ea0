use proc_macro::TokenStream;
use proc_macro2::{Literal, Span};
use quote::quote;
use std::{ffi::OsStr, path::PathBuf};
use syn::{parse_macro_input, spanned::Spanned};

/// Extension of answer fixtures.
const FIXTURE_EXTENSION: &str = "md";

fn error(span: Span, message: &str) -> TokenStream {
    TokenStream::from(syn::Error::new(span, message).into_compile_error())
}

/// Generates one test per answer fixture found under the given directory, relative to the
/// manifest of the crate being tested. Each test calls the annotated function with the absolute
/// path of its fixture. A trailing `ignore` marks the generated tests as `#[ignore]`.
#[proc_macro_attribute]
pub fn from_dir(args: TokenStream, input: TokenStream) -> TokenStream {
    let original_input = input.clone();

    let args = parse_macro_input!(args as syn::AttributeArgs);
    let (dir, ignore) = match args.as_slice() {
        [syn::NestedMeta::Lit(syn::Lit::Str(dir))] => (dir, false),
        [syn::NestedMeta::Lit(syn::Lit::Str(dir)), syn::NestedMeta::Meta(syn::Meta::Path(p))]
            if p.is_ident("ignore") =>
        {
            (dir, true)
        }
        [first, ..] => return error(first.span(), "expected a directory and optional `ignore`"),
        [] => return error(Span::call_site(), "expected a directory argument"),
    };

    let func = parse_macro_input!(input as syn::ItemFn);
    if func.sig.inputs.len() != 1 {
        return error(func.span(), "function must take the fixture path as its only argument");
    }
    let func_ident = func.sig.ident;

    let root = std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from).unwrap_or_default();
    let ignore_attr = ignore.then(|| quote!(#[ignore]));

    let mut entries: Vec<_> = walkdir::WalkDir::new(root.join(dir.value()))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_type().is_file() && e.path().extension() == Some(OsStr::new(FIXTURE_EXTENSION))
        })
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut streams = vec![original_input];
    for entry in entries {
        let Some(path) = entry.path().to_str() else { continue };
        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        let suffix = relative
            .with_extension("")
            .to_string_lossy()
            .replace(|c: char| !c.is_ascii_alphanumeric() && c != '_', "_");
        let new_ident = syn::Ident::new(&format!("{}_{}", func_ident, suffix), func_ident.span());
        let arg = Literal::string(path);
        streams.push(
            quote! {
                #[test]
                #ignore_attr
                #[allow(warnings)]
                fn #new_ident() {
                    #func_ident(#arg)
                }
            }
            .into(),
        );
    }

    TokenStream::from_iter(streams)
}
