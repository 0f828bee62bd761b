//! Procedural macros for octo-mcp
//!
//! This crate provides the `#[github_tool]` attribute macro for defining GitHub MCP tools
//! with minimal boilerplate.

use darling::{FromMeta, ast::NestedMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse_macro_input};

/// Arguments for the `#[github_tool]` attribute
#[derive(Debug, FromMeta)]
struct GitHubToolArgs {
    /// Tool name (e.g., "get_issue")
    name: String,
    /// Tool description for MCP
    description: String,
    /// Toolset the tool belongs to
    toolset: String,
    /// Operation type: "read" or "write"
    operation: String,
}

/// Attribute macro for GitHub MCP tools.
///
/// This macro generates:
/// - `ToolInfo` trait implementation (name, description, toolset, operation_type)
/// - JSON Schema for input arguments via schemars
/// - An `inventory` registration so the tool is discovered at startup
/// - Automatically adds `#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]`
///
/// # Example
///
/// ```ignore
/// #[github_tool(
///     name = "get_issue",
///     description = "Get details of a specific issue",
///     toolset = "issues",
///     operation = "read"
/// )]
/// pub struct GetIssue {
///     /// Repository owner
///     pub owner: String,
///     /// Repository name
///     pub repo: String,
///     /// Issue number
///     pub issue_number: u64,
/// }
///
/// #[async_trait]
/// impl ToolExecutor for GetIssue {
///     async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
///         // Your implementation here
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn github_tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    let args = match GitHubToolArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    let input = parse_macro_input!(item as DeriveInput);
    let expanded = impl_github_tool(&args, &input);

    TokenStream::from(expanded)
}

fn impl_github_tool(args: &GitHubToolArgs, input: &DeriveInput) -> TokenStream2 {
    let struct_name = &input.ident;
    let tool_name = &args.name;
    let description = &args.description;

    let toolset_variant = match args.toolset.as_str() {
        "context" => quote! { crate::toolsets::Toolset::Context },
        "repos" => quote! { crate::toolsets::Toolset::Repos },
        "issues" => quote! { crate::toolsets::Toolset::Issues },
        "pull_requests" => quote! { crate::toolsets::Toolset::PullRequests },
        "projects" => quote! { crate::toolsets::Toolset::Projects },
        "code_security" => quote! { crate::toolsets::Toolset::CodeSecurity },
        "dependabot" => quote! { crate::toolsets::Toolset::Dependabot },
        "secret_protection" => quote! { crate::toolsets::Toolset::SecretProtection },
        other => {
            return syn::Error::new_spanned(input, format!("Unknown toolset: {}", other))
                .to_compile_error();
        }
    };

    let operation_variant = match args.operation.as_str() {
        "read" => quote! { crate::toolsets::OperationType::Read },
        "write" => quote! { crate::toolsets::OperationType::Write },
        other => {
            return syn::Error::new_spanned(
                input,
                format!("Unknown operation: {}. Use: read or write", other),
            )
            .to_compile_error();
        }
    };

    let vis = &input.vis;
    let attrs: Vec<_> = input.attrs.iter().collect();
    let generics = &input.generics;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    input,
                    "github_tool only supports structs with named fields",
                )
                .to_compile_error();
            }
        },
        _ => {
            return syn::Error::new_spanned(input, "github_tool only supports structs")
                .to_compile_error();
        }
    };

    let register_fn = format_ident!("__register_{}", tool_name);

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
        #vis struct #struct_name #generics {
            #fields
        }

        impl crate::tools::ToolInfo for #struct_name {
            fn name() -> &'static str {
                #tool_name
            }

            fn description() -> &'static str {
                #description
            }

            fn toolset() -> crate::toolsets::Toolset {
                #toolset_variant
            }

            fn operation_type() -> crate::toolsets::OperationType {
                #operation_variant
            }
        }

        #[allow(non_snake_case)]
        fn #register_fn(registry: &mut crate::tools::ToolRegistry) {
            registry.register::<#struct_name>();
        }

        inventory::submit! {
            crate::tools::registry::ToolRegistration {
                register_fn: #register_fn,
            }
        }
    }
}
