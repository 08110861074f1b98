//! rest_controller 宏实现

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, Token};

use crate::route::{self, ParamMarker, RouteMethod};
use crate::utils;

/// `#[rest_controller]` 的参数
///
/// 目前只支持 `factory = path::to::fn`，未指定时使用 `Default`
#[derive(Default)]
pub struct ControllerOptions {
    factory: Option<syn::Path>,
}

impl Parse for ControllerOptions {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self::default());
        }

        let key: syn::Ident = input.parse()?;
        if key != "factory" {
            return Err(syn::Error::new(
                key.span(),
                format!("unknown rest_controller option `{}`", key),
            ));
        }
        input.parse::<Token![=]>()?;
        let factory = input.parse()?;

        Ok(Self {
            factory: Some(factory),
        })
    }
}

/// 展开控制器实现块
///
/// 原样保留方法（去掉标记属性），并额外生成：
///
/// - 每个路由方法一个 `__hexagon_handle_<method>` 调用适配函数
/// - `__hexagon_annotate`：注册控制器并写入路由表
/// - 一个 inventory 提交，使进程级注册表能发现该控制器
pub fn expand(options: ControllerOptions, mut input: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[rest_controller] must be placed on an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "#[rest_controller] does not support generic controllers",
        ));
    }

    let mut handlers = Vec::new();
    let mut annotations = Vec::new();

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(route) = route::take_route(method)? else {
            continue;
        };

        let helper = format_ident!("__hexagon_handle_{}", method.sig.ident);
        handlers.push(handler_fn(method, &route, &helper));
        annotations.push(annotation_calls(method, &route, &helper));
    }

    let self_ty = &input.self_ty;
    let controller_name = quote!(#self_ty).to_string().replace(' ', "");

    let register = match &options.factory {
        Some(factory) => quote! { registry.register_controller_with::<Self, _>(#factory); },
        None => quote! { registry.register_controller::<Self>(); },
    };

    let annotate_body = if annotations.is_empty() {
        quote! {}
    } else {
        quote! {
            let mut metadata = registry.annotate::<Self>();
            #(#annotations)*
        }
    };

    Ok(quote! {
        #input

        impl #self_ty {
            #(#handlers)*

            /// 注册控制器并写入它的路由表
            pub fn __hexagon_annotate(registry: &mut ::hexagon_core::Registry) {
                #register
                #annotate_body
            }
        }

        ::hexagon_core::inventory::submit! {
            ::hexagon_core::ControllerSubmission {
                name: #controller_name,
                register: <#self_ty>::__hexagon_annotate,
            }
        }
    })
}

/// 生成调用适配函数：按位置解码实参，调用方法并把返回值转换为 JSON
fn handler_fn(method: &ImplItemFn, route: &RouteMethod, helper: &syn::Ident) -> TokenStream {
    let name = &method.sig.ident;
    let has_receiver = matches!(method.sig.inputs.first(), Some(FnArg::Receiver(_)));

    let arg_idents: Vec<_> = route
        .params
        .iter()
        .map(|param| format_ident!("__arg{}", param.position))
        .collect();
    let decodes = route.params.iter().zip(&arg_idents).map(|(param, ident)| {
        let ty = &param.ty;
        let position = param.position;
        quote! {
            let #ident: #ty = args.decode::<#ty>(#position)?;
        }
    });

    let this = if has_receiver {
        format_ident!("this")
    } else {
        format_ident!("_this")
    };
    let call = if has_receiver {
        quote! { this.#name(#(#arg_idents),*) }
    } else {
        quote! { Self::#name(#(#arg_idents),*) }
    };
    let call = if method.sig.asyncness.is_some() {
        quote! { #call.await }
    } else {
        call
    };
    let unwrap = if utils::returns_result(&method.sig.output) {
        quote! { let value = value?; }
    } else {
        quote! {}
    };

    quote! {
        #[doc(hidden)]
        async fn #helper(
            #this: ::std::sync::Arc<Self>,
            args: ::hexagon_core::Arguments,
        ) -> ::hexagon_core::HandlerResult {
            #(#decodes)*
            let value = #call;
            #unwrap
            Ok(::hexagon_core::serde_json::to_value(value)?)
        }
    }
}

/// 生成路由与参数的标注调用，顺序与声明顺序一致
fn annotation_calls(method: &ImplItemFn, route: &RouteMethod, helper: &syn::Ident) -> TokenStream {
    let property_key = method.sig.ident.to_string();
    let http_method = &route.http_method;
    let path = &route.path;

    let params = route.params.iter().filter_map(|param| {
        let position = param.position;
        let call = match param.binding.as_ref()? {
            ParamMarker::Path(name) => quote! { path_param(#property_key, #position, #name) },
            ParamMarker::Query(name) => quote! { query_param(#property_key, #position, #name) },
            ParamMarker::Header(name) => quote! { header_param(#property_key, #position, #name) },
            ParamMarker::Body { json: true } => quote! {
                body(#property_key, #position, ::hexagon_core::BodyEncoding::Json)
            },
            ParamMarker::Body { json: false } => quote! { body_raw(#property_key, #position) },
        };
        Some(quote! { metadata.#call; })
    });

    quote! {
        metadata.route(
            #property_key,
            ::hexagon_core::HttpMethod::#http_method,
            #path,
            ::hexagon_core::Handle::new(Self::#helper),
        );
        #(#params)*
    }
}
