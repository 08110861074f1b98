//! 路由与参数标记的解析
//!
//! 从控制器方法上读取 `#[get_mapping("/path")]` 等路由标记，
//! 以及参数上的 `#[path_param("id")]`、`#[body(json)]` 等绑定标记

use syn::spanned::Spanned;
use syn::{Attribute, FnArg, Ident, ImplItemFn, LitStr, Pat, Type};

/// 路由标记名称及对应的 HTTP 方法
const ROUTE_MARKERS: &[(&str, &str)] = &[
    ("get_mapping", "Get"),
    ("post_mapping", "Post"),
    ("put_mapping", "Put"),
    ("delete_mapping", "Delete"),
    ("options_mapping", "Options"),
];

const PARAM_MARKERS: &[&str] = &["path_param", "query_param", "header_param", "body"];

/// 一个路由方法
pub struct RouteMethod {
    /// `HttpMethod` 的变体名
    pub http_method: Ident,
    pub path: LitStr,
    pub params: Vec<RouteParam>,
}

/// 方法的一个形参（不含接收者）
pub struct RouteParam {
    pub position: usize,
    pub ty: Type,
    pub binding: Option<ParamMarker>,
}

pub enum ParamMarker {
    Path(LitStr),
    Query(LitStr),
    Header(LitStr),
    /// `true` 表示按 JSON 解析
    Body { json: bool },
}

/// 解析方法上的路由标记并移除所有标记属性
///
/// 方法没有路由标记时返回 `Ok(None)`，参数上的标记仍会被移除
pub fn take_route(method: &mut ImplItemFn) -> syn::Result<Option<RouteMethod>> {
    let mut route = None;
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attr in method.attrs.drain(..) {
        let marker = ROUTE_MARKERS
            .iter()
            .find(|(name, _)| attr.path().is_ident(name));

        match marker {
            Some((name, variant)) => {
                if route.is_some() {
                    return Err(syn::Error::new(
                        attr.span(),
                        format!("duplicate route marker `{}`", name),
                    ));
                }
                let path: LitStr = attr.parse_args()?;
                route = Some((Ident::new(variant, attr.span()), path));
            }
            None => kept.push(attr),
        }
    }
    method.attrs = kept;

    let params = take_params(method)?;

    Ok(route.map(|(http_method, path)| RouteMethod {
        http_method,
        path,
        params,
    }))
}

fn take_params(method: &mut ImplItemFn) -> syn::Result<Vec<RouteParam>> {
    let mut params = Vec::new();

    for arg in method.sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };

        let mut binding = None;
        let mut kept = Vec::with_capacity(pat_type.attrs.len());
        for attr in pat_type.attrs.drain(..) {
            if PARAM_MARKERS.iter().any(|name| attr.path().is_ident(name)) {
                if binding.is_some() {
                    return Err(syn::Error::new(
                        attr.span(),
                        "a parameter can carry only one binding marker",
                    ));
                }
                binding = Some(parse_marker(&attr, &pat_type.pat)?);
            } else {
                kept.push(attr);
            }
        }
        pat_type.attrs = kept;

        params.push(RouteParam {
            position: params.len(),
            ty: (*pat_type.ty).clone(),
            binding,
        });
    }

    Ok(params)
}

fn parse_marker(attr: &Attribute, pat: &Pat) -> syn::Result<ParamMarker> {
    if attr.path().is_ident("body") {
        return parse_body(attr);
    }

    // 省略名称时使用参数名
    let name = match &attr.meta {
        syn::Meta::Path(_) => match pat {
            Pat::Ident(ident) => LitStr::new(&ident.ident.to_string(), ident.ident.span()),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "parameter name is required for destructured arguments",
                ))
            }
        },
        _ => attr.parse_args()?,
    };

    if attr.path().is_ident("path_param") {
        Ok(ParamMarker::Path(name))
    } else if attr.path().is_ident("query_param") {
        Ok(ParamMarker::Query(name))
    } else {
        Ok(ParamMarker::Header(name))
    }
}

fn parse_body(attr: &Attribute) -> syn::Result<ParamMarker> {
    if let syn::Meta::Path(_) = attr.meta {
        return Ok(ParamMarker::Body { json: false });
    }

    let encoding: Ident = attr.parse_args()?;
    match encoding.to_string().as_str() {
        "raw" => Ok(ParamMarker::Body { json: false }),
        "json" => Ok(ParamMarker::Body { json: true }),
        other => Err(syn::Error::new(
            encoding.span(),
            format!("unknown body encoding `{}`, expected `raw` or `json`", other),
        )),
    }
}
