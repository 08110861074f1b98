//! 宏辅助工具函数

use syn::{ReturnType, Type};

/// 返回类型是否为 `Result`（按最后一段路径判断，兼容 `anyhow::Result` 等别名）
pub fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };

    match ty.as_ref() {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        _ => false,
    }
}
