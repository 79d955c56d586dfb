//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::AppResult;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识会话 / 分析结果
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// 脚本必须返回一个可序列化的值，`undefined` 会导致解析失败。
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 以参数对象调用一段函数体
    ///
    /// 参数通过 JSON 字面量注入为 `args`，函数体内用 `return` 返回结果。
    pub async fn call<T: DeserializeOwned>(&self, body: &str, args: &JsonValue) -> AppResult<T> {
        debug!("执行页面脚本，参数长度: {} 字节", args.to_string().len());
        self.eval_as(wrap_call(body, args)).await
    }
}

/// 拼接立即执行的函数脚本
pub(crate) fn wrap_call(body: &str, args: &JsonValue) -> String {
    format!("(() => {{ const args = {}; {} }})()", args, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_call_injects_json_args() {
        let script = wrap_call("return args.id;", &json!({ "id": "say \"hi\"" }));
        assert_eq!(
            script,
            r#"(() => { const args = {"id":"say \"hi\""}; return args.id; })()"#
        );
    }
}
