//! 字符串插值服务
//!
//! 模板中的 `{name}` 占位符会被替换为对应依赖服务的字符串形式。
//! 替换只进行一次：替换进来的值即使包含 `{…}` 也不会再次展开；
//! 没有对应依赖的占位符原样保留。

use super::args::{Arg, Args};
use super::value::ServiceValue;
use crate::errors::ContainerError;
use crate::infrastructure::container::Container;
use std::collections::HashMap;

/// 字符串模板服务
#[derive(Debug, Clone)]
pub struct Template {
    template: String,
    /// 占位符名 → 服务名，按声明顺序
    placeholders: Vec<(String, String)>,
}

impl Template {
    pub fn new<I, P, K>(template: impl Into<String>, placeholders: I) -> Self
    where
        I: IntoIterator<Item = (P, K)>,
        P: Into<String>,
        K: Into<String>,
    {
        Self {
            template: template.into(),
            placeholders: placeholders
                .into_iter()
                .map(|(p, k)| (p.into(), k.into()))
                .collect(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn placeholders(&self) -> &[(String, String)] {
        &self.placeholders
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|(_, key)| key.as_str())
    }

    /// 重写依赖的服务名，占位符名不变
    pub fn map_keys(&self, convert: &dyn Fn(&str) -> String) -> Self {
        Self {
            template: self.template.clone(),
            placeholders: self
                .placeholders
                .iter()
                .map(|(p, k)| (p.clone(), super::convert_key(k, convert)))
                .collect(),
        }
    }

    pub fn compute(&self, scope: &dyn Container) -> Result<ServiceValue, ContainerError> {
        let keys: Vec<String> = self.placeholders.iter().map(|(_, k)| k.clone()).collect();
        let args = Args::resolve(&keys, scope)?;

        let mut context = HashMap::with_capacity(self.placeholders.len());
        for ((placeholder, _), (key, arg)) in self.placeholders.iter().zip(args.iter()) {
            let rendered = match arg {
                Arg::Service(value) => value.render().ok_or_else(|| ContainerError::NotRenderable {
                    key: key.to_string(),
                    type_name: value.type_name(),
                })?,
                Arg::Container(_) => {
                    return Err(ContainerError::NotRenderable {
                        key: key.to_string(),
                        type_name: "container",
                    })
                }
            };
            context.insert(placeholder.as_str(), rendered);
        }

        Ok(ServiceValue::new(interpolate(&self.template, &context)))
    }
}

/// 单次替换 `{name}` 占位符
pub fn interpolate(template: &str, context: &HashMap<&str, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => match context.get(&after[..close]) {
                Some(value) => {
                    output.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    output.push('{');
                    rest = after;
                }
            },
            None => {
                output.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}
