//! 模块检查器
//!
//! 基于模块声明（而非执行）的依赖图做静态检查：
//! 1. 构建依赖图并统计引用次数（忽略列表与 `run` 引用视为已使用）
//! 2. 未使用的服务 → 警告
//! 3. 引用了不存在的服务 → 错误
//! 4. 循环依赖 → 错误，每个不同的环只报告一次
//!
//! 带默认值的别名目标不会被报告为未解析，但目标存在时别名会转发到它，
//! 因此它参与循环检测。
//!
//! 每次检查都构建独立的依赖图，不修改模块，也不执行任何回调。

use crate::config::InspectorConfig;
use crate::errors::AppError;
use crate::infrastructure::module::Module;
use crate::services::SELF_KEY;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// 单条检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// 没有任何引用的服务
    UnusedService { service: String },
    /// 工厂依赖了不存在的服务
    UnresolvedDependency { service: String, dependency: String },
    /// 依赖环（不含回到起点的那一步）
    CircularDependency { chain: Vec<String> },
    /// 扩展依赖了不存在的服务
    UnresolvedExtensionDependency { service: String, dependency: String },
    /// 扩展的目标没有对应的工厂
    OrphanExtension { service: String },
    /// 有模块未声明其 `run` 使用的服务
    UndeclaredRunReferences { modules: usize },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::UnusedService { service } => write!(f, "Service '{service}' is not used"),
            Finding::UnresolvedDependency { service, dependency } => {
                write!(f, "Service '{service}' has an unresolved dependency: '{dependency}'")
            }
            Finding::CircularDependency { chain } => {
                write!(f, "Circular dependency detected: {}", chain.join(" -> "))?;
                if let Some(first) = chain.first() {
                    write!(f, " -> {first}")?;
                }
                Ok(())
            }
            Finding::UnresolvedExtensionDependency { service, dependency } => {
                write!(f, "Extension for '{service}' has an unresolved dependency: '{dependency}'")
            }
            Finding::OrphanExtension { service } => {
                write!(f, "Extension '{service}' does not extend any service")
            }
            Finding::UndeclaredRunReferences { modules } => {
                write!(f, "{modules} module(s) do not declare the services used by run")
            }
        }
    }
}

/// 检查报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl InspectionReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// 存在错误（或在 `deny_warnings` 时存在警告）则失败
    pub fn ensure_valid(&self, deny_warnings: bool) -> Result<(), AppError> {
        if self.has_errors() || (deny_warnings && !self.warnings.is_empty()) {
            return Err(AppError::Inspection {
                errors: self.errors.len(),
                warnings: self.warnings.len(),
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.error_messages(),
            "warnings": self.warning_messages(),
        })
    }
}

/// 一次检查期间的依赖图
#[derive(Debug, Default)]
struct DependencyGraph {
    /// 服务名 → 声明的依赖（去重，保持声明顺序）
    deps: BTreeMap<String, Vec<String>>,
    /// 服务名 → 解析时可能访问的服务（依赖加上带默认值的别名目标）
    edges: BTreeMap<String, Vec<String>>,
    /// 扩展名 → 扩展链的依赖
    extension_deps: BTreeMap<String, Vec<String>>,
    /// 服务名 → 被引用次数
    refs: HashMap<String, usize>,
    undeclared_run_modules: usize,
}

impl DependencyGraph {
    fn build(module: &dyn Module, ignore: &BTreeSet<String>) -> Self {
        let mut graph = DependencyGraph::default();

        let run_refs = module.run_references();
        graph.undeclared_run_modules = run_refs.undeclared_count();
        for key in ignore.iter().map(String::as_str).chain(run_refs.keys()) {
            graph.refs.insert(key.to_string(), 1);
        }

        for (key, service) in module.factories() {
            let references = service.references();
            for reference in &references {
                graph.add_reference(reference);
            }
            graph.edges.insert(key.clone(), dedup_deps(references));
            graph.deps.insert(key, dedup_deps(service.dependencies()));
        }

        for (key, extension) in module.extensions() {
            let deps = dedup_deps(extension.dependencies());
            for dep in &deps {
                graph.add_reference(dep);
            }
            graph.extension_deps.insert(key, deps);
        }

        graph
    }

    fn add_reference(&mut self, key: &str) {
        if key != SELF_KEY {
            *self.refs.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    fn reference_count(&self, key: &str) -> usize {
        self.refs.get(key).copied().unwrap_or(0)
    }

    fn is_declared(&self, key: &str) -> bool {
        self.deps.contains_key(key)
    }

    /// 从 `start` 出发，寻找一个直接依赖 `end` 的服务，返回沿途的服务名
    fn dependency_chain(&self, start: &str, end: &str, visited: &mut HashSet<String>) -> Option<Vec<String>> {
        if visited.contains(start) {
            return None;
        }

        let deps = self.edges.get(start)?;
        if deps.iter().any(|d| d == end) {
            return Some(vec![start.to_string()]);
        }

        visited.insert(start.to_string());

        for dep in deps {
            if let Some(mut chain) = self.dependency_chain(dep, end, visited) {
                chain.insert(0, start.to_string());
                return Some(chain);
            }
        }

        None
    }
}

fn dedup_deps(deps: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    deps.into_iter()
        .filter(|d| *d != SELF_KEY && seen.insert(*d))
        .map(str::to_string)
        .collect()
}

/// 模块检查器
#[derive(Debug, Clone, Default)]
pub struct ModuleInspector {
    ignore: BTreeSet<String>,
    require_run_references: bool,
}

impl ModuleInspector {
    /// `ignore` 中的服务在未使用检查中视为已使用
    pub fn new<I, S>(ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore: ignore.into_iter().map(Into::into).collect(),
            require_run_references: false,
        }
    }

    pub fn from_config(config: &InspectorConfig) -> Self {
        Self {
            ignore: config.ignore.iter().cloned().collect(),
            require_run_references: config.require_run_references,
        }
    }

    /// 未声明 run 引用时报告错误而不是警告
    pub fn require_run_references(mut self, required: bool) -> Self {
        self.require_run_references = required;
        self
    }

    pub fn inspect(&self, module: &dyn Module) -> InspectionReport {
        let graph = DependencyGraph::build(module, &self.ignore);
        let report = self.analyze(&graph);

        log::info!(
            "模块检查完成: {} 个服务, {} 个错误, {} 个警告",
            graph.deps.len(),
            report.errors.len(),
            report.warnings.len()
        );

        report
    }

    fn analyze(&self, graph: &DependencyGraph) -> InspectionReport {
        let mut report = InspectionReport::default();
        // 已报告的依赖环（按排序后的成员去重）
        let mut reported_cycles: HashSet<Vec<String>> = HashSet::new();

        for (key, deps) in &graph.deps {
            if graph.reference_count(key) == 0 {
                report.warnings.push(Finding::UnusedService {
                    service: key.clone(),
                });
            }

            for dep in deps.iter().filter(|d| !graph.is_declared(d)) {
                report.errors.push(Finding::UnresolvedDependency {
                    service: key.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        for (key, edges) in &graph.edges {
            for dep in edges.iter().filter(|d| graph.is_declared(d)) {
                let chain = if dep == key {
                    Some(Vec::new())
                } else {
                    graph.dependency_chain(dep, key, &mut HashSet::new())
                };

                if let Some(path) = chain {
                    let mut cycle = Vec::with_capacity(path.len() + 1);
                    cycle.push(key.clone());
                    cycle.extend(path);

                    let mut fingerprint = cycle.clone();
                    fingerprint.sort();

                    if reported_cycles.insert(fingerprint) {
                        report.errors.push(Finding::CircularDependency { chain: cycle });
                    }
                }
            }
        }

        for (key, deps) in &graph.extension_deps {
            if !graph.is_declared(key) {
                report.warnings.push(Finding::OrphanExtension {
                    service: key.clone(),
                });
            }

            for dep in deps.iter().filter(|d| !graph.is_declared(d)) {
                report.errors.push(Finding::UnresolvedExtensionDependency {
                    service: key.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        if graph.undeclared_run_modules > 0 {
            let finding = Finding::UndeclaredRunReferences {
                modules: graph.undeclared_run_modules,
            };
            if self.require_run_references {
                report.errors.push(finding);
            } else {
                report.warnings.push(finding);
            }
        }

        report
    }
}

/// 使用给定忽略列表检查模块
pub fn inspect<I, S>(module: &dyn Module, ignore: I) -> InspectionReport
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ModuleInspector::new(ignore).inspect(module)
}
